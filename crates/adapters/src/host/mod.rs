// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker hosting: where worker units live and how frames reach them.

mod thread;

pub use thread::ThreadHost;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHost, HostCall};

use thiserror::Error;
use wq_core::WorkerId;

/// Errors from host operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to spawn worker {worker}: {message}")]
    SpawnFailed { worker: WorkerId, message: String },
    #[error("worker not found: {0}")]
    NotFound(WorkerId),
    #[error("worker {0} is no longer accepting frames")]
    Closed(WorkerId),
}

/// Something that happened on the worker side of the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// An encoded protocol message from a worker.
    Frame { worker: WorkerId, frame: Vec<u8> },
    /// A worker stopped. `crashed` carries the fault for abnormal exits.
    Exited {
        worker: WorkerId,
        crashed: Option<String>,
    },
}

impl HostEvent {
    pub fn worker(&self) -> &WorkerId {
        match self {
            HostEvent::Frame { worker, .. } | HostEvent::Exited { worker, .. } => worker,
        }
    }
}

/// Starts, feeds and stops worker units.
///
/// Workers report back through the event channel the host was built with,
/// never through this trait.
pub trait WorkerHost: Send + 'static {
    /// Start a worker unit with the given identity.
    fn spawn(&mut self, worker: &WorkerId) -> Result<(), HostError>;

    /// Deliver one encoded frame. Fire-and-forget: does not wait for the
    /// worker to act on it.
    fn send(&mut self, worker: &WorkerId, frame: Vec<u8>) -> Result<(), HostError>;

    /// Stop a worker without waiting for its in-flight items.
    fn terminate(&mut self, worker: &WorkerId);
}
