// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake worker host for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{HostError, WorkerHost};
use parking_lot::Mutex;
use std::sync::Arc;
use wq_core::{wire, Message, WorkItem, WorkerId};

/// Recorded host call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Spawn { worker: WorkerId },
    Send { worker: WorkerId, message: Message },
    Terminate { worker: WorkerId },
}

#[derive(Default)]
struct FakeHostState {
    calls: Vec<HostCall>,
    live: Vec<WorkerId>,
    fail_spawn: bool,
}

/// Fake host that records calls instead of running workers.
///
/// Tests play the worker side by feeding frames to the orchestrator.
#[derive(Clone, Default)]
pub struct FakeHost {
    inner: Arc<Mutex<FakeHostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<HostCall> {
        self.inner.lock().calls.clone()
    }

    /// Workers spawned and not yet terminated, oldest first
    pub fn live_workers(&self) -> Vec<WorkerId> {
        self.inner.lock().live.clone()
    }

    /// Every spawn, in order
    pub fn spawned(&self) -> Vec<WorkerId> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Spawn { worker } => Some(worker.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every termination, in order
    pub fn terminated(&self) -> Vec<WorkerId> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Terminate { worker } => Some(worker.clone()),
                _ => None,
            })
            .collect()
    }

    /// Items dispatched to one worker, in send order
    pub fn dispatched_to(&self, worker: &WorkerId) -> Vec<WorkItem> {
        self.dispatched()
            .into_iter()
            .filter(|(w, _)| w == worker)
            .map(|(_, item)| item)
            .collect()
    }

    /// Every dispatch across all workers, in send order
    pub fn dispatched(&self) -> Vec<(WorkerId, WorkItem)> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Send {
                    worker,
                    message: Message::Dispatch { item },
                } => Some((worker.clone(), item.clone())),
                _ => None,
            })
            .collect()
    }

    /// Make subsequent spawns fail
    pub fn set_fail_spawn(&self, fail: bool) {
        self.inner.lock().fail_spawn = fail;
    }
}

impl WorkerHost for FakeHost {
    fn spawn(&mut self, worker: &WorkerId) -> Result<(), HostError> {
        let mut state = self.inner.lock();
        if state.fail_spawn {
            return Err(HostError::SpawnFailed {
                worker: worker.clone(),
                message: "spawn disabled".to_string(),
            });
        }
        state.calls.push(HostCall::Spawn {
            worker: worker.clone(),
        });
        state.live.push(worker.clone());
        Ok(())
    }

    fn send(&mut self, worker: &WorkerId, frame: Vec<u8>) -> Result<(), HostError> {
        let mut state = self.inner.lock();
        if !state.live.contains(worker) {
            return Err(HostError::NotFound(worker.clone()));
        }
        let message = wire::decode(&frame).map_err(|_| HostError::Closed(worker.clone()))?;
        state.calls.push(HostCall::Send {
            worker: worker.clone(),
            message,
        });
        Ok(())
    }

    fn terminate(&mut self, worker: &WorkerId) {
        let mut state = self.inner.lock();
        state.live.retain(|w| w != worker);
        state.calls.push(HostCall::Terminate {
            worker: worker.clone(),
        });
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
