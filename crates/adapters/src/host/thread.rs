// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production host: one OS thread per worker.
//!
//! Each worker thread owns a current-thread tokio runtime and a `LocalSet`,
//! so items on one worker interleave cooperatively while workers run in
//! parallel. Only encoded frames cross the thread boundary.

use super::{HostError, HostEvent, WorkerHost};
use crate::worker::{ItemHandler, Outbox, WorkerFault, WorkerRuntime, WorkerSetup};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use wq_core::WorkerId;

/// Host that runs each worker on a dedicated thread.
pub struct ThreadHost {
    handler: Arc<dyn ItemHandler>,
    setup: Option<Arc<dyn WorkerSetup>>,
    events: mpsc::UnboundedSender<HostEvent>,
    inboxes: HashMap<WorkerId, mpsc::UnboundedSender<Vec<u8>>>,
}

impl ThreadHost {
    pub fn new(
        handler: Arc<dyn ItemHandler>,
        setup: Option<Arc<dyn WorkerSetup>>,
        events: mpsc::UnboundedSender<HostEvent>,
    ) -> Self {
        Self {
            handler,
            setup,
            events,
            inboxes: HashMap::new(),
        }
    }

    /// Number of workers this host considers live.
    pub fn live_count(&self) -> usize {
        self.inboxes.len()
    }
}

impl WorkerHost for ThreadHost {
    fn spawn(&mut self, worker: &WorkerId) -> Result<(), HostError> {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let handler = Arc::clone(&self.handler);
        let setup = self.setup.clone();
        let events = self.events.clone();
        let id = worker.clone();

        std::thread::Builder::new()
            .name(format!("wq-{}", worker))
            .spawn(move || {
                let outbox = Outbox::new(id.clone(), events.clone());
                let crashed = run_worker_thread(handler, setup, outbox, inbox_rx)
                    .err()
                    .map(|fault| fault.to_string());
                let _ = events.send(HostEvent::Exited {
                    worker: id,
                    crashed,
                });
            })
            .map_err(|e| HostError::SpawnFailed {
                worker: worker.clone(),
                message: e.to_string(),
            })?;

        self.inboxes.insert(worker.clone(), inbox_tx);
        Ok(())
    }

    fn send(&mut self, worker: &WorkerId, frame: Vec<u8>) -> Result<(), HostError> {
        let inbox = self
            .inboxes
            .get(worker)
            .ok_or_else(|| HostError::NotFound(worker.clone()))?;
        inbox
            .send(frame)
            .map_err(|_| HostError::Closed(worker.clone()))
    }

    fn terminate(&mut self, worker: &WorkerId) {
        // Dropping the inbox ends the worker loop at its next poll; the
        // runtime drop then cancels unfinished items.
        if self.inboxes.remove(worker).is_none() {
            tracing::debug!(%worker, "terminate for unknown worker");
        }
    }
}

fn run_worker_thread(
    handler: Arc<dyn ItemHandler>,
    setup: Option<Arc<dyn WorkerSetup>>,
    outbox: Outbox,
    inbox: mpsc::UnboundedReceiver<Vec<u8>>,
) -> Result<(), WorkerFault> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| WorkerFault::Runtime(e.to_string()))?;
    let local = LocalSet::new();
    let runtime = WorkerRuntime::new(handler, outbox);

    match catch_unwind(AssertUnwindSafe(|| {
        local.block_on(&rt, runtime.run(inbox, setup))
    })) {
        Ok(result) => result,
        Err(_) => Err(WorkerFault::Panic("worker loop panicked".to_string())),
    }
}

#[cfg(test)]
#[path = "thread_tests.rs"]
mod tests;
