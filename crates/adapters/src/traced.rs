// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced host wrapper for consistent observability

use crate::host::{HostError, WorkerHost};
use wq_core::WorkerId;

/// Wrapper that adds tracing to any WorkerHost
#[derive(Clone)]
pub struct TracedHost<H> {
    inner: H,
}

impl<H> TracedHost<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: WorkerHost> WorkerHost for TracedHost<H> {
    fn spawn(&mut self, worker: &WorkerId) -> Result<(), HostError> {
        tracing::info_span!("host.spawn", %worker).in_scope(|| {
            let start = std::time::Instant::now();
            let result = self.inner.spawn(worker);
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "worker spawned"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "spawn failed"),
            }
            result
        })
    }

    fn send(&mut self, worker: &WorkerId, frame: Vec<u8>) -> Result<(), HostError> {
        let frame_len = frame.len();
        let result = self.inner.send(worker, frame);
        tracing::info_span!("host.send", %worker).in_scope(|| match &result {
            Ok(()) => tracing::trace!(frame_len, "sent"),
            Err(e) => tracing::error!(frame_len, error = %e, "send failed"),
        });
        result
    }

    fn terminate(&mut self, worker: &WorkerId) {
        tracing::info_span!("host.terminate", %worker).in_scope(|| {
            self.inner.terminate(worker);
            tracing::info!("terminated");
        });
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
