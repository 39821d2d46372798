// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hung-worker detection.
//!
//! The driver calls [`Orchestrator::scan_hung`] every `2 × timeout`. A
//! worker is hung when at least half of its in-flight items have been
//! outstanding longer than the timeout. Hung workers are handled like
//! crashes (in-flight items become errors, a replacement is spawned) but do
//! not count against the crash breaker.

use super::Orchestrator;
use crate::error::PoolError;
use wq_adapters::WorkerHost;
use wq_core::{Clock, WorkerId};

impl<H: WorkerHost, C: Clock> Orchestrator<H, C> {
    pub fn scan_hung(&mut self) -> Result<(), PoolError> {
        let Some(timeout) = self.config.timeout() else {
            return Ok(());
        };
        let now = self.clock.now();

        let hung: Vec<(WorkerId, usize, usize)> = self
            .workers
            .iter()
            .filter_map(|(id, handle)| {
                let total = handle.in_flight.len();
                let overdue = handle
                    .in_flight
                    .iter()
                    .filter(|r| now.saturating_duration_since(r.dispatched_at) > timeout)
                    .count();
                (total > 0 && overdue * 2 >= total).then(|| (id.clone(), overdue, total))
            })
            .collect();

        for (worker, overdue, total) in hung {
            tracing::warn!(
                %worker,
                overdue,
                in_flight = total,
                timeout_ms = timeout.as_millis() as u64,
                "worker hung, recycling"
            );
            let Some(handle) = self.terminate_worker(&worker) else {
                continue;
            };
            let detail = format!(
                "worker hung: {} of {} items exceeded {}ms",
                overdue,
                total,
                timeout.as_millis()
            );
            self.fail_in_flight(handle.in_flight, &detail);
            if self.phase.is_active() && !handle.stopping {
                self.spawn_worker()?;
            }
        }

        self.maybe_finish();
        Ok(())
    }
}
