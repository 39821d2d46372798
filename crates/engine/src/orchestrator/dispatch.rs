// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch loop: hand queued items to a worker until it is full.

use super::{InFlightRecord, Orchestrator, RunPhase};
use wq_adapters::WorkerHost;
use wq_core::{wire, Clock, Message, WorkerId};

impl<H: WorkerHost, C: Clock> Orchestrator<H, C> {
    /// Re-entered whenever `worker` may have capacity: after spawn, after
    /// each completion, and on resume.
    ///
    /// Starts the retry pass once the queue first runs dry, pops items off
    /// the top of the stack while the worker has room, and removes the
    /// worker once it has nothing left to do.
    pub(crate) fn fill(&mut self, worker: &WorkerId) {
        loop {
            if self.pending.is_empty()
                && self.phase.is_active()
                && self.config.retry_on_fail
                && !self.retry_started
            {
                self.begin_retry();
            }

            let Some(handle) = self.workers.get(worker) else {
                return;
            };
            let can_take = self.phase.is_active()
                && !handle.stopping
                && !self.pending.is_empty()
                && handle.in_flight.len() < self.config.parallel_processes;

            if !can_take {
                if handle.is_drained() {
                    self.terminate_worker(worker);
                    self.maybe_finish();
                }
                return;
            }

            if !self.dispatch_next(worker) {
                return;
            }
            // Keep pulling only while the worker still has room.
            if self.in_flight_len(worker) >= self.config.parallel_processes {
                return;
            }
        }
    }

    /// Send the most recently added item to `worker`.
    ///
    /// Returns false when the worker could not take it; the item goes back
    /// on the queue.
    fn dispatch_next(&mut self, worker: &WorkerId) -> bool {
        let Some(item) = self.pending.pop() else {
            return false;
        };

        let frame = match wire::encode(&Message::dispatch(item.clone())) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(%item, error = %e, "item cannot be dispatched");
                let record = InFlightRecord::new(item, self.clock.now());
                self.fail_in_flight(vec![record], &format!("item cannot be dispatched: {}", e));
                return true;
            }
        };

        if let Err(e) = self.host.send(worker, frame) {
            tracing::warn!(%worker, %item, error = %e, "dispatch failed, requeueing item");
            self.pending.push(item);
            return false;
        }

        let now = self.clock.now();
        let Some(handle) = self.workers.get_mut(worker) else {
            return false;
        };
        handle.sent += 1;
        handle.in_flight.push(InFlightRecord::new(item, now));
        self.dispatched += 1;

        if self.pending.is_empty() && self.phase == RunPhase::Dispatching {
            self.phase = RunPhase::Draining;
        }
        true
    }

    /// Move every failed item back onto the queue, once per run.
    fn begin_retry(&mut self) {
        self.retry_started = true;
        if self.failed.is_empty() {
            tracing::debug!("queue drained with no failures to retry");
            return;
        }

        let items = std::mem::take(&mut self.failed);
        tracing::info!(count = items.len(), "retrying failed items");
        self.stats.add_total(items.len() as u64);
        self.retrying.extend(items.iter().cloned());
        self.pending.extend(items);
        self.phase = RunPhase::Retrying;
    }
}
