// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run and worker lifecycle: start, stop, add/remove workers, crashes.

use super::{ItemCallback, Orchestrator, RunPhase, WorkerHandle, CRASH_THRESHOLD, CRASH_WINDOW};
use crate::error::PoolError;
use crate::scheduler::TimerId;
use wq_adapters::WorkerHost;
use wq_core::{Clock, IdGen, StatsTracker, WorkItem, WorkerId};

impl<H: WorkerHost, C: Clock> Orchestrator<H, C> {
    /// Replace the pending queue.
    ///
    /// Outside an active run the list starts a fresh run on the next
    /// `start`. During a run it replaces whatever was still queued.
    pub fn set_work_list(&mut self, items: Vec<WorkItem>) -> Result<(), PoolError> {
        if items.is_empty() {
            return Err(PoolError::InvalidInput("work list is empty".to_string()));
        }
        if self.phase.is_active() {
            let handed_out = self
                .stats
                .total_tasks()
                .saturating_sub(self.pending.len() as u64);
            self.stats.set_total(handed_out + items.len() as u64);
        } else {
            self.fresh_work = true;
        }
        tracing::debug!(items = items.len(), "work list set");
        self.pending = items;
        self.work_list_set = true;
        Ok(())
    }

    /// Begin or resume dispatching.
    ///
    /// A no-op while already running. Spawns workers up to the configured
    /// pool size; workers still finishing from a pause rejoin the run.
    pub fn start(&mut self) -> Result<(), PoolError> {
        if !self.work_list_set {
            return Err(PoolError::PreconditionFailed(
                "no work list has been set".to_string(),
            ));
        }
        if self.phase.is_active() {
            return Ok(());
        }
        if self.phase == RunPhase::Completed && !self.fresh_work {
            return Err(PoolError::PreconditionFailed(
                "run already completed; set a new work list to run again".to_string(),
            ));
        }
        if self.fresh_work {
            self.begin_run();
        }

        self.phase = RunPhase::Dispatching;
        self.stats.start(self.clock.epoch_ms());
        tracing::info!(
            pending = self.pending.len(),
            workers = self.config.worker_count,
            parallel = self.config.parallel_processes,
            "run started"
        );

        let rejoining = self.worker_ids();
        for id in &rejoining {
            if let Some(handle) = self.workers.get_mut(id) {
                handle.stopping = false;
            }
        }
        for id in &rejoining {
            self.fill(id);
        }
        let missing = self.config.worker_count.saturating_sub(self.workers.len());
        for _ in 0..missing {
            if !self.phase.is_active() {
                break;
            }
            self.spawn_worker()?;
        }
        Ok(())
    }

    /// `start` with an optional new work list and item handler.
    pub fn start_with(
        &mut self,
        items: Option<Vec<WorkItem>>,
        on_item: Option<ItemCallback>,
    ) -> Result<(), PoolError> {
        if let Some(items) = items {
            self.set_work_list(items)?;
        }
        if let Some(handler) = on_item {
            self.set_item_handler(handler);
        }
        self.start()
    }

    /// Pause dispatch.
    ///
    /// With `immediate`, every worker is terminated and its in-flight items
    /// are abandoned without an outcome. Otherwise workers finish what they
    /// hold and then exit. `start` resumes.
    pub fn stop(&mut self, immediate: bool) {
        if !self.phase.is_active() {
            return;
        }
        self.phase = RunPhase::Idle;
        tracing::info!(immediate, pending = self.pending.len(), "run paused");

        for id in self.worker_ids() {
            if immediate {
                self.terminate_worker(&id);
                continue;
            }
            let drained = match self.workers.get_mut(&id) {
                Some(handle) => {
                    handle.stopping = true;
                    handle.is_drained()
                }
                None => false,
            };
            if drained {
                self.terminate_worker(&id);
            }
        }
    }

    /// Spawn one more worker and return its identity.
    pub fn add_worker(&mut self) -> Result<WorkerId, PoolError> {
        self.spawn_worker()
    }

    /// Remove a worker, by default the most recently added one.
    ///
    /// Returns false when no matching worker exists. A worker already
    /// stopping only matches an `immediate` removal.
    pub fn remove_worker(&mut self, worker: Option<&WorkerId>, immediate: bool) -> bool {
        let target = match worker {
            Some(id) => self
                .workers
                .get(id)
                .filter(|handle| immediate || !handle.stopping)
                .map(|_| id.clone()),
            None => self
                .workers
                .iter()
                .rev()
                .find(|(_, handle)| !handle.stopping)
                .map(|(id, _)| id.clone()),
        };
        let Some(id) = target else {
            return false;
        };

        tracing::info!(worker = %id, immediate, "removing worker");
        let drained = match self.workers.get_mut(&id) {
            Some(handle) => {
                handle.stopping = true;
                handle.is_drained()
            }
            None => false,
        };
        if immediate || drained {
            self.terminate_worker(&id);
            self.maybe_finish();
        }
        true
    }

    /// A worker unit stopped on its own.
    ///
    /// Exits of workers the orchestrator already removed are expected and
    /// ignored. Anything else is a crash: its in-flight items are recorded
    /// as errors, a replacement is spawned, and the crash counts against
    /// the breaker.
    pub fn handle_exit(
        &mut self,
        worker: &WorkerId,
        crashed: Option<String>,
    ) -> Result<(), PoolError> {
        if !self.workers.contains_key(worker) {
            tracing::debug!(%worker, "exit from removed worker");
            return Ok(());
        }
        let reason = crashed.unwrap_or_else(|| "worker exited unexpectedly".to_string());

        if let Some(handle) = self.terminate_worker(worker) {
            let detail = format!("worker crashed: {}", reason);
            self.fail_in_flight(handle.in_flight, &detail);
            self.record_crash(worker, &reason)?;
            if self.phase.is_active() && !handle.stopping {
                self.spawn_worker()?;
            }
        }
        self.maybe_finish();
        Ok(())
    }

    /// Apply every expired timer.
    pub fn fire_timers(&mut self) {
        for id in self.scheduler.fired_timers(self.clock.now()) {
            match id {
                TimerId::CrashDecay(_) => {
                    self.recent_crashes = self.recent_crashes.saturating_sub(1);
                    tracing::debug!(recent = self.recent_crashes, "crash aged out of window");
                }
            }
        }
    }

    fn record_crash(&mut self, worker: &WorkerId, reason: &str) -> Result<(), PoolError> {
        self.recent_crashes += 1;
        self.crash_seq += 1;
        self.scheduler.set_timer(
            TimerId::CrashDecay(self.crash_seq),
            CRASH_WINDOW,
            self.clock.now(),
        );
        tracing::warn!(%worker, reason, recent = self.recent_crashes, "worker crashed");

        if self.recent_crashes > CRASH_THRESHOLD {
            let crashes = self.recent_crashes;
            tracing::error!(crashes, "crash rate exceeded, halting run");
            self.halt();
            return Err(PoolError::CascadingFailure {
                crashes,
                window_secs: CRASH_WINDOW.as_secs(),
            });
        }
        Ok(())
    }

    /// Stop everything after a fatal error.
    fn halt(&mut self) {
        self.phase = RunPhase::Idle;
        for id in self.worker_ids() {
            self.terminate_worker(&id);
        }
        self.scheduler.cancel_all();
    }

    fn begin_run(&mut self) {
        self.stats = StatsTracker::new();
        self.stats.set_total(self.pending.len() as u64);
        self.failed.clear();
        self.retrying.clear();
        self.retry_started = false;
        self.fresh_work = false;
        self.dispatched = 0;
    }

    pub(crate) fn spawn_worker(&mut self) -> Result<WorkerId, PoolError> {
        let id = WorkerId::new(self.ids.next());
        self.host.spawn(&id)?;
        self.workers.insert(id.clone(), WorkerHandle::default());
        tracing::debug!(worker = %id, workers = self.workers.len(), "worker spawned");
        if self.phase.is_active() {
            self.fill(&id);
        }
        Ok(id)
    }

    /// Drop a worker from the table and stop its unit.
    pub(crate) fn terminate_worker(&mut self, worker: &WorkerId) -> Option<WorkerHandle> {
        let handle = self.workers.shift_remove(worker)?;
        self.host.terminate(worker);
        tracing::debug!(%worker, sent = handle.sent, received = handle.received, "worker removed");
        Some(handle)
    }

    /// Complete the run once nothing is queued or running.
    pub(crate) fn maybe_finish(&mut self) {
        let retry_settled =
            self.retry_started || !self.config.retry_on_fail || self.failed.is_empty();
        if self.phase.is_active()
            && self.workers.is_empty()
            && self.pending.is_empty()
            && retry_settled
        {
            self.complete_run();
        }
    }

    fn complete_run(&mut self) {
        self.phase = RunPhase::Completed;
        self.scheduler.cancel_all();
        let stats = self.stats.stats();
        tracing::info!(
            processed = stats.processed,
            successful = stats.successful,
            failed = stats.failed,
            errors = stats.errors,
            "run completed"
        );
        if let Some(handler) = self.on_complete.as_mut() {
            handler(&stats);
        }
    }
}
