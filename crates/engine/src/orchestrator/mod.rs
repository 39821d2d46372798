// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run orchestration.
//!
//! The orchestrator owns the pending queue, the worker table, the retry
//! pass, crash containment and hung-worker recovery. It is a plain state
//! machine: every method is called from the single pool driver loop, so
//! none of its state needs locking. Workers are reached only through
//! encoded frames sent via the [`WorkerHost`].

mod dispatch;
mod lifecycle;
mod monitor;
mod outcome;

use crate::log_writer::LogWriter;
use crate::scheduler::Scheduler;
use indexmap::IndexMap;
use std::fmt;
use std::time::{Duration, Instant};
use wq_adapters::WorkerHost;
use wq_core::{
    Clock, MessageKind, PoolConfig, RunStatistics, SequentialIdGen, StatsSnapshot, StatsTracker,
    WorkItem, WorkerId,
};

/// Crashes tolerated inside one breaker window.
pub const CRASH_THRESHOLD: u32 = 5;

/// How long a recorded crash counts against the breaker.
pub const CRASH_WINDOW: Duration = Duration::from_secs(5);

/// Called with each item and its handler result when the item completes.
pub type ItemCallback = Box<dyn FnMut(&WorkItem, &serde_json::Value) + Send>;

/// Called once when the run completes.
pub type CompletionCallback = Box<dyn FnMut(&RunStatistics) + Send>;

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Not started, or paused by `stop`.
    Idle,
    /// Handing out items from the pending queue.
    Dispatching,
    /// Queue empty, waiting on in-flight items.
    Draining,
    /// Failed items were re-queued for their one retry.
    Retrying,
    Completed,
}

impl RunPhase {
    /// Whether new items may be dispatched.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            RunPhase::Dispatching | RunPhase::Draining | RunPhase::Retrying
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Idle => "idle",
            RunPhase::Dispatching => "dispatching",
            RunPhase::Draining => "draining",
            RunPhase::Retrying => "retrying",
            RunPhase::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// An item assigned to a worker and not yet resolved.
#[derive(Debug, Clone)]
pub(crate) struct InFlightRecord {
    pub item: WorkItem,
    pub dispatched_at: Instant,
    /// The success, failure or error already reported for this item.
    pub annotation: Option<MessageKind>,
}

impl InFlightRecord {
    pub fn new(item: WorkItem, dispatched_at: Instant) -> Self {
        Self {
            item,
            dispatched_at,
            annotation: None,
        }
    }
}

/// Orchestrator-side view of one worker.
#[derive(Debug, Default)]
pub(crate) struct WorkerHandle {
    pub sent: u64,
    /// Completions received. Never exceeds `sent`.
    pub received: u64,
    pub in_flight: Vec<InFlightRecord>,
    /// Finish assigned items, take no new ones, then exit.
    pub stopping: bool,
}

impl WorkerHandle {
    pub fn is_drained(&self) -> bool {
        self.received == self.sent
    }

    /// Remove the record a `complete` for `item` settles: the oldest
    /// annotated one, else the oldest.
    pub fn resolve(&mut self, item: &WorkItem) -> Option<InFlightRecord> {
        let index = self
            .in_flight
            .iter()
            .position(|r| &r.item == item && r.annotation.is_some())
            .or_else(|| self.in_flight.iter().position(|r| &r.item == item))?;
        Some(self.in_flight.remove(index))
    }

    /// Note an annotation on the oldest unannotated record for `item`.
    ///
    /// Returns false when every record for `item` is already annotated.
    pub fn annotate(&mut self, item: &WorkItem, kind: MessageKind) -> bool {
        match self
            .in_flight
            .iter_mut()
            .find(|r| &r.item == item && r.annotation.is_none())
        {
            Some(record) => {
                record.annotation = Some(kind);
                true
            }
            None => false,
        }
    }

    pub fn is_in_flight(&self, item: &WorkItem) -> bool {
        self.in_flight.iter().any(|r| &r.item == item)
    }
}

/// Dispatch/retry state machine for one pool.
pub struct Orchestrator<H: WorkerHost, C: Clock> {
    pub(crate) config: PoolConfig,
    pub(crate) host: H,
    pub(crate) clock: C,
    pub(crate) ids: SequentialIdGen,
    pub(crate) log: LogWriter,
    pub(crate) scheduler: Scheduler,
    pub(crate) phase: RunPhase,
    /// Pending items; the end of the vector is the top of the stack.
    pub(crate) pending: Vec<WorkItem>,
    /// Items eligible for the retry pass, in failure order.
    pub(crate) failed: Vec<WorkItem>,
    /// Items re-queued by the retry pass whose success has not been seen.
    pub(crate) retrying: Vec<WorkItem>,
    pub(crate) retry_started: bool,
    /// A work list was set that no run has consumed yet.
    pub(crate) fresh_work: bool,
    pub(crate) work_list_set: bool,
    /// Workers in spawn order.
    pub(crate) workers: IndexMap<WorkerId, WorkerHandle>,
    pub(crate) stats: StatsTracker,
    pub(crate) dispatched: u64,
    pub(crate) recent_crashes: u32,
    pub(crate) crash_seq: u64,
    pub(crate) on_item: Option<ItemCallback>,
    pub(crate) on_complete: Option<CompletionCallback>,
}

impl<H: WorkerHost, C: Clock> Orchestrator<H, C> {
    pub fn new(config: PoolConfig, host: H, clock: C, log: LogWriter) -> Self {
        Self {
            config,
            host,
            clock,
            ids: SequentialIdGen::default(),
            log,
            scheduler: Scheduler::new(),
            phase: RunPhase::Idle,
            pending: Vec::new(),
            failed: Vec::new(),
            retrying: Vec::new(),
            retry_started: false,
            fresh_work: false,
            work_list_set: false,
            workers: IndexMap::new(),
            stats: StatsTracker::new(),
            dispatched: 0,
            recent_crashes: 0,
            crash_seq: 0,
            on_item: None,
            on_complete: None,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RunPhase::Completed
    }

    pub fn stats(&self) -> RunStatistics {
        self.stats.stats()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot(self.clock.epoch_ms())
    }

    /// Emit a statistics snapshot if the run has work.
    pub fn auto_log(&self) -> Option<StatsSnapshot> {
        if self.stats.total_tasks() == 0 {
            return None;
        }
        Some(self.stats.log(self.clock.epoch_ms()))
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn log_writer(&self) -> &LogWriter {
        &self.log
    }

    /// Items dispatched over the orchestrator's lifetime, retries included.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Items waiting for the retry pass.
    pub fn failed_items(&self) -> &[WorkItem] {
        &self.failed
    }

    /// Live workers in spawn order.
    pub fn worker_ids(&self) -> Vec<WorkerId> {
        self.workers.keys().cloned().collect()
    }

    pub fn in_flight_len(&self, worker: &WorkerId) -> usize {
        self.workers
            .get(worker)
            .map(|w| w.in_flight.len())
            .unwrap_or(0)
    }

    /// Crashes currently counted against the breaker.
    pub fn recent_crashes(&self) -> u32 {
        self.recent_crashes
    }

    /// When the driver should next call [`Orchestrator::fire_timers`].
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn set_item_handler(&mut self, handler: ItemCallback) {
        self.on_item = Some(handler);
    }

    pub fn set_completion_handler(&mut self, handler: CompletionCallback) {
        self.on_complete = Some(handler);
    }
}

#[cfg(test)]
#[path = "../orchestrator_tests/mod.rs"]
mod tests;
