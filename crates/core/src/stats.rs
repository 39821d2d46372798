// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run statistics: counters, hourly rates and completion estimates.

use crate::time_fmt::{format_elapsed_ms, format_epoch_local};
use serde::Serialize;
use std::fmt;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Counters for one run.
///
/// `processed`, `successful` and `errors` only grow. `failed` counts
/// *currently outstanding* failures: it drops by one when a retried item
/// later succeeds, so it is not a cumulative event count. An error event is
/// always paired with a failure event for the same item, which is why
/// `processed` need not equal the sum of the other counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub errors: u64,
    /// Items expected this run, including items re-queued for retry.
    pub total_tasks: u64,
    /// Wall-clock start, epoch milliseconds. `None` until the run starts.
    pub started_at_ms: Option<u64>,
}

impl RunStatistics {
    /// Items expected but not yet processed.
    pub fn remaining(&self) -> u64 {
        self.total_tasks.saturating_sub(self.processed)
    }
}

/// Per-hour rate for each counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HourlyRates {
    pub processed: f64,
    pub successful: f64,
    pub failed: f64,
    pub errors: f64,
}

/// Point-in-time view of the statistics with derived rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub stats: RunStatistics,
    pub elapsed_ms: u64,
    pub hourly: HourlyRates,
    /// `None` while nothing has been processed yet.
    pub remaining_hours: Option<f64>,
    pub estimated_end_ms: Option<u64>,
}

/// `count * 3_600_000 / elapsed_ms`, zero when no time has elapsed.
pub fn hourly_rate(count: u64, elapsed_ms: u64) -> f64 {
    if elapsed_ms == 0 {
        return 0.0;
    }
    count as f64 * MS_PER_HOUR / elapsed_ms as f64
}

/// Accumulates counters for a run and derives rates on demand.
#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    stats: RunStatistics,
}

/// Resume tracking from finished counters, e.g. to render a final report.
impl From<RunStatistics> for StatsTracker {
    fn from(stats: RunStatistics) -> Self {
        Self { stats }
    }
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start time. Resuming a paused run keeps the original start.
    pub fn start(&mut self, now_ms: u64) {
        if self.stats.started_at_ms.is_none() {
            self.stats.started_at_ms = Some(now_ms);
        }
    }

    pub fn set_total(&mut self, total: u64) {
        self.stats.total_tasks = total;
    }

    pub fn add_total(&mut self, extra: u64) {
        self.stats.total_tasks += extra;
    }

    pub fn record_processed(&mut self) {
        self.stats.processed += 1;
    }

    pub fn record_success(&mut self) {
        self.stats.successful += 1;
    }

    pub fn record_failure(&mut self) {
        self.stats.failed += 1;
    }

    pub fn record_error(&mut self) {
        self.stats.errors += 1;
    }

    /// A previously failed item succeeded on retry.
    pub fn reconcile_failure(&mut self) {
        self.stats.failed = self.stats.failed.saturating_sub(1);
    }

    pub fn stats(&self) -> RunStatistics {
        self.stats
    }

    pub fn total_tasks(&self) -> u64 {
        self.stats.total_tasks
    }

    /// Recompute elapsed time, rates and the completion estimate.
    pub fn snapshot(&self, now_ms: u64) -> StatsSnapshot {
        let stats = self.stats;
        let elapsed_ms = stats
            .started_at_ms
            .map(|start| now_ms.saturating_sub(start))
            .unwrap_or(0);

        let hourly = HourlyRates {
            processed: hourly_rate(stats.processed, elapsed_ms),
            successful: hourly_rate(stats.successful, elapsed_ms),
            failed: hourly_rate(stats.failed, elapsed_ms),
            errors: hourly_rate(stats.errors, elapsed_ms),
        };

        let remaining_hours = if hourly.processed > 0.0 {
            Some(stats.remaining() as f64 / hourly.processed)
        } else {
            None
        };
        let estimated_end_ms =
            remaining_hours.map(|hours| now_ms + (hours * MS_PER_HOUR).round() as u64);

        StatsSnapshot {
            stats,
            elapsed_ms,
            hourly,
            remaining_hours,
            estimated_end_ms,
        }
    }

    /// Snapshot and emit it on the operational log.
    pub fn log(&self, now_ms: u64) -> StatsSnapshot {
        let snapshot = self.snapshot(now_ms);
        tracing::info!(
            processed = snapshot.stats.processed,
            total = snapshot.stats.total_tasks,
            "\n{}",
            snapshot
        );
        snapshot
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let started = self
            .stats
            .started_at_ms
            .map(format_epoch_local)
            .unwrap_or_else(|| "not started".to_string());
        let end = self
            .estimated_end_ms
            .map(format_epoch_local)
            .unwrap_or_else(|| "unknown".to_string());

        writeln!(f, "Started:       {}", started)?;
        writeln!(f, "Elapsed:       {}", format_elapsed_ms(self.elapsed_ms))?;
        writeln!(f, "Estimated End: {}", end)?;
        writeln!(
            f,
            "Processed:     {} ({:.1}/hr)",
            self.stats.processed, self.hourly.processed
        )?;
        writeln!(
            f,
            "Success:       {} ({:.1}/hr)",
            self.stats.successful, self.hourly.successful
        )?;
        writeln!(
            f,
            "Failures:      {} ({:.1}/hr)",
            self.stats.failed, self.hourly.failed
        )?;
        write!(
            f,
            "Errors:        {} ({:.1}/hr)",
            self.stats.errors, self.hourly.errors
        )
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
