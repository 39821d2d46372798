// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer and scheduling management

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Identity of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Forget one recorded worker crash once the breaker window has passed.
    CrashDecay(u64),
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerId::CrashDecay(n) => write!(f, "crash-decay:{}", n),
        }
    }
}

/// Timer entry
#[derive(Debug, Clone)]
struct Timer {
    fires_at: Instant,
}

/// Manages timers for the orchestrator
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: HashMap<TimerId, Timer>,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a timer, replacing any timer with the same id
    pub fn set_timer(&mut self, id: TimerId, duration: Duration, now: Instant) {
        let fires_at = now + duration;
        self.timers.insert(id, Timer { fires_at });
    }

    /// Cancel a timer
    pub fn cancel_timer(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }

    /// Cancel every timer
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Remove and return all timers that have fired, earliest first
    pub fn fired_timers(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired: Vec<(Instant, TimerId)> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.fires_at <= now)
            .map(|(id, timer)| (timer.fires_at, *id))
            .collect();
        fired.sort_by_key(|(fires_at, _)| *fires_at);

        for (_, id) in &fired {
            self.timers.remove(id);
        }

        fired.into_iter().map(|(_, id)| id).collect()
    }

    /// Get the next timer fire time
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|t| t.fires_at).min()
    }

    /// Check if there are any pending timers
    pub fn has_timers(&self) -> bool {
        !self.timers.is_empty()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
