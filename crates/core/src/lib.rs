// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wq-core: shared types for the wq worker pool

pub mod clock;
pub mod config;
pub mod id;
pub mod item;
pub mod message;
pub mod stats;
pub mod time_fmt;
pub mod wire;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, PoolConfig};
pub use id::{IdGen, RunId, SequentialIdGen, UuidIdGen, WorkerId};
pub use item::{detail_text, WorkItem};
pub use message::{Message, MessageKind};
pub use stats::{hourly_rate, HourlyRates, RunStatistics, StatsSnapshot, StatsTracker};
pub use time_fmt::{format_elapsed, format_elapsed_ms, format_epoch_local};
pub use wire::ProtocolError;
