// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wq execution engine: orchestration, outcome logs and the pool driver

mod error;
pub mod log_writer;
mod orchestrator;
mod pool;
mod scheduler;

pub use error::PoolError;
pub use log_writer::{LogStream, LogWriter};
pub use orchestrator::{
    CompletionCallback, ItemCallback, Orchestrator, RunPhase, CRASH_THRESHOLD, CRASH_WINDOW,
};
pub use pool::{Pool, PoolHandle, PoolHooks, RunSetup, SetupHook};
pub use scheduler::{Scheduler, TimerId};
