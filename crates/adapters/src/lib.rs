// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Worker side of the pool: item handlers, the per-worker execution loop,
//! and the hosts that run workers.

pub mod host;
pub mod shell;
pub mod subprocess;
pub mod traced;
pub mod worker;

pub use host::{HostError, HostEvent, ThreadHost, WorkerHost};
pub use shell::ShellHandler;
pub use traced::TracedHost;
pub use worker::{
    HandlerError, ItemContext, ItemHandler, Outbox, WorkerFault, WorkerRuntime, WorkerSetup,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use host::{FakeHost, HostCall};
