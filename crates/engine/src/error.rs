// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the pool engine

use thiserror::Error;
use wq_adapters::HostError;
use wq_core::{ConfigError, ProtocolError, WorkerId};

/// Run-level errors.
///
/// Item-level outcomes (failures, errors, crashes, hangs) are never returned
/// here; they are recorded in the statistics and logs.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("protocol violation from {worker}: {source}")]
    ProtocolViolation {
        worker: WorkerId,
        #[source]
        source: ProtocolError,
    },
    #[error("cascading failure: {crashes} worker crashes within {window_secs}s")]
    CascadingFailure { crashes: u32, window_secs: u64 },
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Config(ConfigError),
    #[error("pool is shut down")]
    Shutdown,
}

impl From<ConfigError> for PoolError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Invalid(message) => PoolError::InvalidInput(message),
            other => PoolError::Config(other),
        }
    }
}
