// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool configuration.
//!
//! ```toml
//! worker_count = 4
//! parallel_processes = 2
//! retry_on_fail = true
//! auto_start = true
//! log_location = "logs"
//! iterable_name = "url"
//! timeout_ms = 30000
//! stats_interval_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Recognized pool options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Number of worker units to spawn on start.
    pub worker_count: usize,
    /// Items each worker may have in flight at once.
    pub parallel_processes: usize,
    /// Re-queue failed items once after the main queue drains.
    pub retry_on_fail: bool,
    /// Start dispatching as soon as the setup hook has run.
    pub auto_start: bool,
    /// Directory for the success/failure/error logs. Absent disables them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_location: Option<PathBuf>,
    /// Field name used for the item in log lines.
    pub iterable_name: String,
    /// Per-item timeout. Absent disables hung-worker detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Interval for periodic statistics snapshots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_interval_secs: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            parallel_processes: 1,
            retry_on_fail: true,
            auto_start: true,
            log_location: None,
            iterable_name: "item".to_string(),
            timeout_ms: None,
            stats_interval_secs: None,
        }
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl PoolConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid(
                "worker_count must be greater than 0".to_string(),
            ));
        }
        if self.parallel_processes == 0 {
            return Err(ConfigError::Invalid(
                "parallel_processes must be greater than 0".to_string(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.stats_interval_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "stats_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.iterable_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "iterable_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Hung-worker scan interval: twice the per-item timeout.
    pub fn scan_interval(&self) -> Option<Duration> {
        self.timeout().map(|t| t * 2)
    }

    pub fn stats_interval(&self) -> Option<Duration> {
        self.stats_interval_secs.map(Duration::from_secs)
    }

    /// Render as TOML (for `wq config`).
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
