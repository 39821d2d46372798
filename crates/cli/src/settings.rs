// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effective pool configuration: config file, then `WQ_*` environment,
//! then command-line flags.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use wq_core::PoolConfig;

/// Pool options shared by every subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct PoolArgs {
    /// TOML file with pool settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of workers
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Items each worker runs concurrently
    #[arg(short = 'p', long)]
    pub parallel: Option<usize>,

    /// Do not retry failed items
    #[arg(long)]
    pub no_retry: bool,

    /// Recycle workers whose items run longer than this
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Directory for success.log, failure.log and error.log
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Field name used for the item in outcome logs
    #[arg(long, value_name = "LABEL")]
    pub name: Option<String>,

    /// Log a statistics snapshot every S seconds
    #[arg(long, value_name = "S")]
    pub stats_interval: Option<u64>,
}

/// Values taken from `WQ_*` environment variables.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvOverrides {
    pub workers: Option<usize>,
    pub log_dir: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            workers: crate::env::workers(),
            log_dir: crate::env::log_dir(),
            timeout_ms: crate::env::timeout_ms(),
        }
    }
}

impl PoolArgs {
    /// Build and validate the effective configuration.
    pub fn resolve(&self, env: EnvOverrides) -> Result<PoolConfig> {
        let mut config = match &self.config {
            Some(path) => PoolConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => PoolConfig::default(),
        };

        if let Some(workers) = env.workers {
            config.worker_count = workers;
        }
        if let Some(dir) = env.log_dir {
            config.log_location = Some(dir);
        }
        if let Some(ms) = env.timeout_ms {
            config.timeout_ms = Some(ms);
        }

        if let Some(workers) = self.workers {
            config.worker_count = workers;
        }
        if let Some(parallel) = self.parallel {
            config.parallel_processes = parallel;
        }
        if self.no_retry {
            config.retry_on_fail = false;
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = Some(ms);
        }
        if let Some(dir) = &self.log_dir {
            config.log_location = Some(dir.clone());
        }
        if let Some(name) = &self.name {
            config.iterable_name = name.clone();
        }
        if let Some(secs) = self.stats_interval {
            config.stats_interval_secs = Some(secs);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
