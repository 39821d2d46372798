// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::path::PathBuf;
use std::str::FromStr;

fn parse_var<T: FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}

// --- Pool sizing ---

pub fn workers() -> Option<usize> {
    parse_var("WQ_WORKERS")
}

// --- Outcome logs ---

pub fn log_dir() -> Option<PathBuf> {
    std::env::var("WQ_LOG_DIR")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

// --- Timeouts ---

pub fn timeout_ms() -> Option<u64> {
    parse_var("WQ_TIMEOUT_MS")
}
