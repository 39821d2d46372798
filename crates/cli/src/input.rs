// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reading work items from a file or stdin.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use wq_core::WorkItem;

/// Parse one item per non-empty line.
///
/// Lines that are valid JSON keep their JSON value; anything else becomes a
/// string item with surrounding whitespace trimmed.
pub fn parse_items(text: &str) -> Vec<WorkItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) => WorkItem::new(value),
            Err(_) => WorkItem::from(line),
        })
        .collect()
}

/// Read items from `path`, or from stdin when `path` is absent or `-`.
pub fn read_items(path: Option<&Path>) -> Result<Vec<WorkItem>> {
    let text = match path.filter(|p| *p != Path::new("-")) {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read items from stdin")?;
            buf
        }
    };
    Ok(parse_items(&text))
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
