// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work items: opaque values drawn from the caller's work list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One unit of work.
///
/// Items are opaque JSON values. Identity is value equality: two items with
/// the same value are the same item for failed-set and in-flight membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItem(pub serde_json::Value);

impl WorkItem {
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// Strings render bare; every other value renders as compact JSON.
///
/// This is the form written into log lines.
impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<&str> for WorkItem {
    fn from(s: &str) -> Self {
        Self(serde_json::Value::String(s.to_string()))
    }
}

impl From<String> for WorkItem {
    fn from(s: String) -> Self {
        Self(serde_json::Value::String(s))
    }
}

impl From<serde_json::Value> for WorkItem {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Render an arbitrary detail value as log text, using the same rules as
/// [`WorkItem`]'s `Display`. `null` renders as an empty string.
pub fn detail_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
