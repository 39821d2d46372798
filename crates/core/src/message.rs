// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message vocabulary exchanged between the orchestrator and its workers.
//!
//! Serializes as `{"type": "<kind>", "item": ..., "detail": ...}`.
//! Messages only ever cross the boundary as encoded frames (see [`crate::wire`]).

use crate::item::WorkItem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Orchestrator → worker: assign one item.
    Dispatch { item: WorkItem },

    /// Worker → orchestrator: item finished. Always re-enters dispatch.
    /// `detail` is the handler's return value.
    Complete {
        item: WorkItem,
        #[serde(default)]
        detail: serde_json::Value,
    },

    /// Worker → orchestrator: optional success annotation.
    Success {
        item: WorkItem,
        #[serde(default)]
        detail: String,
    },

    /// Worker → orchestrator: optional failure annotation.
    Failure {
        item: WorkItem,
        #[serde(default)]
        detail: String,
    },

    /// Worker → orchestrator: optional error annotation (description or trace).
    Error {
        item: WorkItem,
        #[serde(default)]
        detail: String,
    },
}

/// Discriminant of a [`Message`], used for logging and direction checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Dispatch,
    Complete,
    Success,
    Failure,
    Error,
}

impl MessageKind {
    pub const ALL: [MessageKind; 5] = [
        MessageKind::Dispatch,
        MessageKind::Complete,
        MessageKind::Success,
        MessageKind::Failure,
        MessageKind::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Dispatch => "dispatch",
            MessageKind::Complete => "complete",
            MessageKind::Success => "success",
            MessageKind::Failure => "failure",
            MessageKind::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Whether this kind travels from a worker to the orchestrator.
    pub fn is_from_worker(self) -> bool {
        !matches!(self, MessageKind::Dispatch)
    }

    /// Whether this kind is one of the at-most-one-per-item annotations.
    pub fn is_annotation(self) -> bool {
        matches!(
            self,
            MessageKind::Success | MessageKind::Failure | MessageKind::Error
        )
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Dispatch { .. } => MessageKind::Dispatch,
            Message::Complete { .. } => MessageKind::Complete,
            Message::Success { .. } => MessageKind::Success,
            Message::Failure { .. } => MessageKind::Failure,
            Message::Error { .. } => MessageKind::Error,
        }
    }

    pub fn item(&self) -> &WorkItem {
        match self {
            Message::Dispatch { item }
            | Message::Complete { item, .. }
            | Message::Success { item, .. }
            | Message::Failure { item, .. }
            | Message::Error { item, .. } => item,
        }
    }

    pub fn dispatch(item: WorkItem) -> Self {
        Message::Dispatch { item }
    }

    pub fn complete(item: WorkItem, detail: serde_json::Value) -> Self {
        Message::Complete { item, detail }
    }

    pub fn success(item: WorkItem, detail: impl Into<String>) -> Self {
        Message::Success {
            item,
            detail: detail.into(),
        }
    }

    pub fn failure(item: WorkItem, detail: impl Into<String>) -> Self {
        Message::Failure {
            item,
            detail: detail.into(),
        }
    }

    pub fn error(item: WorkItem, detail: impl Into<String>) -> Self {
        Message::Error {
            item,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
