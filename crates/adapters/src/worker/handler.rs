// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capabilities supplied by the embedding application.

use super::Outbox;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use wq_core::{Message, WorkItem, WorkerId};

/// Error returned by an item handler or worker setup hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for HandlerError {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for HandlerError {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(e: std::io::Error) -> Self {
        Self(e.to_string())
    }
}

/// Per-item processing function.
///
/// Invoked once per dispatched item on the worker that received it. The
/// returned value becomes the `detail` of the item's `complete` message.
/// Panicking crashes the whole worker.
#[async_trait]
pub trait ItemHandler: Send + Sync + 'static {
    async fn process(
        &self,
        item: WorkItem,
        ctx: ItemContext,
    ) -> Result<serde_json::Value, HandlerError>;
}

/// Worker-side setup hook, run once per worker before it signals readiness.
///
/// Returning an error crashes the worker.
#[async_trait]
pub trait WorkerSetup: Send + Sync + 'static {
    async fn setup(&self, worker: &WorkerId) -> Result<(), HandlerError>;
}

/// Handle given to the item handler for explicit outcome annotations.
///
/// At most one annotation is emitted per item; later calls are ignored.
#[derive(Clone)]
pub struct ItemContext {
    item: WorkItem,
    worker: WorkerId,
    outbox: Outbox,
    annotated: Arc<AtomicBool>,
}

impl ItemContext {
    pub(crate) fn new(item: WorkItem, outbox: Outbox) -> Self {
        Self {
            item,
            worker: outbox.worker().clone(),
            outbox,
            annotated: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn item(&self) -> &WorkItem {
        &self.item
    }

    /// Identity of the worker running this item.
    pub fn worker(&self) -> &WorkerId {
        &self.worker
    }

    pub fn record_success(&self, detail: impl Into<String>) {
        self.annotate(Message::success(self.item.clone(), detail));
    }

    pub fn record_failure(&self, detail: impl Into<String>) {
        self.annotate(Message::failure(self.item.clone(), detail));
    }

    pub fn record_error(&self, error: impl Into<String>) {
        self.annotate(Message::error(self.item.clone(), error));
    }

    /// Whether an annotation has already been emitted for this item.
    pub fn is_annotated(&self) -> bool {
        self.annotated.load(Ordering::SeqCst)
    }

    fn annotate(&self, msg: Message) {
        if self.annotated.swap(true, Ordering::SeqCst) {
            tracing::debug!(
                worker = %self.worker,
                item = %self.item,
                kind = %msg.kind(),
                "item already annotated, ignoring"
            );
            return;
        }
        self.outbox.send(&msg);
    }
}
