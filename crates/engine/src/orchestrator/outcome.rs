// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turning worker messages into statistics, log entries and dispatches.

use super::{InFlightRecord, Orchestrator};
use crate::error::PoolError;
use wq_adapters::WorkerHost;
use wq_core::{wire, Clock, Message, MessageKind, WorkItem, WorkerId};

impl<H: WorkerHost, C: Clock> Orchestrator<H, C> {
    /// Handle one encoded frame from a worker.
    ///
    /// Malformed frames, messages for items the worker does not hold, and
    /// messages from workers already removed are logged and dropped.
    pub fn handle_frame(&mut self, worker: &WorkerId, frame: &[u8]) {
        if !self.workers.contains_key(worker) {
            tracing::warn!(%worker, "message from removed worker, ignoring");
            return;
        }
        let message = match decode(worker, frame) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "discarding frame");
                return;
            }
        };

        if !self
            .workers
            .get(worker)
            .is_some_and(|handle| handle.is_in_flight(message.item()))
        {
            tracing::warn!(
                %worker,
                kind = %message.kind(),
                item = %message.item(),
                "message for item not in flight, ignoring"
            );
            return;
        }

        let kind = message.kind();
        if kind.is_annotation()
            && !self
                .workers
                .get_mut(worker)
                .is_some_and(|handle| handle.annotate(message.item(), kind))
        {
            tracing::warn!(
                %worker,
                %kind,
                item = %message.item(),
                "item already reported, ignoring"
            );
            return;
        }

        match message {
            Message::Complete { item, detail } => self.on_item_complete(worker, item, detail),
            Message::Success { item, detail } => self.on_item_success(item, &detail),
            Message::Failure { item, detail } => self.record_failure(item, &detail),
            Message::Error { item, detail } => self.record_error(item, &detail),
            // Rejected by `decode_from_worker`.
            Message::Dispatch { .. } => {}
        }
    }

    fn on_item_complete(&mut self, worker: &WorkerId, item: WorkItem, detail: serde_json::Value) {
        let Some(handle) = self.workers.get_mut(worker) else {
            return;
        };
        if handle.resolve(&item).is_none() {
            return;
        }
        handle.received += 1;
        self.stats.record_processed();
        tracing::debug!(%worker, %item, "item complete");

        if let Some(handler) = self.on_item.as_mut() {
            handler(&item, &detail);
        }
        self.fill(worker);
    }

    fn on_item_success(&mut self, item: WorkItem, detail: &str) {
        self.stats.record_success();
        match self.retrying.iter().position(|r| r == &item) {
            Some(index) => {
                self.retrying.remove(index);
                self.stats.reconcile_failure();
                self.log.retry_success(&item, detail);
                tracing::info!(%item, "retry succeeded");
            }
            None => self.log.success(&item, detail),
        }
    }

    /// Record a failure. Before the retry pass begins the item becomes
    /// eligible for one retry; afterwards the failure is terminal.
    ///
    /// A retried item that fails again is still one outstanding failure, so
    /// `failed` is not incremented a second time.
    pub(crate) fn record_failure(&mut self, item: WorkItem, detail: &str) {
        self.log.failure(&item, detail);
        tracing::debug!(%item, detail, "item failed");

        if let Some(index) = self.retrying.iter().position(|r| r == &item) {
            self.retrying.remove(index);
            return;
        }
        self.stats.record_failure();
        if self.config.retry_on_fail && !self.retry_started {
            self.failed.push(item);
        }
    }

    /// Record an error, always paired with a failure for the same item.
    pub(crate) fn record_error(&mut self, item: WorkItem, detail: &str) {
        self.stats.record_error();
        self.log.error(&item, detail);
        self.record_failure(item, detail);
    }

    /// Resolve items a worker will never report on (crash, hang).
    ///
    /// Each counts as processed. Only the outcome the item has not already
    /// reported is synthesized: unreported items get an error and a
    /// failure, items that already failed get just the error.
    pub(crate) fn fail_in_flight(&mut self, records: Vec<InFlightRecord>, detail: &str) {
        for record in records {
            self.stats.record_processed();
            match record.annotation {
                None => self.record_error(record.item, detail),
                Some(MessageKind::Failure) => {
                    self.stats.record_error();
                    self.log.error(&record.item, detail);
                }
                Some(kind) => {
                    tracing::debug!(item = %record.item, %kind, "outcome already recorded");
                }
            }
        }
    }
}

fn decode(worker: &WorkerId, frame: &[u8]) -> Result<Message, PoolError> {
    wire::decode_from_worker(frame).map_err(|source| PoolError::ProtocolViolation {
        worker: worker.clone(),
        source,
    })
}
