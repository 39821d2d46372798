// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-side execution loop.
//!
//! A worker receives `dispatch` frames, runs the application's item handler
//! for each item as a local task, and reports outcomes as frames. Items
//! dispatched before the worker setup hook finishes are buffered and run
//! once the worker signals readiness.

mod handler;

pub use handler::{HandlerError, ItemContext, ItemHandler, WorkerSetup};

use crate::host::HostEvent;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use wq_core::{detail_text, wire, Message, WorkItem, WorkerId};

/// Why a worker stopped abnormally. Reported to the orchestrator as a crash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerFault {
    #[error("worker setup failed: {0}")]
    Setup(HandlerError),
    #[error("item handler panicked: {0}")]
    Panic(String),
    #[error("worker runtime failed: {0}")]
    Runtime(String),
}

/// Sending half of a worker's channel to the orchestrator.
#[derive(Clone)]
pub struct Outbox {
    worker: WorkerId,
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl Outbox {
    pub fn new(worker: WorkerId, tx: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self { worker, tx }
    }

    pub fn worker(&self) -> &WorkerId {
        &self.worker
    }

    /// Encode and send one message. Failures are logged, never raised.
    ///
    /// An outcome too large to encode is replaced by its oversize stand-in
    /// so the orchestrator still hears about the item.
    pub fn send(&self, msg: &Message) {
        let frame = match wire::encode(msg) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(worker = %self.worker, kind = %msg.kind(), error = %e, "failed to encode message");
                match oversize_stand_in(msg, &e).map(|m| wire::encode(&m)) {
                    Some(Ok(frame)) => frame,
                    _ => return,
                }
            }
        };
        let event = HostEvent::Frame {
            worker: self.worker.clone(),
            frame,
        };
        if self.tx.send(event).is_err() {
            tracing::debug!(worker = %self.worker, "orchestrator channel closed, dropping message");
        }
    }
}

/// Annotations become an `error` naming the encode failure; `complete`
/// drops its detail.
fn oversize_stand_in(msg: &Message, error: &wire::ProtocolError) -> Option<Message> {
    match msg {
        Message::Dispatch { .. } => None,
        Message::Complete { item, .. } => Some(Message::complete(
            item.clone(),
            serde_json::Value::Null,
        )),
        Message::Success { item, .. }
        | Message::Failure { item, .. }
        | Message::Error { item, .. } => Some(Message::error(
            item.clone(),
            format!("{} could not be reported: {}", msg.kind(), error),
        )),
    }
}

/// Per-worker execution state.
pub struct WorkerRuntime {
    handler: Arc<dyn ItemHandler>,
    outbox: Outbox,
    ready: bool,
    /// Items received before `signal_ready`, in arrival order.
    pending: VecDeque<WorkItem>,
    tasks: JoinSet<()>,
}

impl WorkerRuntime {
    pub fn new(handler: Arc<dyn ItemHandler>, outbox: Outbox) -> Self {
        Self {
            handler,
            outbox,
            ready: false,
            pending: VecDeque::new(),
            tasks: JoinSet::new(),
        }
    }

    pub fn worker(&self) -> &WorkerId {
        self.outbox.worker()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Items buffered while the worker was not yet ready.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Items currently executing on this worker.
    pub fn running_len(&self) -> usize {
        self.tasks.len()
    }

    /// Handle one frame from the orchestrator.
    ///
    /// Must be called from within a `LocalSet`.
    pub fn handle_frame(&mut self, frame: &[u8]) {
        match wire::decode_from_orchestrator(frame) {
            Ok(Message::Dispatch { item }) => {
                if self.ready {
                    self.process_item(item);
                } else {
                    self.pending.push_back(item);
                }
            }
            Ok(other) => {
                tracing::warn!(worker = %self.worker(), kind = %other.kind(), "unexpected message, discarding");
            }
            Err(e) => {
                tracing::warn!(worker = %self.worker(), error = %e, "protocol violation, discarding frame");
            }
        }
    }

    /// Run every buffered item, then process new items on arrival.
    pub fn signal_ready(&mut self) {
        while let Some(item) = self.pending.pop_front() {
            self.process_item(item);
        }
        self.ready = true;
        tracing::debug!(worker = %self.worker(), "worker ready");
    }

    /// Start one item as a local task. Several items may be suspended at
    /// once; the orchestrator bounds how many it sends.
    pub fn process_item(&mut self, item: WorkItem) {
        let handler = Arc::clone(&self.handler);
        let outbox = self.outbox.clone();
        self.tasks.spawn_local(run_item(handler, item, outbox));
    }

    /// Wait for the next item task to finish. A panicked task is a crash.
    ///
    /// Returns `None` when nothing is running.
    pub async fn join_next(&mut self) -> Option<Result<(), WorkerFault>> {
        let joined = self.tasks.join_next().await?;
        Some(match joined {
            Ok(()) => Ok(()),
            Err(e) if e.is_panic() => Err(WorkerFault::Panic(panic_message(e.into_panic()))),
            Err(e) => Err(WorkerFault::Runtime(e.to_string())),
        })
    }

    /// Main loop: run setup concurrently with receiving dispatches, then
    /// process items until the inbox closes.
    ///
    /// The inbox closing means the orchestrator terminated this worker;
    /// unfinished items are dropped with the runtime.
    pub async fn run(
        mut self,
        mut inbox: mpsc::UnboundedReceiver<Vec<u8>>,
        setup: Option<Arc<dyn WorkerSetup>>,
    ) -> Result<(), WorkerFault> {
        let worker = self.worker().clone();
        let setup_fut = async move {
            match setup {
                Some(hook) => hook.setup(&worker).await,
                None => Ok(()),
            }
        };
        tokio::pin!(setup_fut);
        let mut setup_done = false;

        loop {
            tokio::select! {
                result = &mut setup_fut, if !setup_done => {
                    setup_done = true;
                    result.map_err(WorkerFault::Setup)?;
                    self.signal_ready();
                }
                frame = inbox.recv() => match frame {
                    Some(frame) => self.handle_frame(&frame),
                    None => return Ok(()),
                },
                Some(joined) = self.join_next(), if !self.tasks.is_empty() => joined?,
            }
        }
    }
}

/// Process one item and report its outcome.
///
/// Without an explicit annotation from the handler, `Ok` is reported as
/// `success` and `Err` as `error`. A `complete` message always follows.
async fn run_item(handler: Arc<dyn ItemHandler>, item: WorkItem, outbox: Outbox) {
    let ctx = ItemContext::new(item.clone(), outbox.clone());
    let detail = match handler.process(item.clone(), ctx.clone()).await {
        Ok(value) => {
            if !ctx.is_annotated() {
                ctx.record_success(detail_text(&value));
            }
            value
        }
        Err(e) => {
            if !ctx.is_annotated() {
                ctx.record_error(e.to_string());
            }
            serde_json::Value::Null
        }
    };
    outbox.send(&Message::complete(item, detail));
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "../worker_tests.rs"]
mod tests;
