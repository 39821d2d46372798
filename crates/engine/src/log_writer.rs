// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serialized outcome logs.
//!
//! Three newline-delimited JSON streams live under the log directory:
//!
//! ```text
//! success.log   {"<iterable_name>": "<item>", "details": "<detail>"}
//! failure.log   {"<iterable_name>": "<item>", "details": "<detail>"}
//! error.log     {"<iterable_name>": "<item>", "error": "<detail>"}
//! ```
//!
//! Every operation is enqueued on an unbounded channel and applied by one
//! drain task in arrival order, so outcome events arriving back to back
//! never interleave partial writes. Write failures are logged via tracing
//! and never propagate; logging must not break a run.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use wq_core::WorkItem;

/// One of the three outcome streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Success,
    Failure,
    Error,
}

impl LogStream {
    pub fn file_name(self) -> &'static str {
        match self {
            LogStream::Success => "success.log",
            LogStream::Failure => "failure.log",
            LogStream::Error => "error.log",
        }
    }

    fn detail_key(self) -> &'static str {
        match self {
            LogStream::Success | LogStream::Failure => "details",
            LogStream::Error => "error",
        }
    }
}

enum LogOp {
    Append {
        stream: LogStream,
        line: String,
    },
    /// Drop the last failure line for `item`, then append `line` to the
    /// success stream.
    RetrySuccess {
        item: String,
        line: String,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle to the outcome log drain task.
///
/// Cloning shares the same drain task.
#[derive(Clone)]
pub struct LogWriter {
    tx: Option<mpsc::UnboundedSender<LogOp>>,
    iterable_name: Arc<str>,
}

impl LogWriter {
    /// Start the drain task writing under `dir`.
    ///
    /// Must be called from within a Tokio runtime. The directory is created
    /// on first write.
    pub fn spawn(dir: impl Into<PathBuf>, iterable_name: &str) -> Self {
        let dir = dir.into();
        let iterable_name: Arc<str> = Arc::from(iterable_name);
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(drain(dir, Arc::clone(&iterable_name), rx));
        Self {
            tx: Some(tx),
            iterable_name,
        }
    }

    /// A writer that discards everything (no log location configured).
    pub fn disabled() -> Self {
        Self {
            tx: None,
            iterable_name: Arc::from("item"),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    pub fn success(&self, item: &WorkItem, detail: &str) {
        self.append(LogStream::Success, item, detail);
    }

    pub fn failure(&self, item: &WorkItem, detail: &str) {
        self.append(LogStream::Failure, item, detail);
    }

    pub fn error(&self, item: &WorkItem, detail: &str) {
        self.append(LogStream::Error, item, detail);
    }

    /// Replace the item's most recent failure entry with a success entry.
    ///
    /// A missing failure entry is tolerated; the success is still appended.
    pub fn retry_success(&self, item: &WorkItem, detail: &str) {
        let line = self.line(LogStream::Success, item, detail);
        self.send(LogOp::RetrySuccess {
            item: item.to_string(),
            line,
        });
    }

    /// Wait until every previously enqueued operation has been applied.
    pub async fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (done_tx, done_rx) = oneshot::channel();
        if tx.send(LogOp::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }

    fn append(&self, stream: LogStream, item: &WorkItem, detail: &str) {
        let line = self.line(stream, item, detail);
        self.send(LogOp::Append { stream, line });
    }

    fn send(&self, op: LogOp) {
        if let Some(tx) = &self.tx {
            if tx.send(op).is_err() {
                tracing::warn!("outcome log writer has stopped, dropping entry");
            }
        }
    }

    /// Render one log line, keeping the item field first.
    fn line(&self, stream: LogStream, item: &WorkItem, detail: &str) -> String {
        format!(
            "{{{}:{},{}:{}}}",
            json_string(&self.iterable_name),
            json_string(&item.to_string()),
            json_string(stream.detail_key()),
            json_string(detail),
        )
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

async fn drain(dir: PathBuf, key: Arc<str>, mut rx: mpsc::UnboundedReceiver<LogOp>) {
    while let Some(op) = rx.recv().await {
        match op {
            LogOp::Append { stream, line } => {
                if let Err(e) = append_line(&dir.join(stream.file_name()), &line) {
                    tracing::warn!(file = stream.file_name(), error = %e, "failed to write outcome log");
                }
            }
            LogOp::RetrySuccess { item, line } => {
                let failure_path = dir.join(LogStream::Failure.file_name());
                match remove_last_entry(&failure_path, &key, &item) {
                    Ok(true) => {}
                    Ok(false) => tracing::debug!(%item, "no failure entry to reconcile"),
                    Err(e) => tracing::warn!(%item, error = %e, "failed to reconcile failure log"),
                }
                let success_path = dir.join(LogStream::Success.file_name());
                if let Err(e) = append_line(&success_path, &line) {
                    tracing::warn!(file = "success.log", error = %e, "failed to write outcome log");
                }
            }
            LogOp::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)
}

/// Rewrite `path` without the last line whose `key` field equals `item`.
///
/// Returns whether a line was removed. A missing file removes nothing.
fn remove_last_entry(path: &Path, key: &str, item: &str) -> std::io::Result<bool> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    let lines: Vec<&str> = content.lines().collect();
    let Some(index) = lines.iter().rposition(|line| matches_item(line, key, item)) else {
        return Ok(false);
    };

    let mut rewritten = String::with_capacity(content.len());
    for (i, line) in lines.iter().enumerate() {
        if i != index {
            rewritten.push_str(line);
            rewritten.push('\n');
        }
    }

    let tmp_path = path.with_extension("log.tmp");
    fs::write(&tmp_path, rewritten.as_bytes())?;
    fs::rename(&tmp_path, path)?;
    Ok(true)
}

fn matches_item(line: &str, key: &str, item: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|entry| entry.get(key).and_then(|v| v.as_str()).map(|v| v == item))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "log_writer_tests.rs"]
mod tests;
