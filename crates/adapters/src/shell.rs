// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Item handler that runs a shell command per item.

use crate::subprocess::{run_with_timeout, SHELL_COMMAND_TIMEOUT};
use crate::worker::{HandlerError, ItemContext, ItemHandler};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::process::Command;
use wq_core::WorkItem;

/// Placeholder replaced by the item in a command template.
pub const ITEM_PLACEHOLDER: &str = "{}";

/// Runs `sh -c <command> wq <item>` for each item.
///
/// The item is passed as positional `$1` (the placeholder expands to
/// `"$1"`) and exported as `WQ_ITEM`, so item text is never parsed as shell
/// syntax. Exit 0 records a success with trimmed stdout; a non-zero exit
/// records a failure with the exit code and trimmed stderr. A command that
/// cannot be started, or that outlives its timeout, is an error.
#[derive(Debug, Clone)]
pub struct ShellHandler {
    script: String,
    timeout: Duration,
}

impl ShellHandler {
    pub fn new(command: &str) -> Self {
        Self {
            script: command.replace(ITEM_PLACEHOLDER, "\"$1\""),
            timeout: SHELL_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The script handed to `sh -c`.
    pub fn script(&self) -> &str {
        &self.script
    }

    fn command(&self, item: &WorkItem) -> Command {
        let arg = item.to_string();
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.script)
            .arg("wq")
            .arg(&arg)
            .env("WQ_ITEM", &arg)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ItemHandler for ShellHandler {
    async fn process(&self, item: WorkItem, ctx: ItemContext) -> Result<Value, HandlerError> {
        let output = run_with_timeout(self.command(&item), self.timeout, "item command").await?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

        if output.status.success() {
            ctx.record_success(stdout.clone());
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            let detail = if stderr.is_empty() {
                format!("exit {}", code)
            } else {
                format!("exit {}: {}", code, stderr)
            };
            ctx.record_failure(detail);
        }
        Ok(Value::String(stdout))
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
