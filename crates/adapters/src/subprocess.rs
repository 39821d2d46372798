// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for per-item shell commands.
/// Set to 10 minutes as a safety net for long-running user scripts.
pub const SHELL_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child process
/// is killed when the returned future is dropped or the timeout elapses,
/// provided the command was built with `kill_on_drop(true)`.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}",
            description,
            wq_core::format_elapsed(timeout.as_secs())
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
