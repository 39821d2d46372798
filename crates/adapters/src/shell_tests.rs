// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::host::HostEvent;
use crate::worker::Outbox;
use tokio::sync::mpsc;
use wq_core::{wire, Message, WorkerId};
use yare::parameterized;

async fn run(handler: &ShellHandler, item: &str) -> (Result<Value, HandlerError>, Vec<Message>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let outbox = Outbox::new(WorkerId::new("worker-1"), tx);
    let item = WorkItem::from(item);
    let ctx = ItemContext::new(item.clone(), outbox);
    let result = handler.process(item, ctx).await;

    let mut messages = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let HostEvent::Frame { frame, .. } = event {
            messages.push(wire::decode(&frame).unwrap());
        }
    }
    (result, messages)
}

#[parameterized(
    bare = { "echo {}", "echo \"$1\"" },
    repeated = { "cp {} {}.bak", "cp \"$1\" \"$1\".bak" },
    none = { "date", "date" },
)]
fn placeholder_expands_to_positional_arg(command: &str, expected: &str) {
    assert_eq!(ShellHandler::new(command).script(), expected);
}

#[tokio::test]
async fn zero_exit_records_success_with_stdout() {
    let handler = ShellHandler::new("echo hello {}");
    let (result, messages) = run(&handler, "world").await;

    assert_eq!(result.unwrap(), Value::String("hello world".to_string()));
    assert_eq!(
        messages,
        vec![Message::success(WorkItem::from("world"), "hello world")]
    );
}

#[tokio::test]
async fn nonzero_exit_records_failure_with_stderr() {
    let handler = ShellHandler::new("echo bad {} >&2; exit 3");
    let (result, messages) = run(&handler, "x").await;

    assert!(result.is_ok());
    assert_eq!(
        messages,
        vec![Message::failure(WorkItem::from("x"), "exit 3: bad x")]
    );
}

#[tokio::test]
async fn item_is_not_parsed_as_shell_syntax() {
    let handler = ShellHandler::new("printf '%s' {}");
    let (result, _) = run(&handler, "a; echo injected").await;
    assert_eq!(result.unwrap(), Value::String("a; echo injected".to_string()));
}

#[tokio::test]
async fn item_is_exported_in_environment() {
    let handler = ShellHandler::new("echo \"$WQ_ITEM\"");
    let (result, _) = run(&handler, "from-env").await;
    assert_eq!(result.unwrap(), Value::String("from-env".to_string()));
}

#[tokio::test]
async fn timeout_is_an_error_without_annotation() {
    let handler = ShellHandler::new("sleep 5").with_timeout(Duration::from_millis(100));
    let (result, messages) = run(&handler, "slow").await;

    let err = result.unwrap_err();
    assert!(err.0.contains("timed out"), "got: {}", err);
    assert!(messages.is_empty());
}
