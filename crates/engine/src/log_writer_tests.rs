// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use tempfile::TempDir;

fn read_lines(dir: &Path, stream: LogStream) -> Vec<serde_json::Value> {
    fs::read_to_string(dir.join(stream.file_name()))
        .unwrap_or_default()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn item(s: &str) -> WorkItem {
    WorkItem::from(s)
}

#[tokio::test]
async fn writes_each_stream_with_schema() {
    let dir = TempDir::new().unwrap();
    let log = LogWriter::spawn(dir.path(), "url");

    log.success(&item("a"), "ok");
    log.failure(&item("b"), "bad");
    log.error(&item("c"), "boom");
    log.flush().await;

    assert_eq!(
        read_lines(dir.path(), LogStream::Success),
        vec![json!({"url": "a", "details": "ok"})]
    );
    assert_eq!(
        read_lines(dir.path(), LogStream::Failure),
        vec![json!({"url": "b", "details": "bad"})]
    );
    assert_eq!(
        read_lines(dir.path(), LogStream::Error),
        vec![json!({"url": "c", "error": "boom"})]
    );
}

#[tokio::test]
async fn item_field_comes_first() {
    let dir = TempDir::new().unwrap();
    let log = LogWriter::spawn(dir.path(), "item");

    log.success(&item("a"), "ok");
    log.flush().await;

    let raw = fs::read_to_string(dir.path().join("success.log")).unwrap();
    assert_eq!(raw, "{\"item\":\"a\",\"details\":\"ok\"}\n");
}

#[tokio::test]
async fn non_string_items_are_rendered_as_json_text() {
    let dir = TempDir::new().unwrap();
    let log = LogWriter::spawn(dir.path(), "item");

    log.failure(&WorkItem::new(json!({"id": 7})), "bad");
    log.flush().await;

    assert_eq!(
        read_lines(dir.path(), LogStream::Failure),
        vec![json!({"item": "{\"id\":7}", "details": "bad"})]
    );
}

#[tokio::test]
async fn retry_success_replaces_last_failure_entry() {
    let dir = TempDir::new().unwrap();
    let log = LogWriter::spawn(dir.path(), "item");

    log.failure(&item("x"), "first");
    log.failure(&item("y"), "other");
    log.failure(&item("x"), "second");
    log.retry_success(&item("x"), "fixed");
    log.flush().await;

    assert_eq!(
        read_lines(dir.path(), LogStream::Failure),
        vec![
            json!({"item": "x", "details": "first"}),
            json!({"item": "y", "details": "other"}),
        ]
    );
    assert_eq!(
        read_lines(dir.path(), LogStream::Success),
        vec![json!({"item": "x", "details": "fixed"})]
    );
    assert!(!dir.path().join("failure.log.tmp").exists());
}

#[tokio::test]
async fn retry_success_without_failure_entry_still_appends() {
    let dir = TempDir::new().unwrap();
    let log = LogWriter::spawn(dir.path(), "item");

    log.retry_success(&item("x"), "fixed");
    log.flush().await;

    assert!(!dir.path().join("failure.log").exists());
    assert_eq!(
        read_lines(dir.path(), LogStream::Success),
        vec![json!({"item": "x", "details": "fixed"})]
    );
}

#[tokio::test]
async fn writes_apply_in_enqueue_order() {
    let dir = TempDir::new().unwrap();
    let log = LogWriter::spawn(dir.path(), "item");

    let writers: Vec<_> = (0..3).map(|_| log.clone()).collect();
    for n in 0..30 {
        writers[n % 3].success(&item(&n.to_string()), "ok");
    }
    log.flush().await;

    let items: Vec<String> = read_lines(dir.path(), LogStream::Success)
        .iter()
        .map(|v| v["item"].as_str().unwrap().to_string())
        .collect();
    let expected: Vec<String> = (0..30).map(|n| n.to_string()).collect();
    assert_eq!(items, expected);
}

#[tokio::test]
async fn creates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("runs").join("today");
    let log = LogWriter::spawn(&nested, "item");

    log.error(&item("a"), "boom");
    log.flush().await;

    assert!(nested.join("error.log").exists());
}

#[tokio::test]
async fn write_failures_do_not_stop_the_writer() {
    let dir = TempDir::new().unwrap();
    // A file where the log directory should be makes every write fail.
    let blocked = dir.path().join("blocked");
    fs::write(&blocked, "").unwrap();
    let log = LogWriter::spawn(&blocked, "item");

    log.success(&item("a"), "ok");
    log.retry_success(&item("a"), "ok");
    log.flush().await;

    assert!(log.is_enabled());
}

#[tokio::test]
async fn disabled_writer_is_a_no_op() {
    let log = LogWriter::disabled();
    log.success(&item("a"), "ok");
    log.retry_success(&item("a"), "ok");
    log.flush().await;
    assert!(!log.is_enabled());
}

#[test]
fn matches_item_reads_named_field() {
    assert!(matches_item(r#"{"url":"a","details":"x"}"#, "url", "a"));
    assert!(!matches_item(r#"{"url":"b","details":"a"}"#, "url", "a"));
    assert!(!matches_item("not json", "url", "a"));
}
