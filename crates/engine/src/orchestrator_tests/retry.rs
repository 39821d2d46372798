// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

#[test]
fn failed_item_is_retried_once_and_reconciled() {
    let mut h = setup(config(1, 1));
    h.start(&["1", "2", "3", "4", "5"]);

    h.drive(&["2"]);

    let stats = h.orch.stats();
    assert_eq!(stats.successful, 5);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.processed, 6);
    assert_eq!(stats.total_tasks, 6);
    assert_eq!(h.dispatched(), vec!["5", "4", "3", "2", "1", "2"]);
    assert!(h.orch.is_finished());
    assert_eq!(h.completions(), 1);
}

#[test]
fn retry_pass_moves_to_retrying_phase() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b"]);
    let w = worker(1);

    h.fail(&w, "b");
    assert_eq!(h.orch.failed_items(), &[WorkItem::from("b")]);
    h.succeed(&w, "a");

    assert_eq!(h.orch.phase(), RunPhase::Retrying);
    assert!(h.orch.failed_items().is_empty());
    assert_eq!(h.in_flight(&w), vec!["b"]);
}

#[test]
fn retried_item_that_fails_again_is_terminal() {
    let mut h = setup(config(1, 1));
    h.start(&["x"]);
    let w = worker(1);

    h.fail(&w, "x");
    h.fail(&w, "x");

    let stats = h.orch.stats();
    assert!(h.orch.is_finished());
    assert_eq!(h.dispatched(), vec!["x", "x"]);
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(h.completions(), 1);
}

#[test]
fn failures_after_retry_began_are_terminal() {
    let mut h = setup(config(2, 1));
    h.start(&["a", "b"]);
    let (w1, w2) = (worker(1), worker(2));
    assert_eq!(h.in_flight(&w1), vec!["b"]);
    assert_eq!(h.in_flight(&w2), vec!["a"]);

    // Worker 1 drains the queue first and starts the retry pass with "b".
    h.fail(&w1, "b");
    assert_eq!(h.orch.phase(), RunPhase::Retrying);
    assert_eq!(h.in_flight(&w1), vec!["b"]);

    h.fail(&w2, "a");
    assert!(h.orch.failed_items().is_empty());
    h.succeed(&w1, "b");

    let stats = h.orch.stats();
    assert!(h.orch.is_finished());
    assert_eq!(stats.processed, 3);
    assert_eq!(stats.successful, 1);
    assert_eq!(stats.failed, 1);
}

#[test]
fn error_is_paired_with_failure_and_retried() {
    let mut h = setup(config(1, 1));
    h.start(&["x"]);
    let w = worker(1);

    h.error(&w, "x");
    let stats = h.orch.stats();
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(h.in_flight(&w), vec!["x"]);

    h.succeed(&w, "x");
    let stats = h.orch.stats();
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.successful, 1);
}

#[test]
fn run_without_failures_never_enters_retrying() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b", "c"]);
    h.drive(&[]);

    assert!(h.orch.is_finished());
    assert_eq!(h.orch.stats().total_tasks, 3);
    assert_eq!(h.dispatched().len(), 3);
}

#[test]
fn duplicate_items_are_each_retried() {
    let mut h = setup(config(1, 1));
    h.start(&["x", "x"]);
    let w = worker(1);

    h.fail(&w, "x");
    h.fail(&w, "x");
    assert_eq!(h.orch.stats().failed, 2);
    assert_eq!(h.orch.phase(), RunPhase::Retrying);

    h.succeed(&w, "x");
    h.succeed(&w, "x");

    let stats = h.orch.stats();
    assert!(h.orch.is_finished());
    assert_eq!(h.dispatched(), vec!["x", "x", "x", "x"]);
    assert_eq!(stats.total_tasks, 4);
    assert_eq!(stats.processed, 4);
    assert_eq!(stats.successful, 2);
    assert_eq!(stats.failed, 0);
}

#[test]
fn success_reported_before_crash_is_not_retried() {
    let mut h = setup(config(1, 1));
    h.start(&["x"]);

    h.send(&worker(1), Message::success(WorkItem::from("x"), "ok"));
    h.orch.handle_exit(&worker(1), Some("boom".to_string())).unwrap();

    let stats = h.orch.stats();
    assert!(h.orch.is_finished());
    assert_eq!(h.dispatched(), vec!["x"]);
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.successful, 1);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn retry_success_rewrites_failure_log() {
    let dir = TempDir::new().unwrap();
    let log = LogWriter::spawn(dir.path(), "item");
    let mut h = setup_with_log(config(1, 1), log.clone());
    h.start(&["1", "2", "3"]);

    h.drive(&["2"]);
    log.flush().await;

    let read = |name: &str| -> Vec<serde_json::Value> {
        std::fs::read_to_string(dir.path().join(name))
            .unwrap_or_default()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    };
    let failures = read("failure.log");
    let successes = read("success.log");

    assert!(failures.iter().all(|e| e["item"] != "2"), "{failures:?}");
    assert_eq!(successes.iter().filter(|e| e["item"] == "2").count(), 1);
    assert_eq!(successes.len(), 3);
}

#[tokio::test]
async fn failure_reported_before_crash_is_counted_once() {
    let dir = TempDir::new().unwrap();
    let log = LogWriter::spawn(dir.path(), "item");
    let mut h = setup_with_log(config(1, 1), log.clone());
    h.start(&["x"]);

    h.send(&worker(1), Message::failure(WorkItem::from("x"), "bad"));
    h.orch.handle_exit(&worker(1), Some("boom".to_string())).unwrap();

    let stats = h.orch.stats();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.errors, 1);
    assert_eq!(h.in_flight(&worker(2)), vec!["x"]);

    h.succeed(&worker(2), "x");
    log.flush().await;

    let stats = h.orch.stats();
    assert!(h.orch.is_finished());
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.successful, 1);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.failed, 0);

    let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap_or_default();
    assert!(read("failure.log").trim().is_empty());
    assert_eq!(read("error.log").lines().count(), 1);
    assert_eq!(read("success.log").lines().count(), 1);
}
