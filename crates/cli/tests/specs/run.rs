//! `wq run` specs
//!
//! Items go in on stdin or a file, outcomes come out as the statistics
//! block, the exit code and the outcome logs.

use crate::prelude::*;

#[test]
fn every_item_succeeds() {
    let ws = Workspace::new();
    ws.wq()
        .args(&["run", "-w", "2", "--", "test", "-n", "{}"])
        .stdin("a\nb\n\nc\n")
        .passes()
        .stdout_has("Processed:     3")
        .stdout_has("Success:       3")
        .stdout_has("Failures:      0");
}

#[test]
fn reads_items_from_input_file() {
    let ws = Workspace::new();
    ws.file("items.txt", "one\ntwo\n");
    ws.wq()
        .args(&["run", "--input", "items.txt", "--", "true"])
        .passes()
        .stdout_has("Processed:     2");
}

#[test]
fn remaining_failures_exit_one() {
    let ws = Workspace::new();
    ws.wq()
        .args(&["run", "-w", "1", "--", "test", "{}", "!=", "bad"])
        .stdin("good\nbad\n")
        .exits(1)
        .stdout_has("Failures:      1")
        // The failing item is retried once.
        .stdout_has("Processed:     3");
}

#[test]
fn no_retry_processes_each_item_once() {
    let ws = Workspace::new();
    ws.wq()
        .args(&["run", "--no-retry", "--", "test", "{}", "!=", "bad"])
        .stdin("good\nbad\n")
        .exits(1)
        .stdout_has("Processed:     2");
}

#[test]
fn outcome_logs_use_item_label() {
    let ws = Workspace::new();
    ws.wq()
        .args(&[
            "run", "-w", "1", "--log-dir", "logs", "--name", "url", "--no-retry", "--",
            "echo out-{}; test {} != bad",
        ])
        .stdin("good\nbad\n")
        .exits(1);

    let success = ws.read("logs/success.log");
    assert!(
        success.contains(r#"{"url":"good","details":"out-good"}"#),
        "{success}"
    );
    let failure = ws.read("logs/failure.log");
    assert!(
        failure.contains(r#"{"url":"bad","details":"exit 1"}"#),
        "{failure}"
    );
}

#[test]
fn retried_success_clears_failure_log() {
    let ws = Workspace::new();
    ws.wq()
        .args(&[
            "run", "-w", "1", "--log-dir", "logs", "--",
            "if [ -e {}.seen ]; then echo done; else touch {}.seen; exit 1; fi",
        ])
        .stdin("x\ny\n")
        .passes()
        .stdout_has("Processed:     4")
        .stdout_has("Failures:      0");

    assert_eq!(ws.read("logs/failure.log").trim(), "");
    assert_eq!(ws.read("logs/success.log").lines().count(), 2);
}

#[test]
fn items_are_never_parsed_as_shell() {
    let ws = Workspace::new();
    ws.wq()
        .args(&["run", "--", "echo", "{}"])
        .stdin("$(touch pwned)\n; touch pwned2\n")
        .passes();

    assert!(!ws.path().join("pwned").exists());
    assert!(!ws.path().join("pwned2").exists());
}

#[test]
fn item_is_exported_as_env_var() {
    let ws = Workspace::new();
    ws.wq()
        .args(&["run", "--", "test \"$WQ_ITEM\" = hello"])
        .stdin("hello\n")
        .passes()
        .stdout_has("Success:       1");
}

#[test]
fn empty_input_is_fatal() {
    let ws = Workspace::new();
    ws.wq()
        .args(&["run", "--", "true"])
        .stdin("\n\n")
        .exits(2)
        .stderr_has("work list is empty");
}

#[test]
fn invalid_worker_count_is_fatal() {
    let ws = Workspace::new();
    ws.wq()
        .args(&["run", "-w", "0", "--", "true"])
        .stdin("a\n")
        .exits(2)
        .stderr_has("worker_count must be greater than 0");
}

#[test]
fn operational_log_goes_to_log_file() {
    let ws = Workspace::new();
    ws.wq()
        .env("RUST_LOG", "info")
        .args(&["run", "--log-file", "run.log", "--", "true"])
        .stdin("a\n")
        .passes();

    let log = ws.read("run.log");
    assert!(log.contains("run complete"), "{log}");
}
