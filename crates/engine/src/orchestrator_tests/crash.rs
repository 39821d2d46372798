// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn many_items(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("item-{}", i)).collect()
}

fn start_many(h: &mut Harness, n: usize) {
    let names = many_items(n);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    h.start(&refs);
}

/// Crash the newest live worker.
fn crash_newest(h: &mut Harness) -> Result<(), PoolError> {
    let newest = h.orch.worker_ids().pop().unwrap();
    h.orch.handle_exit(&newest, Some("item handler panicked: boom".to_string()))
}

#[test]
fn crash_records_in_flight_items_and_spawns_replacement() {
    let mut h = setup(config(1, 2));
    h.start(&["a", "b", "c"]);
    let w = worker(1);
    assert_eq!(h.in_flight(&w), vec!["c", "b"]);

    h.orch.handle_exit(&w, Some("boom".to_string())).unwrap();

    let stats = h.orch.stats();
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.errors, 2);
    assert_eq!(stats.failed, 2);
    assert_eq!(h.orch.recent_crashes(), 1);
    assert_eq!(h.host.spawned(), vec![worker(1), worker(2)]);

    // The replacement takes the last queued item, and since the queue is
    // then empty the crashed items come back through the retry pass.
    assert_eq!(h.in_flight(&worker(2)), vec!["a", "b"]);
    assert_eq!(h.orch.phase(), RunPhase::Retrying);
    assert!(h.orch.failed_items().is_empty());
}

#[test]
fn crashed_items_are_retried() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b"]);

    h.orch.handle_exit(&worker(1), Some("boom".to_string())).unwrap();
    h.drive(&[]);

    let stats = h.orch.stats();
    assert!(h.orch.is_finished());
    assert_eq!(stats.successful, 2);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.processed, 3);
}

#[test]
fn six_crashes_within_window_halt_the_run() {
    let mut h = setup(config(1, 1));
    start_many(&mut h, 20);

    for _ in 0..5 {
        crash_newest(&mut h).unwrap();
        h.clock.advance(Duration::from_millis(500));
        h.orch.fire_timers();
    }
    let err = crash_newest(&mut h).unwrap_err();

    assert!(matches!(
        err,
        PoolError::CascadingFailure {
            crashes: 6,
            window_secs: 5
        }
    ));
    assert!(h.orch.worker_ids().is_empty());
    assert!(h.host.live_workers().is_empty());
    assert!(!h.orch.phase().is_active());
    assert!(h.orch.next_deadline().is_none());
    assert_eq!(h.completions(), 0);
}

#[test]
fn spaced_crashes_keep_the_run_alive() {
    let mut h = setup(config(1, 1));
    start_many(&mut h, 20);

    for _ in 0..4 {
        crash_newest(&mut h).unwrap();
        h.clock.advance(Duration::from_secs(2));
        h.orch.fire_timers();
    }

    // The original worker plus four replacements.
    assert_eq!(h.host.spawned().len(), 5);
    assert_eq!(h.orch.worker_ids(), vec![worker(5)]);
    assert!(h.orch.phase().is_active());
}

#[test]
fn crash_count_decays_after_window() {
    let mut h = setup(config(1, 1));
    start_many(&mut h, 20);

    for _ in 0..5 {
        crash_newest(&mut h).unwrap();
    }
    assert_eq!(h.orch.recent_crashes(), 5);

    h.clock.advance(Duration::from_secs(5));
    h.orch.fire_timers();
    assert_eq!(h.orch.recent_crashes(), 0);

    // A fresh burst is tolerated again.
    for _ in 0..5 {
        crash_newest(&mut h).unwrap();
    }
    assert!(h.orch.phase().is_active());
}

#[test]
fn exit_of_removed_worker_is_not_a_crash() {
    let mut h = setup(config(2, 1));
    h.start(&["a", "b", "c"]);

    assert!(h.orch.remove_worker(Some(&worker(1)), true));
    h.orch.handle_exit(&worker(1), None).unwrap();

    assert_eq!(h.orch.recent_crashes(), 0);
    assert_eq!(h.host.spawned().len(), 2);
}

#[test]
fn unexpected_clean_exit_counts_as_crash() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b"]);

    h.orch.handle_exit(&worker(1), None).unwrap();

    assert_eq!(h.orch.recent_crashes(), 1);
    assert_eq!(h.orch.stats().errors, 1);
    assert_eq!(h.orch.worker_ids(), vec![worker(2)]);
}

#[test]
fn crash_while_paused_is_not_replaced() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b"]);

    h.orch.stop(false);
    h.orch.handle_exit(&worker(1), Some("boom".to_string())).unwrap();

    assert_eq!(h.host.spawned(), vec![worker(1)]);
    assert_eq!(h.orch.phase(), RunPhase::Idle);
}

#[test]
fn crash_of_last_worker_after_queue_drained_completes_run() {
    let mut cfg = config(1, 1);
    cfg.retry_on_fail = false;
    let mut h = setup(cfg);
    h.start(&["a"]);

    h.orch.handle_exit(&worker(1), Some("boom".to_string())).unwrap();

    // The replacement finds nothing to do and is removed.
    assert!(h.orch.is_finished());
    assert_eq!(h.orch.stats().processed, 1);
    assert_eq!(h.completions(), 1);
}
