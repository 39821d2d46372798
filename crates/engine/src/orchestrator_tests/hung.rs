// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn timed_config(parallel: usize) -> PoolConfig {
    PoolConfig {
        timeout_ms: Some(1000),
        ..config(1, parallel)
    }
}

fn start_ten(h: &mut Harness) {
    h.start(&["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]);
}

#[test]
fn worker_with_three_of_four_overdue_is_recycled() {
    let mut h = setup(timed_config(4));
    start_ten(&mut h);
    let w = worker(1);
    assert_eq!(h.in_flight(&w), vec!["9", "8", "7", "6"]);

    h.clock.advance(Duration::from_millis(500));
    h.succeed(&w, "9");
    assert_eq!(h.in_flight(&w), vec!["8", "7", "6", "5"]);

    h.clock.advance(Duration::from_millis(700));
    h.orch.scan_hung().unwrap();

    assert_eq!(h.host.terminated(), vec![w.clone()]);
    assert_eq!(h.host.spawned(), vec![w, worker(2)]);
    let stats = h.orch.stats();
    assert_eq!(stats.processed, 5);
    assert_eq!(stats.errors, 4);
    assert_eq!(stats.failed, 4);
    assert_eq!(h.orch.recent_crashes(), 0);
}

#[test]
fn worker_with_one_of_four_overdue_is_kept() {
    let mut h = setup(timed_config(4));
    start_ten(&mut h);
    let w = worker(1);

    h.clock.advance(Duration::from_millis(600));
    h.succeed(&w, "9");
    h.succeed(&w, "8");
    h.succeed(&w, "7");
    assert_eq!(h.in_flight(&w), vec!["6", "5", "4", "3"]);

    h.clock.advance(Duration::from_millis(500));
    h.orch.scan_hung().unwrap();

    assert!(h.host.terminated().is_empty());
    assert_eq!(h.orch.stats().errors, 0);
}

#[test]
fn exactly_half_overdue_counts_as_hung() {
    let mut h = setup(timed_config(2));
    start_ten(&mut h);
    let w = worker(1);

    h.clock.advance(Duration::from_millis(600));
    h.succeed(&w, "9");
    h.clock.advance(Duration::from_millis(500));
    h.orch.scan_hung().unwrap();

    assert_eq!(h.host.terminated(), vec![w]);
}

#[test]
fn items_at_exactly_the_timeout_are_not_overdue() {
    let mut h = setup(timed_config(1));
    start_ten(&mut h);

    h.clock.advance(Duration::from_millis(1000));
    h.orch.scan_hung().unwrap();
    assert!(h.host.terminated().is_empty());

    h.clock.advance(Duration::from_millis(1));
    h.orch.scan_hung().unwrap();
    assert_eq!(h.host.terminated(), vec![worker(1)]);
}

#[test]
fn scan_without_timeout_is_a_no_op() {
    let mut h = setup(config(1, 1));
    start_ten(&mut h);

    h.clock.advance(Duration::from_secs(3600));
    h.orch.scan_hung().unwrap();

    assert!(h.host.terminated().is_empty());
}

#[test]
fn hung_items_are_retried_on_the_replacement() {
    let mut h = setup(timed_config(1));
    h.start(&["slow"]);

    h.clock.advance(Duration::from_secs(2));
    h.orch.scan_hung().unwrap();

    assert_eq!(h.dispatched_to(&worker(2)), vec!["slow"]);
    h.succeed(&worker(2), "slow");

    let stats = h.orch.stats();
    assert!(h.orch.is_finished());
    assert_eq!(stats.successful, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.errors, 1);
}

#[test]
fn hung_stopping_worker_is_not_replaced() {
    let mut h = setup(timed_config(1));
    h.start(&["a", "b"]);

    h.orch.stop(false);
    h.clock.advance(Duration::from_secs(2));
    h.orch.scan_hung().unwrap();

    assert_eq!(h.host.spawned(), vec![worker(1)]);
    assert!(h.orch.worker_ids().is_empty());
}
