// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn items_are_dispatched_most_recent_first() {
    let mut h = setup(config(1, 1));
    h.start(&["A", "B", "C"]);
    let w = worker(1);

    assert_eq!(h.dispatched(), vec!["C"]);
    h.succeed(&w, "C");
    h.succeed(&w, "B");
    h.succeed(&w, "A");

    assert_eq!(h.dispatched_to(&w), vec!["C", "B", "A"]);
}

#[test]
fn worker_fills_up_to_parallel_limit() {
    let mut h = setup(config(1, 3));
    h.start(&["1", "2", "3", "4", "5"]);
    let w = worker(1);

    assert_eq!(h.in_flight(&w), vec!["5", "4", "3"]);
    assert_eq!(h.orch.pending_len(), 2);

    h.succeed(&w, "4");
    assert_eq!(h.in_flight(&w), vec!["5", "3", "2"]);
    assert_eq!(h.orch.in_flight_len(&w), 3);
}

#[test]
fn completions_may_arrive_out_of_dispatch_order() {
    let mut h = setup(config(1, 2));
    h.start(&["a", "b", "c"]);
    let w = worker(1);

    assert_eq!(h.in_flight(&w), vec!["c", "b"]);
    h.succeed(&w, "b");
    assert_eq!(h.in_flight(&w), vec!["c", "a"]);
    h.succeed(&w, "a");
    h.succeed(&w, "c");

    let stats = h.orch.stats();
    assert_eq!(stats.processed, 3);
    assert_eq!(stats.successful, 3);
    assert!(h.orch.is_finished());
}

#[test]
fn workers_share_one_queue() {
    let mut h = setup(config(2, 1));
    h.start(&["a", "b", "c", "d"]);

    assert_eq!(h.dispatched_to(&worker(1)), vec!["d"]);
    assert_eq!(h.dispatched_to(&worker(2)), vec!["c"]);

    h.succeed(&worker(2), "c");
    assert_eq!(h.dispatched_to(&worker(2)), vec!["c", "b"]);
}

#[test]
fn more_workers_than_items_removes_idle_workers() {
    let mut h = setup(config(3, 1));
    h.start(&["only"]);

    assert_eq!(h.host.spawned().len(), 3);
    assert_eq!(h.orch.worker_ids(), vec![worker(1)]);
    assert_eq!(h.host.terminated(), vec![worker(2), worker(3)]);

    h.succeed(&worker(1), "only");
    assert!(h.orch.is_finished());
    assert_eq!(h.completions(), 1);
}

#[test]
fn drained_worker_is_removed_and_run_completes() {
    let mut h = setup(config(1, 1));
    h.start(&["x"]);
    let w = worker(1);

    assert_eq!(h.orch.phase(), RunPhase::Draining);
    h.succeed(&w, "x");

    assert!(h.orch.worker_ids().is_empty());
    assert_eq!(h.host.terminated(), vec![w]);
    assert_eq!(h.orch.phase(), RunPhase::Completed);
    assert_eq!(h.completions(), 1);
}

#[test]
fn phase_moves_from_dispatching_to_draining_when_queue_empties() {
    let mut h = setup(config(1, 1));
    assert_eq!(h.orch.phase(), RunPhase::Idle);

    h.start(&["a", "b"]);
    assert_eq!(h.orch.phase(), RunPhase::Dispatching);

    h.succeed(&worker(1), "b");
    assert_eq!(h.orch.phase(), RunPhase::Draining);

    h.succeed(&worker(1), "a");
    assert_eq!(h.orch.phase(), RunPhase::Completed);
}

#[test]
fn without_retry_processed_equals_dispatched() {
    let mut cfg = config(2, 2);
    cfg.retry_on_fail = false;
    let mut h = setup(cfg);
    h.start(&["1", "2", "3", "4", "5", "6", "7"]);

    h.drive(&["2", "5"]);

    let stats = h.orch.stats();
    assert!(h.orch.is_finished());
    assert_eq!(stats.processed, h.orch.dispatched());
    assert_eq!(stats.processed, 7);
    assert_eq!(stats.successful, 5);
    assert_eq!(stats.failed, 2);
    assert_eq!(h.completions(), 1);
}

#[test]
fn item_handler_sees_each_completion() {
    let mut h = setup(config(1, 1));
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    h.orch.set_item_handler(Box::new(move |item, detail| {
        sink.lock().push((item.to_string(), detail.clone()));
    }));
    h.start(&["a", "b"]);

    h.succeed(&worker(1), "b");
    h.fail(&worker(1), "a");

    assert_eq!(
        *seen.lock(),
        vec![
            ("b".to_string(), json!("ok")),
            ("a".to_string(), json!(null)),
        ]
    );
}

#[test]
fn item_handler_can_be_replaced() {
    let mut h = setup(config(1, 1));
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let a = Arc::clone(&first);
    let b = Arc::clone(&second);
    h.orch
        .set_item_handler(Box::new(move |_, _| {
            a.fetch_add(1, Ordering::SeqCst);
        }));
    h.orch
        .set_item_handler(Box::new(move |_, _| {
            b.fetch_add(1, Ordering::SeqCst);
        }));
    h.start(&["x"]);
    h.succeed(&worker(1), "x");

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn json_items_are_dispatched_as_values() {
    let mut h = setup(config(1, 1));
    h.orch
        .set_work_list(vec![WorkItem::new(json!({"id": 1}))])
        .unwrap();
    h.orch.start().unwrap();

    assert_eq!(
        h.host.dispatched_to(&worker(1)),
        vec![WorkItem::new(json!({"id": 1}))]
    );
}
