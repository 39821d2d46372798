// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn start_without_work_list_fails() {
    let mut h = setup(config(1, 1));
    assert!(matches!(
        h.orch.start(),
        Err(PoolError::PreconditionFailed(_))
    ));
    assert!(h.host.calls().is_empty());
}

#[test]
fn empty_work_list_is_rejected() {
    let mut h = setup(config(1, 1));
    assert!(matches!(
        h.orch.set_work_list(vec![]),
        Err(PoolError::InvalidInput(_))
    ));
}

#[test]
fn start_spawns_configured_workers_and_records_totals() {
    let mut h = setup(config(3, 1));
    h.start(&["a", "b", "c", "d", "e"]);

    assert_eq!(h.host.spawned(), vec![worker(1), worker(2), worker(3)]);
    let stats = h.orch.stats();
    assert_eq!(stats.total_tasks, 5);
    assert_eq!(stats.started_at_ms, Some(h.clock.epoch_ms()));
}

#[test]
fn start_is_idempotent_while_dispatching() {
    let mut h = setup(config(2, 1));
    h.start(&["a", "b", "c"]);
    h.orch.start().unwrap();

    assert_eq!(h.host.spawned().len(), 2);
    assert_eq!(h.dispatched().len(), 2);
}

#[test]
fn start_with_sets_list_and_handler() {
    let mut h = setup(config(1, 1));
    let count = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&count);
    h.orch
        .start_with(
            Some(items(&["a"])),
            Some(Box::new(move |_, _| {
                sink.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .unwrap();

    h.succeed(&worker(1), "a");
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(h.orch.is_finished());
}

#[test]
fn remove_worker_twice_returns_true_then_false() {
    let mut h = setup(config(2, 1));
    h.start(&["a", "b", "c"]);
    let w = worker(1);

    assert!(h.orch.remove_worker(Some(&w), false));
    assert!(!h.orch.remove_worker(Some(&w), false));
}

#[test]
fn immediate_remove_twice_returns_true_then_false() {
    let mut h = setup(config(2, 1));
    h.start(&["a", "b", "c"]);
    let w = worker(2);

    assert!(h.orch.remove_worker(Some(&w), true));
    assert!(!h.orch.remove_worker(Some(&w), true));
    assert_eq!(h.host.terminated(), vec![w]);
}

#[test]
fn remove_unknown_worker_returns_false() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b"]);
    assert!(!h.orch.remove_worker(Some(&WorkerId::new("nope")), true));
}

#[test]
fn remove_without_id_takes_most_recently_added() {
    let mut h = setup(config(3, 1));
    h.start(&["a", "b", "c", "d", "e"]);

    assert!(h.orch.remove_worker(None, true));
    assert_eq!(h.host.terminated(), vec![worker(3)]);
    assert_eq!(h.orch.worker_ids(), vec![worker(1), worker(2)]);

    let added = h.orch.add_worker().unwrap();
    assert_eq!(added, worker(4));
    assert!(h.orch.remove_worker(None, true));
    assert_eq!(h.host.terminated(), vec![worker(3), worker(4)]);
}

#[test]
fn graceful_remove_finishes_in_flight_items_first() {
    let mut h = setup(config(2, 1));
    h.start(&["a", "b", "c"]);
    let w = worker(1);

    assert!(h.orch.remove_worker(Some(&w), false));
    assert!(h.host.terminated().is_empty());

    h.succeed(&w, "c");
    assert_eq!(h.host.terminated(), vec![w.clone()]);
    assert_eq!(h.dispatched_to(&w), vec!["c"]);
    assert_eq!(h.orch.stats().successful, 1);
}

#[test]
fn added_worker_takes_queued_items() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b", "c"]);

    let added = h.orch.add_worker().unwrap();
    assert_eq!(h.dispatched_to(&added), vec!["b"]);
}

#[test]
fn graceful_stop_pauses_dispatch_until_resumed() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b", "c"]);
    let w = worker(1);

    h.orch.stop(false);
    assert_eq!(h.orch.phase(), RunPhase::Idle);
    h.succeed(&w, "c");

    // In-flight work finished, nothing new went out, and the run is paused
    // rather than complete.
    assert_eq!(h.dispatched(), vec!["c"]);
    assert!(h.orch.worker_ids().is_empty());
    assert_eq!(h.orch.phase(), RunPhase::Idle);
    assert_eq!(h.completions(), 0);

    h.orch.start().unwrap();
    assert_eq!(h.orch.phase(), RunPhase::Dispatching);
    h.drive(&[]);

    let stats = h.orch.stats();
    assert!(h.orch.is_finished());
    assert_eq!(stats.processed, 3);
    assert_eq!(stats.total_tasks, 3);
    assert_eq!(h.completions(), 1);
}

#[test]
fn resume_reuses_workers_still_finishing() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b", "c"]);

    h.orch.stop(false);
    h.orch.start().unwrap();

    assert_eq!(h.host.spawned(), vec![worker(1)]);
    h.succeed(&worker(1), "c");
    assert_eq!(h.dispatched_to(&worker(1)), vec!["c", "b"]);
}

#[test]
fn immediate_stop_abandons_in_flight_items() {
    let mut h = setup(config(2, 1));
    h.start(&["a", "b", "c"]);

    h.orch.stop(true);
    assert_eq!(h.host.terminated(), vec![worker(1), worker(2)]);

    // Late messages from terminated workers are ignored.
    h.succeed(&worker(1), "c");
    h.orch.handle_exit(&worker(1), None).unwrap();

    let stats = h.orch.stats();
    assert_eq!(stats.processed, 0);
    assert_eq!(stats.successful, 0);
    assert_eq!(h.orch.phase(), RunPhase::Idle);
    assert_eq!(h.completions(), 0);
}

#[test]
fn start_after_completion_requires_new_work_list() {
    let mut h = setup(config(1, 1));
    h.start(&["a"]);
    h.drive(&[]);
    assert!(h.orch.is_finished());

    assert!(matches!(
        h.orch.start(),
        Err(PoolError::PreconditionFailed(_))
    ));

    h.start(&["x", "y"]);
    assert_eq!(h.orch.phase(), RunPhase::Dispatching);
    let stats = h.orch.stats();
    assert_eq!(stats.processed, 0);
    assert_eq!(stats.total_tasks, 2);

    h.drive(&[]);
    assert_eq!(h.completions(), 2);
}

#[test]
fn replacing_work_list_mid_run_adjusts_total() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b", "c"]);

    h.orch.set_work_list(items(&["x", "y"])).unwrap();
    assert_eq!(h.orch.stats().total_tasks, 3);
    assert_eq!(h.orch.pending_len(), 2);

    h.drive(&[]);
    assert_eq!(h.dispatched(), vec!["c", "y", "x"]);
    assert!(h.orch.is_finished());
}

#[test]
fn phase_display() {
    assert_eq!(RunPhase::Retrying.to_string(), "retrying");
    assert!(RunPhase::Draining.is_active());
    assert!(!RunPhase::Completed.is_active());
}
