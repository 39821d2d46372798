// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    not_json = { b"not json" as &[u8] },
    unknown_type = { br#"{"type":"cancel","item":"a"}"# as &[u8] },
    missing_type = { br#"{"item":"a"}"# as &[u8] },
    wrong_direction = { br#"{"type":"dispatch","item":"a"}"# as &[u8] },
)]
fn bad_frames_are_discarded(frame: &[u8]) {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b"]);
    let w = worker(1);

    h.orch.handle_frame(&w, frame);

    assert_eq!(h.orch.stats().processed, 0);
    assert_eq!(h.in_flight(&w), vec!["b"]);
    assert!(h.orch.phase().is_active());
}

#[test]
fn run_continues_after_protocol_violation() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b"]);
    let w = worker(1);

    h.orch.handle_frame(&w, b"{garbage");
    h.drive(&[]);

    assert!(h.orch.is_finished());
    assert_eq!(h.orch.stats().successful, 2);
}

#[test]
fn completion_for_item_not_in_flight_is_ignored() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b"]);
    let w = worker(1);

    h.complete(&w, "a");
    h.complete(&w, "zzz");

    let handle = &h.orch.workers[&w];
    assert_eq!(handle.sent, 1);
    assert_eq!(handle.received, 0);
    assert_eq!(h.orch.stats().processed, 0);
}

#[test]
fn annotation_for_another_workers_item_is_ignored() {
    let mut h = setup(config(2, 1));
    h.start(&["a", "b"]);
    let (w1, w2) = (worker(1), worker(2));
    assert_eq!(h.in_flight(&w2), vec!["a"]);

    h.send(&w1, Message::success(WorkItem::from("a"), "ok"));

    assert_eq!(h.orch.stats().successful, 0);
}

#[test]
fn second_annotation_for_an_item_is_ignored() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b"]);
    let w = worker(1);

    h.send(&w, Message::failure(WorkItem::from("b"), "bad"));
    h.send(&w, Message::error(WorkItem::from("b"), "boom"));
    h.complete(&w, "b");

    let stats = h.orch.stats();
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.errors, 0);
    assert_eq!(h.orch.failed_items(), &[WorkItem::from("b")]);
}

#[test]
fn messages_from_unknown_workers_are_ignored() {
    let mut h = setup(config(1, 1));
    h.start(&["a"]);

    h.succeed(&WorkerId::new("ghost"), "a");

    assert_eq!(h.orch.stats().processed, 0);
    assert_eq!(h.in_flight(&worker(1)), vec!["a"]);
}

#[test]
fn received_never_exceeds_sent() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b"]);
    let w = worker(1);

    h.succeed(&w, "b");
    h.complete(&w, "b");

    let handle = &h.orch.workers[&w];
    assert_eq!(handle.sent, 2);
    assert_eq!(handle.received, 1);
    assert!(handle.received <= handle.sent);
}

#[test]
fn host_calls_carry_only_dispatch_messages() {
    let mut h = setup(config(1, 1));
    h.start(&["a", "b"]);
    h.drive(&[]);

    for call in h.host.calls() {
        if let HostCall::Send { message, .. } = call {
            assert!(matches!(message, Message::Dispatch { .. }));
        }
    }
}
