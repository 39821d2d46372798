// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn dispatch(item: &str) -> Vec<u8> {
    wire::encode(&Message::dispatch(WorkItem::from(item))).unwrap()
}

#[test]
fn fake_host_records_calls() {
    let mut host = FakeHost::new();
    let w1 = WorkerId::new("worker-1");
    let w2 = WorkerId::new("worker-2");

    host.spawn(&w1).unwrap();
    host.spawn(&w2).unwrap();
    host.send(&w1, dispatch("a")).unwrap();
    host.send(&w2, dispatch("b")).unwrap();
    host.terminate(&w1);

    assert_eq!(host.spawned(), vec![w1.clone(), w2.clone()]);
    assert_eq!(host.terminated(), vec![w1.clone()]);
    assert_eq!(host.live_workers(), vec![w2.clone()]);
    assert_eq!(host.dispatched_to(&w1), vec![WorkItem::from("a")]);
    assert_eq!(host.calls().len(), 5);
}

#[test]
fn fake_host_rejects_send_to_dead_worker() {
    let mut host = FakeHost::new();
    let w = WorkerId::new("worker-1");
    host.spawn(&w).unwrap();
    host.terminate(&w);
    assert!(matches!(
        host.send(&w, dispatch("a")),
        Err(HostError::NotFound(_))
    ));
}

#[test]
fn fake_host_can_fail_spawns() {
    let mut host = FakeHost::new();
    host.set_fail_spawn(true);
    assert!(host.spawn(&WorkerId::new("worker-1")).is_err());
    assert!(host.live_workers().is_empty());
}

#[test]
fn clones_share_recorded_state() {
    let host = FakeHost::new();
    let mut handle = host.clone();
    handle.spawn(&WorkerId::new("worker-1")).unwrap();
    assert_eq!(host.live_workers().len(), 1);
}
