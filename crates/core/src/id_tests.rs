// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::borrow::Borrow;
use std::collections::HashMap;

#[test]
fn worker_id_display_and_eq() {
    let id = WorkerId::new("worker-3");
    assert_eq!(id.to_string(), "worker-3");
    assert_eq!(id, "worker-3");
    assert_eq!(id.as_str(), "worker-3");
}

#[test]
fn worker_id_borrows_as_str_for_map_lookup() {
    let mut map = HashMap::new();
    map.insert(WorkerId::new("w"), 7);
    assert_eq!(map.get("w"), Some(&7));
    let id = WorkerId::new("k");
    let borrowed: &str = id.borrow();
    assert_eq!(borrowed, "k");
}

#[test]
fn worker_id_serializes_as_plain_string() {
    let json = serde_json::to_string(&WorkerId::new("worker-1")).unwrap();
    assert_eq!(json, "\"worker-1\"");
    let back: WorkerId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, "worker-1");
}

#[test]
fn uuid_gen_creates_unique_ids() {
    let id_gen = UuidIdGen;
    let id1 = id_gen.next();
    let id2 = id_gen.next();
    assert_ne!(id1, id2);
    assert_eq!(id1.len(), 36);
}

#[test]
fn sequential_gen_defaults_to_worker_prefix() {
    let id_gen = SequentialIdGen::default();
    assert_eq!(id_gen.next(), "worker-1");
    assert_eq!(id_gen.next(), "worker-2");
}

#[test]
fn sequential_gen_clones_share_counter() {
    let id_gen1 = SequentialIdGen::new("w");
    let id_gen2 = id_gen1.clone();
    assert_eq!(id_gen1.next(), "w-1");
    assert_eq!(id_gen2.next(), "w-2");
    assert_eq!(id_gen1.next(), "w-3");
}
