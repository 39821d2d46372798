// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[yare::parameterized(
    string = { json!("alpha"),          "alpha" },
    number = { json!(42),               "42" },
    object = { json!({"id": 7}),        "{\"id\":7}" },
    array  = { json!([1, "two"]),       "[1,\"two\"]" },
    null   = { json!(null),             "null" },
)]
fn display_renders_log_form(value: serde_json::Value, expected: &str) {
    assert_eq!(WorkItem::new(value).to_string(), expected);
}

#[test]
fn identity_is_value_equality() {
    assert_eq!(WorkItem::new(json!({"id": 1})), WorkItem::new(json!({"id": 1})));
    assert_ne!(WorkItem::from("1"), WorkItem::new(json!(1)));
}

#[test]
fn serializes_transparently() {
    let item = WorkItem::new(json!({"url": "https://example.com"}));
    let text = serde_json::to_string(&item).unwrap();
    assert_eq!(text, "{\"url\":\"https://example.com\"}");
}

#[test]
fn detail_text_blank_for_null() {
    assert_eq!(detail_text(&json!(null)), "");
    assert_eq!(detail_text(&json!("ok")), "ok");
    assert_eq!(detail_text(&json!(3.5)), "3.5");
}
