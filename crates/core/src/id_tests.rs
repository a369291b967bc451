// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::borrow::Borrow;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn define_id_display_and_as_str() {
    let id = TestId::new("hello");
    assert_eq!(id.as_str(), "hello");
    assert_eq!(id.to_string(), "hello");
}

#[test]
fn define_id_conversions() {
    let owned: TestId = String::from("owned").into();
    let borrowed: TestId = "borrowed".into();
    assert_eq!(owned, "owned");
    assert_eq!(borrowed, *"borrowed");
}

#[test]
fn define_id_hash_map_lookup_by_str() {
    let mut map = HashMap::new();
    map.insert(TestId::new("k"), 42);
    assert_eq!(map.get("k"), Some(&42));
    let id = TestId::new("key");
    let borrowed: &str = id.borrow();
    assert_eq!(borrowed, "key");
}

#[test]
fn define_id_serializes_as_plain_string() {
    let id = TestId::new("responses/a.json");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"responses/a.json\"");
    let back: TestId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[yare::parameterized(
    shorter_than_limit = { "abc",        8, "abc" },
    exact_limit        = { "abcdefgh",   8, "abcdefgh" },
    truncated          = { "abcdefghij", 4, "abcd" },
    multibyte          = { "问卷回答一",  2, "问卷" },
)]
fn short_cuts_on_char_boundary(input: &str, n: usize, expected: &str) {
    assert_eq!(input.short(n), expected);
    assert_eq!(TestId::new(input).short(n), expected);
}

#[test]
fn run_ids_are_unique() {
    assert_ne!(RunId::generate(), RunId::generate());
}
