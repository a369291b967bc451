// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn key() -> ItemKey {
    ItemKey::new("agent-7")
}

#[test]
fn full_verdict() {
    let raw = r#"{
        "scores": {"openness": 4, "neuroticism": null},
        "evidence": "Describes trying new tools weekly",
        "confidence": "high",
        "reverse_scored": true
    }"#;
    let record = parse_verdict(&key(), raw).unwrap();
    assert_eq!(record.key, "agent-7");
    assert_eq!(record.scores["openness"], Some(4.0));
    assert_eq!(record.scores["neuroticism"], None);
    assert_eq!(record.evidence, "Describes trying new tools weekly");
    assert_eq!(record.confidence, Confidence::High);
    assert!(record.reverse_scored);
}

#[test]
fn optional_fields_default() {
    let record = parse_verdict(&key(), r#"{"scores": {"Openness ": 3.5}}"#).unwrap();
    assert_eq!(record.scores["openness"], Some(3.5));
    assert_eq!(record.evidence, "");
    assert_eq!(record.confidence, Confidence::Medium);
    assert!(!record.reverse_scored);
}

#[parameterized(
    fenced = { "```json\n{\"scores\": {\"openness\": 2}}\n```" },
    prose = { "Here is my assessment: {\"scores\": {\"openness\": 2}} Hope this helps." },
    nested = { "{\"scores\": {\"openness\": 2}, \"extra\": {\"note\": \"}\"}}" },
)]
fn wrapped_json_is_extracted(raw: &str) {
    let record = parse_verdict(&key(), raw).unwrap();
    assert_eq!(record.scores["openness"], Some(2.0));
}

#[parameterized(
    no_object = { "I cannot score this." },
    reversed_braces = { "} nothing {" },
    not_json = { "{scores: openness=4}" },
    missing_scores = { "{\"evidence\": \"x\"}" },
    empty_scores = { "{\"scores\": {}}" },
    bad_confidence = { "{\"scores\": {\"openness\": 4}, \"confidence\": \"certain\"}" },
    string_score = { "{\"scores\": {\"openness\": \"four\"}}" },
)]
fn malformed_output(raw: &str) {
    let err = parse_verdict(&key(), raw).unwrap_err();
    assert!(matches!(err, JudgeError::MalformedOutput(_)), "got {err:?}");
}

#[test]
fn extract_returns_outermost_object() {
    assert_eq!(
        extract_json_object("a {\"x\": {\"y\": 1}} b"),
        Some("{\"x\": {\"y\": 1}}")
    );
    assert_eq!(extract_json_object("no braces"), None);
}
