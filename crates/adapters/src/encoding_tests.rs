// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use encoding_rs::{SHIFT_JIS, WINDOWS_1252};
use tempfile::tempdir;

const CHINESE: &str = "我在团队合作中总是主动承担责任，喜欢尝试新的方法。";
const TRADITIONAL: &str = "我喜歡與團隊合作，總是主動承擔責任。我也喜歡嘗試新的方法，並且認真完成每一項工作。";

fn utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

#[test]
fn utf8_is_read_as_is() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("record.txt");
    std::fs::write(&path, "I enjoy meeting new people. Ça va.").unwrap();

    let text = EncodingGateway::default().read_text(&path).unwrap();
    assert_eq!(text, "I enjoy meeting new people. Ça va.");
}

#[test]
fn gb18030_round_trips_through_fallback() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("record.txt");
    let (bytes, _, had_errors) = GB18030.encode(CHINESE);
    assert!(!had_errors);
    std::fs::write(&path, &bytes).unwrap();

    let gateway = EncodingGateway::default();
    let decoded = gateway.decode(&bytes).unwrap();
    assert_eq!(decoded.encoding, GB18030);
    assert_eq!(gateway.read_text(&path).unwrap(), CHINESE);
}

#[test]
fn big5_round_trips_through_fallback() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("record.txt");
    let (bytes, _, had_errors) = BIG5.encode(TRADITIONAL);
    assert!(!had_errors);
    // Also a clean GB18030 decode, so order alone would pick the wrong one
    assert!(strict_decode(GB18030, &bytes).is_some());
    std::fs::write(&path, &bytes).unwrap();

    let gateway = EncodingGateway::default();
    let decoded = gateway.decode(&bytes).unwrap();
    assert_eq!(decoded.encoding, BIG5);
    assert_eq!(gateway.read_text(&path).unwrap(), TRADITIONAL);
}

#[test]
fn ranking_ignores_fallback_order() {
    let (bytes, _, _) = BIG5.encode(TRADITIONAL);
    let gateway = EncodingGateway::new(UTF_8, vec![GB18030, BIG5]).without_detection();
    assert_eq!(gateway.decode(&bytes).unwrap().text, TRADITIONAL);

    let (bytes, _, _) = GB18030.encode(CHINESE);
    let gateway = EncodingGateway::new(UTF_8, vec![BIG5, GB18030]).without_detection();
    assert_eq!(gateway.decode(&bytes).unwrap().text, CHINESE);
}

#[test]
fn single_fallback_is_taken_as_configured() {
    let (bytes, _, _) = BIG5.encode(TRADITIONAL);
    let gateway = EncodingGateway::new(UTF_8, vec![BIG5]).without_detection();
    let decoded = gateway.decode(&bytes).unwrap();
    assert_eq!(decoded.encoding, BIG5);
    assert_eq!(decoded.text, TRADITIONAL);
}

#[test]
fn bom_selects_utf16() {
    let bytes = utf16le_with_bom("Openness: curious and imaginative");
    let decoded = EncodingGateway::default().decode(&bytes).unwrap();
    assert_eq!(decoded.text, "Openness: curious and imaginative");
    assert_eq!(decoded.encoding.name(), "UTF-16LE");
}

#[test]
fn utf8_bom_is_stripped() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("hello".as_bytes());
    let decoded = EncodingGateway::default().decode(&bytes).unwrap();
    assert_eq!(decoded.text, "hello");
}

#[test]
fn detector_recovers_latin_text() {
    // Only é is used so every Latin single-byte guess decodes it the same way
    let text = "Le comité a étudié la qualité des réponses données par les agents évalués. \
                Chaque réponse a été notée et la fidélité du résultat a été vérifiée. \
                La société a publié une étude détaillée sur la sécurité et la clarté.";
    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    assert!(!had_errors);

    let decoded = EncodingGateway::default().decode(&bytes).unwrap();
    assert_eq!(decoded.text, text);
}

#[test]
fn detector_recovers_shift_jis_without_fallbacks() {
    let text = "これは日本語のテキストです。私は新しい人に会うのが好きで、いつも計画を立ててから行動します。";
    let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
    assert!(!had_errors);

    let gateway = EncodingGateway::new(UTF_8, vec![]);
    let decoded = gateway.decode(&bytes).unwrap();
    assert_eq!(decoded.encoding, SHIFT_JIS);
    assert_eq!(decoded.text, text);
}

#[test]
fn undecodable_bytes_are_an_encoding_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garbage.bin");
    std::fs::write(&path, [0xC3, 0x28, 0xFF, 0xFE, 0x80]).unwrap();

    let gateway = EncodingGateway::new(UTF_8, vec![]).without_detection();
    let err = gateway.read_text(&path).unwrap_err();
    match err {
        EncodingError::Undecodable { path: p, tried } => {
            assert_eq!(p, path);
            assert_eq!(tried, "UTF-8");
        }
        other => panic!("expected Undecodable, got {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = EncodingGateway::default()
        .read_text(&dir.path().join("absent.txt"))
        .unwrap_err();
    assert!(matches!(err, EncodingError::Io { .. }));
}

#[test]
fn write_text_is_utf8_and_creates_parents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/out/aggregate.json");
    let gateway = EncodingGateway::default();

    gateway.write_text(&path, CHINESE).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), CHINESE.as_bytes());
    assert!(!dir.path().join("nested/out/aggregate.json.tmp").exists());

    gateway.write_text(&path, "replaced").unwrap();
    assert_eq!(gateway.read_text(&path).unwrap(), "replaced");
}

#[test]
fn targets_differing_by_extension_do_not_share_a_tmp_file() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("aggregate.json");
    let txt = dir.path().join("aggregate.txt");
    std::fs::write(dir.path().join("aggregate.tmp"), "unrelated").unwrap();
    let gateway = EncodingGateway::default();

    gateway.write_text(&json, "{}").unwrap();
    gateway.write_text(&txt, "plain").unwrap();

    assert_eq!(std::fs::read_to_string(&json).unwrap(), "{}");
    assert_eq!(std::fs::read_to_string(&txt).unwrap(), "plain");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("aggregate.tmp")).unwrap(),
        "unrelated"
    );
}

#[test]
fn labels_resolve_to_encodings() {
    let gateway = EncodingGateway::from_labels("utf-8", &["gbk".into(), "big5".into()]).unwrap();
    assert_eq!(gateway.fallbacks.len(), 2);
    assert_eq!(gateway.fallbacks[1], BIG5);

    let err = EncodingGateway::from_labels("utf-8", &["klingon".into()]).unwrap_err();
    assert_eq!(err, "klingon");
}
