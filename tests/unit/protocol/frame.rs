use super::*;

fn violation_count(err: CaptureError) -> usize {
    match err {
        CaptureError::ProtocolViolation { occurrences, .. } => occurrences,
        other => panic!("expected protocol violation, got {other}"),
    }
}

#[test]
fn splits_exactly_at_sentinel() {
    let out = b"Setting up SDL2... Done!\nBEGIN RAW IMAGEAQID";
    let framed = split_output(out, SENTINEL).unwrap();
    assert_eq!(framed.diagnostics, "Setting up SDL2... Done!\n");
    assert_eq!(framed.payload, b"AQID");
}

#[test]
fn boundary_whitespace_is_preserved() {
    let out = b"log \nBEGIN RAW IMAGE\n\x00 ";
    let framed = split_output(out, SENTINEL).unwrap();
    assert_eq!(framed.diagnostics, "log \n");
    assert_eq!(framed.payload, b"\n\x00 ");
}

#[test]
fn empty_diagnostics_and_empty_payload() {
    let framed = split_output(SENTINEL, SENTINEL).unwrap();
    assert_eq!(framed.diagnostics, "");
    assert!(framed.payload.is_empty());
}

#[test]
fn missing_sentinel_is_violation_with_full_text() {
    let out = b"Failed to setup OpenGL.\n";
    let err = split_output(out, SENTINEL).unwrap_err();
    assert_eq!(err.diagnostics(), Some("Failed to setup OpenGL.\n"));
    assert_eq!(violation_count(err), 0);
}

#[test]
fn repeated_sentinel_is_violation_even_with_valid_payload() {
    let out = b"note: BEGIN RAW IMAGE mentioned\nBEGIN RAW IMAGEAQID";
    assert_eq!(violation_count(split_output(out, SENTINEL).unwrap_err()), 2);

    let out = b"BEGIN RAW IMAGEBEGIN RAW IMAGEBEGIN RAW IMAGE";
    assert_eq!(violation_count(split_output(out, SENTINEL).unwrap_err()), 3);
}

#[test]
fn sentinel_inside_raw_payload_is_violation() {
    let mut out = b"BEGIN RAW IMAGE".to_vec();
    out.extend_from_slice(&[0x7f; 8]);
    out.extend_from_slice(SENTINEL);
    assert_eq!(violation_count(split_output(&out, SENTINEL).unwrap_err()), 2);
}

#[test]
fn invalid_utf8_diagnostics_are_replaced_not_rejected() {
    let mut out = vec![b'o', b'k', 0xff, 0xfe, b'\n'];
    out.extend_from_slice(SENTINEL);
    out.extend_from_slice(b"AA==");
    let framed = split_output(&out, SENTINEL).unwrap();
    assert!(framed.diagnostics.starts_with("ok"));
    assert!(framed.diagnostics.contains('\u{FFFD}'));
    assert_eq!(framed.payload, b"AA==");
}

#[test]
fn truncated_sentinel_is_not_counted() {
    let out = b"diagnostics\nBEGIN RAW IMAG";
    assert_eq!(violation_count(split_output(out, SENTINEL).unwrap_err()), 0);
}

#[test]
fn empty_sentinel_is_rejected() {
    assert!(matches!(
        split_output(b"abc", b""),
        Err(CaptureError::Validation(_))
    ));
}

#[test]
fn find_all_is_non_overlapping() {
    assert_eq!(find_all(b"aaaa", b"aa"), vec![0, 2]);
    assert_eq!(find_all(b"aaa", b"aa"), vec![0]);
    assert!(find_all(b"a", b"aa").is_empty());
}
