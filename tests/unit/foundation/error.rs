use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CaptureError::invocation("x")
            .to_string()
            .contains("invocation failure:")
    );
    assert!(
        CaptureError::corrupt("x")
            .to_string()
            .contains("payload corrupt:")
    );
    assert!(
        CaptureError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CaptureError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn protocol_violation_message_distinguishes_missing_from_repeated() {
    let missing = CaptureError::ProtocolViolation {
        occurrences: 0,
        diagnostics: "shader compile failed".to_string(),
    };
    let msg = missing.to_string();
    assert!(msg.contains("not found"));
    assert!(msg.contains("shader compile failed"));

    let repeated = CaptureError::ProtocolViolation {
        occurrences: 2,
        diagnostics: String::new(),
    };
    assert!(repeated.to_string().contains("found 2 times"));
}

#[test]
fn protocol_violation_display_caps_long_output() {
    // Multi-byte characters straddle the cap.
    let diagnostics = "\u{fffd}".repeat(DIAGNOSTICS_DISPLAY_BYTES);
    let err = CaptureError::ProtocolViolation {
        occurrences: 2,
        diagnostics: diagnostics.clone(),
    };
    let msg = err.to_string();
    assert!(msg.len() < DIAGNOSTICS_DISPLAY_BYTES + 256, "{}", msg.len());
    let omitted = diagnostics.len() - (DIAGNOSTICS_DISPLAY_BYTES / 3) * 3;
    assert!(msg.contains(&format!("{omitted} more bytes of engine output omitted")));
    assert_eq!(err.diagnostics(), Some(diagnostics.as_str()));

    let short = CaptureError::ProtocolViolation {
        occurrences: 0,
        diagnostics: "x".repeat(DIAGNOSTICS_DISPLAY_BYTES),
    };
    assert!(!short.to_string().contains("omitted"));
}

#[test]
fn size_mismatch_reports_both_counts() {
    let err = CaptureError::PayloadSizeMismatch {
        expected: 12,
        actual: 9,
    };
    let msg = err.to_string();
    assert!(msg.contains("expected 12"));
    assert!(msg.contains("got 9"));
}

#[test]
fn diagnostics_only_on_protocol_violation() {
    let err = CaptureError::ProtocolViolation {
        occurrences: 0,
        diagnostics: "boot log".to_string(),
    };
    assert_eq!(err.diagnostics(), Some("boot log"));
    assert_eq!(CaptureError::corrupt("x").diagnostics(), None);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CaptureError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
