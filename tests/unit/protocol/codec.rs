use super::*;

fn desc(width: u32, height: u32) -> ImageDescriptor {
    ImageDescriptor::rgb8(width, height).unwrap()
}

#[test]
fn base64_decodes_to_exact_image_bytes() {
    // 2x1 rgb8: 01 02 03 04 05 06
    let out = decode_payload(b"AQIDBAUG", PayloadEncoding::Base64, &desc(2, 1)).unwrap();
    assert_eq!(&*out, &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn base64_rejects_bad_alphabet_and_padding() {
    let d = desc(1, 1);
    let cases: [&[u8]; 6] = [
        b"AQI*",     // alphabet
        b"AQ",       // missing padding
        b"AQ=",      // short padding
        b"AQI=AQI=", // padding mid-stream
        b"AQID\n",   // trailing newline
        b"AQJ=",     // non-zero trailing bits
    ];
    for case in cases {
        let err = decode_payload(case, PayloadEncoding::Base64, &d).unwrap_err();
        assert!(
            matches!(err, CaptureError::PayloadCorrupt(_)),
            "{:?} should be corrupt, got {err}",
            String::from_utf8_lossy(case)
        );
    }
}

#[test]
fn base64_short_payload_is_size_mismatch() {
    let encoded = encode_payload(&[0u8; 900 * 900 * 3 - 3], PayloadEncoding::Base64);
    let err = decode_payload(&encoded, PayloadEncoding::Base64, &desc(900, 900)).unwrap_err();
    assert!(matches!(
        err,
        CaptureError::PayloadSizeMismatch {
            expected: 2_430_000,
            actual: 2_429_997,
        }
    ));
}

#[test]
fn raw_is_passthrough_without_copy() {
    let payload = [0x7fu8; 12];
    let out = decode_payload(&payload, PayloadEncoding::Raw, &desc(2, 2)).unwrap();
    assert!(matches!(out, Cow::Borrowed(_)));
    assert_eq!(&*out, &payload[..]);
}

#[test]
fn raw_length_must_match_geometry() {
    let d = desc(2, 2);
    for len in [0usize, 11, 13, 24] {
        let payload = vec![0u8; len];
        let err = decode_payload(&payload, PayloadEncoding::Raw, &d).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::PayloadSizeMismatch { expected: 12, actual } if actual == len
        ));
    }
}

#[test]
fn strided_payload_length_includes_padding() {
    let d = desc(1, 2).with_stride(4).unwrap();
    assert!(decode_payload(&[0u8; 8], PayloadEncoding::Raw, &d).is_ok());
    assert!(decode_payload(&[0u8; 6], PayloadEncoding::Raw, &d).is_err());
}

#[test]
fn encode_then_decode_recovers_bytes() {
    let image: Vec<u8> = (0..=255u8).cycle().take(4 * 3 * 3).collect();
    let d = desc(4, 3);
    for encoding in [PayloadEncoding::Base64, PayloadEncoding::Raw] {
        let wire = encode_payload(&image, encoding);
        assert_eq!(&*decode_payload(&wire, encoding, &d).unwrap(), &image[..]);
    }
}
