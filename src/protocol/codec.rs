use std::borrow::Cow;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::foundation::core::ImageDescriptor;
use crate::foundation::error::{CaptureError, CaptureResult};
use crate::protocol::mode::PayloadEncoding;

/// Decode a payload segment into exactly `desc.payload_len()` image bytes.
///
/// Base64 decoding is strict: padding, alphabet, trailing bits and embedded whitespace are all
/// rejected as [`CaptureError::PayloadCorrupt`]. A length mismatch after decoding is
/// [`CaptureError::PayloadSizeMismatch`]; nothing is truncated or padded.
pub fn decode_payload<'a>(
    payload: &'a [u8],
    encoding: PayloadEncoding,
    desc: &ImageDescriptor,
) -> CaptureResult<Cow<'a, [u8]>> {
    desc.validate()?;

    let bytes: Cow<'a, [u8]> = match encoding {
        PayloadEncoding::Base64 => Cow::Owned(
            STANDARD
                .decode(payload)
                .map_err(|e| CaptureError::corrupt(format!("invalid base64 image data: {e}")))?,
        ),
        PayloadEncoding::Raw => Cow::Borrowed(payload),
    };

    let expected = desc.payload_len();
    if bytes.len() != expected {
        return Err(CaptureError::PayloadSizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    tracing::debug!(?encoding, decoded_len = bytes.len(), "decoded image payload");
    Ok(bytes)
}

/// Encode image bytes the way the engine writes them after the sentinel.
pub fn encode_payload(image: &[u8], encoding: PayloadEncoding) -> Vec<u8> {
    match encoding {
        PayloadEncoding::Base64 => STANDARD.encode(image).into_bytes(),
        PayloadEncoding::Raw => image.to_vec(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/codec.rs"]
mod tests;
