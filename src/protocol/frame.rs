use crate::foundation::error::{CaptureError, CaptureResult};

/// Literal marking the boundary between diagnostics and image payload.
pub const SENTINEL: &[u8] = b"BEGIN RAW IMAGE";

/// Engine output split at the sentinel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramedOutput<'a> {
    /// Everything before the sentinel, decoded as lossy UTF-8.
    pub diagnostics: String,
    /// Everything after the sentinel, untouched.
    pub payload: &'a [u8],
}

/// Split `output` into diagnostics and payload around the single occurrence of `sentinel`.
///
/// The sentinel must occur exactly once. A second occurrence anywhere (including inside the
/// diagnostics) is a [`CaptureError::ProtocolViolation`], not a "take the first" split. The byte
/// split is exact; no whitespace is trimmed on either side of the boundary.
pub fn split_output<'a>(output: &'a [u8], sentinel: &[u8]) -> CaptureResult<FramedOutput<'a>> {
    if sentinel.is_empty() {
        return Err(CaptureError::validation("sentinel must not be empty"));
    }

    let positions = find_all(output, sentinel);
    if positions.len() != 1 {
        return Err(CaptureError::ProtocolViolation {
            occurrences: positions.len(),
            diagnostics: String::from_utf8_lossy(output).into_owned(),
        });
    }

    let start = positions[0];
    let payload_start = start + sentinel.len();
    tracing::debug!(
        sentinel_offset = start,
        payload_len = output.len() - payload_start,
        "split engine output"
    );

    Ok(FramedOutput {
        diagnostics: String::from_utf8_lossy(&output[..start]).into_owned(),
        payload: &output[payload_start..],
    })
}

/// Offsets of all non-overlapping occurrences of `needle` in `haystack`.
fn find_all(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    let mut out = Vec::new();
    if haystack.len() < needle.len() {
        return out;
    }
    let mut i = 0;
    let last = haystack.len() - needle.len();
    while i <= last {
        if &haystack[i..i + needle.len()] == needle {
            out.push(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/frame.rs"]
mod tests;
