use std::borrow::Cow;

/// Convenience result type used by the public API.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Diagnostics bytes shown by `Display`; the full text stays in the error value.
pub(crate) const DIAGNOSTICS_DISPLAY_BYTES: usize = 4096;

/// Top-level error type for engine invocation and output decoding.
///
/// None of these are retryable: each one is either a caller configuration error or an
/// engine-side failure.
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    /// The engine could not be spawned, timed out, or exited non-zero.
    #[error("invocation failure: {0}")]
    InvocationFailure(String),

    /// The sentinel did not occur exactly once in the engine output.
    #[error(
        "protocol violation: {}\n{}",
        describe_occurrences(.occurrences),
        diagnostics_excerpt(.diagnostics)
    )]
    ProtocolViolation {
        /// Number of non-overlapping sentinel occurrences found.
        occurrences: usize,
        /// Entire output buffer decoded as lossy UTF-8.
        diagnostics: String,
    },

    /// The text-safe payload failed strict decoding.
    #[error("payload corrupt: {0}")]
    PayloadCorrupt(String),

    /// The decoded payload length does not match the image geometry.
    #[error("payload size mismatch: expected {expected} bytes, got {actual}")]
    PayloadSizeMismatch {
        /// Byte count implied by the image descriptor.
        expected: usize,
        /// Byte count actually decoded.
        actual: usize,
    },

    /// Caller configuration error (geometry, stride, channel layout, missing inputs).
    #[error("validation error: {0}")]
    Validation(String),

    /// Job configuration could not be parsed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptureError {
    /// Build a [`CaptureError::InvocationFailure`] value.
    pub fn invocation(msg: impl Into<String>) -> Self {
        Self::InvocationFailure(msg.into())
    }

    /// Build a [`CaptureError::PayloadCorrupt`] value.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::PayloadCorrupt(msg.into())
    }

    /// Build a [`CaptureError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaptureError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Engine diagnostics attached to this error, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::ProtocolViolation { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}

fn describe_occurrences(occurrences: &usize) -> String {
    if *occurrences == 0 {
        "image sentinel not found in engine output (engine likely failed before rendering)"
            .to_string()
    } else {
        format!("image sentinel found {occurrences} times, expected exactly once")
    }
}

fn diagnostics_excerpt(diagnostics: &str) -> Cow<'_, str> {
    if diagnostics.len() <= DIAGNOSTICS_DISPLAY_BYTES {
        return Cow::Borrowed(diagnostics);
    }
    let mut end = DIAGNOSTICS_DISPLAY_BYTES;
    while !diagnostics.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!(
        "{}\n... ({} more bytes of engine output omitted)",
        &diagnostics[..end],
        diagnostics.len() - end
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
