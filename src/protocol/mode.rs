/// Default iteration budget handed to the engine in piped mode.
pub const DEFAULT_ITERATIONS: u32 = 1000;

/// Wire encoding of the payload that follows the sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadEncoding {
    /// Strict standard base64 (padded, standard alphabet).
    Base64,
    /// Image bytes verbatim.
    Raw,
}

/// How the engine receives its scene and what it writes back.
///
/// The same value selects both the argument list (see [`InvocationMode::engine_args`]) and the
/// decode path (see [`InvocationMode::payload_encoding`]) so the two cannot drift apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvocationMode {
    /// Scene source is piped on stdin; the image comes back base64 encoded.
    PipedSource {
        /// Scene description bytes, forwarded unmodified.
        scene: Vec<u8>,
        /// Iteration/quality budget.
        iterations: u32,
    },
    /// The engine renders its fixed built-in scene; the image comes back raw.
    BuiltinScene,
}

impl InvocationMode {
    /// Piped mode with the default iteration budget.
    pub fn piped(scene: impl Into<Vec<u8>>) -> Self {
        Self::PipedSource {
            scene: scene.into(),
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Short stable name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PipedSource { .. } => "piped_source",
            Self::BuiltinScene => "builtin_scene",
        }
    }

    /// Encoding the engine uses for the payload in this mode.
    pub fn payload_encoding(&self) -> PayloadEncoding {
        match self {
            Self::PipedSource { .. } => PayloadEncoding::Base64,
            Self::BuiltinScene => PayloadEncoding::Raw,
        }
    }

    /// Bytes to write on the child's stdin, if any.
    pub fn stdin_payload(&self) -> Option<&[u8]> {
        match self {
            Self::PipedSource { scene, .. } => Some(scene),
            Self::BuiltinScene => None,
        }
    }

    /// Engine arguments for an image of `width` x `height`.
    pub fn engine_args(&self, width: u32, height: u32) -> Vec<String> {
        match self {
            Self::PipedSource { iterations, .. } => vec![
                "--cin".to_string(),
                "--headless".to_string(),
                width.to_string(),
                height.to_string(),
                "--iterations".to_string(),
                iterations.to_string(),
            ],
            Self::BuiltinScene => vec![
                "--builtin-scene".to_string(),
                width.to_string(),
                height.to_string(),
            ],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/mode.rs"]
mod tests;
