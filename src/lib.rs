//! Headless render capture.
//!
//! Drives an external rendering engine in headless mode and extracts the single image it
//! writes to stdout. The engine interleaves free-form diagnostics and the image on one stream:
//!
//! ```text
//! <diagnostics text>BEGIN RAW IMAGE<payload>
//! ```
//!
//! # Pipeline overview
//!
//! 1. **Invoke**: [`InvocationMode`] + geometry -> engine arguments/stdin -> output buffer
//! 2. **Split**: output buffer -> diagnostics text + payload bytes (sentinel must occur once)
//! 3. **Decode**: payload -> image bytes (strict base64 for piped scenes, raw for the built-in scene)
//! 4. **Reconstruct**: image bytes + [`ImageDescriptor`] -> top-down RGB8 [`RasterRGB8`]
//!
//! Every stage fails hard. Nothing is retried, truncated or padded.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod capture;
mod engine;
mod foundation;
mod job;
mod persist;
mod protocol;

pub use capture::{Capture, CaptureRequest, capture, decode_output};
pub use engine::invoke::{
    CannedRunner, EngineCommand, EngineRunner, ProcessRunner, RecordedInvocation,
};
pub use foundation::core::{ChannelLayout, ImageDescriptor, Orientation, RasterRGB8};
pub use foundation::error::{CaptureError, CaptureResult};
pub use job::{CaptureJob, DEFAULT_EDGE, EngineSpec, JobMode};
pub use persist::{ensure_parent_dir, save_png};
pub use protocol::codec::{decode_payload, encode_payload};
pub use protocol::frame::{FramedOutput, SENTINEL, split_output};
pub use protocol::mode::{DEFAULT_ITERATIONS, InvocationMode, PayloadEncoding};
pub use protocol::raster::reconstruct;
