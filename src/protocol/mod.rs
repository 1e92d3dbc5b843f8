//! Output framing protocol: sentinel split, payload decoding and raster reconstruction.

/// Payload encodings (strict base64 and raw passthrough).
pub mod codec;
/// Sentinel-based output splitter.
pub mod frame;
/// Invocation modes and the encoding each one implies.
pub mod mode;
/// Stride/orientation-aware raster reconstruction.
pub mod raster;
