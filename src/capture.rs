use crate::engine::invoke::EngineRunner;
use crate::foundation::core::{ImageDescriptor, RasterRGB8};
use crate::foundation::error::CaptureResult;
use crate::protocol::codec::decode_payload;
use crate::protocol::frame::{SENTINEL, split_output};
use crate::protocol::mode::{InvocationMode, PayloadEncoding};
use crate::protocol::raster::reconstruct;

/// One headless render: what to run and how to read the image back.
#[derive(Clone, Debug)]
pub struct CaptureRequest {
    /// Invocation mode (argument shape, stdin payload, payload encoding).
    pub mode: InvocationMode,
    /// Geometry of the returned image.
    pub descriptor: ImageDescriptor,
}

/// Result of a successful capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    /// Engine diagnostics printed before the image, lossily decoded.
    pub diagnostics: String,
    /// Reconstructed top-down RGB8 image.
    pub raster: RasterRGB8,
}

/// Run the engine once and decode its output into a raster.
#[tracing::instrument(
    skip(runner, request),
    fields(
        mode = request.mode.name(),
        width = request.descriptor.width,
        height = request.descriptor.height
    )
)]
pub fn capture(runner: &mut dyn EngineRunner, request: &CaptureRequest) -> CaptureResult<Capture> {
    request.descriptor.validate()?;

    let output = runner.run(
        &request.mode,
        request.descriptor.width,
        request.descriptor.height,
    )?;
    decode_output(
        &output,
        request.mode.payload_encoding(),
        &request.descriptor,
    )
}

/// Decode a complete engine output buffer (diagnostics, sentinel, payload).
///
/// No raster is produced unless every stage succeeds.
pub fn decode_output(
    output: &[u8],
    encoding: PayloadEncoding,
    desc: &ImageDescriptor,
) -> CaptureResult<Capture> {
    desc.validate()?;

    let framed = split_output(output, SENTINEL)?;
    let bytes = decode_payload(framed.payload, encoding, desc)?;
    let raster = reconstruct(&bytes, desc)?;

    Ok(Capture {
        diagnostics: framed.diagnostics,
        raster,
    })
}
