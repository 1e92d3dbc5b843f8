use crate::foundation::core::{ImageDescriptor, Orientation, RasterRGB8};
use crate::foundation::error::{CaptureError, CaptureResult};

/// Rebuild a top-down, tightly packed RGB8 raster from decoded payload bytes.
///
/// Each source row occupies `desc.row_bytes()` bytes; padding past `width * 3` is dropped.
/// Bottom-up sources are flipped so the result is always top-down.
pub fn reconstruct(bytes: &[u8], desc: &ImageDescriptor) -> CaptureResult<RasterRGB8> {
    desc.validate()?;

    let expected = desc.payload_len();
    if bytes.len() != expected {
        return Err(CaptureError::PayloadSizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    let row_bytes = desc.row_bytes();
    let packed = desc.packed_row_bytes();
    let mut data = Vec::with_capacity(desc.raster_len());

    let rows = bytes.chunks_exact(row_bytes).map(|row| &row[..packed]);
    match desc.orientation {
        Orientation::TopDown => rows.for_each(|row| data.extend_from_slice(row)),
        Orientation::BottomUp => rows.rev().for_each(|row| data.extend_from_slice(row)),
    }

    Ok(RasterRGB8 {
        width: desc.width,
        height: desc.height,
        data,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/raster.rs"]
mod tests;
