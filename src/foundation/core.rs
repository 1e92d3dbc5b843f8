use crate::foundation::error::{CaptureError, CaptureResult};

/// Vertical row order of a pixel buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// First row in memory is the top of the image.
    TopDown,
    /// First row in memory is the bottom of the image (GL framebuffer readback order).
    #[default]
    BottomUp,
}

/// Per-pixel channel layout carried by the image payload.
///
/// Only 8-bit RGB is part of the protocol. Other channel counts are rejected when the descriptor
/// is built, never during reconstruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelLayout {
    /// Red, green, blue; one byte each.
    #[default]
    Rgb8,
}

impl ChannelLayout {
    /// Resolve a raw channel count into a supported layout.
    pub fn from_channel_count(channels: u32) -> CaptureResult<Self> {
        match channels {
            3 => Ok(Self::Rgb8),
            n => Err(CaptureError::validation(format!(
                "unsupported channel count {n} (only 3-channel RGB is supported)"
            ))),
        }
    }

    /// Bytes occupied by one pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
        }
    }
}

/// Caller-supplied geometry of the image payload.
///
/// Width and height are never derived from the payload itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageDescriptor {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channel layout of each pixel.
    pub layout: ChannelLayout,
    /// Bytes per source row; `0` means tightly packed.
    pub stride: usize,
    /// Source row order.
    pub orientation: Orientation,
}

impl ImageDescriptor {
    /// Tightly packed descriptor in the engine's native bottom-up order.
    pub fn new(width: u32, height: u32, layout: ChannelLayout) -> CaptureResult<Self> {
        let desc = Self {
            width,
            height,
            layout,
            stride: 0,
            orientation: Orientation::BottomUp,
        };
        desc.validate()?;
        Ok(desc)
    }

    /// Tightly packed RGB descriptor in the engine's native bottom-up order.
    pub fn rgb8(width: u32, height: u32) -> CaptureResult<Self> {
        Self::new(width, height, ChannelLayout::Rgb8)
    }

    /// Return a copy with an explicit row stride.
    pub fn with_stride(mut self, stride: usize) -> CaptureResult<Self> {
        self.stride = stride;
        self.validate()?;
        Ok(self)
    }

    /// Return a copy with a different source orientation.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Check geometry and stride.
    ///
    /// A validated descriptor guarantees that [`Self::payload_len`] and [`Self::raster_len`] fit
    /// in `usize`.
    pub fn validate(&self) -> CaptureResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::validation(
                "image width/height must be non-zero",
            ));
        }
        let overflow = || CaptureError::validation("image geometry overflows usize");
        let height = usize::try_from(self.height).map_err(|_| overflow())?;
        let packed = usize::try_from(self.width)
            .ok()
            .and_then(|w| w.checked_mul(self.bytes_per_pixel()))
            .ok_or_else(overflow)?;
        if self.stride != 0 && self.stride < packed {
            return Err(CaptureError::validation(format!(
                "row stride {} is smaller than a packed row ({packed} bytes)",
                self.stride
            )));
        }
        let row = if self.stride == 0 { packed } else { self.stride };
        row.checked_mul(height).ok_or_else(overflow)?;
        packed.checked_mul(height).ok_or_else(overflow)?;
        Ok(())
    }

    /// Bytes per pixel for the configured layout.
    pub fn bytes_per_pixel(&self) -> usize {
        self.layout.bytes_per_pixel()
    }

    /// Bytes of pixel data in one row, excluding padding.
    pub fn packed_row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    /// Bytes one source row occupies, including padding.
    pub fn row_bytes(&self) -> usize {
        if self.stride == 0 {
            self.packed_row_bytes()
        } else {
            self.stride
        }
    }

    /// Exact byte count the decoded payload must have.
    pub fn payload_len(&self) -> usize {
        self.row_bytes() * self.height as usize
    }

    /// Byte count of the reconstructed raster (`width * height * 3`).
    pub fn raster_len(&self) -> usize {
        self.packed_row_bytes() * self.height as usize
    }
}

/// Reconstructed image: RGB8, row-major, top-down, no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterRGB8 {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` bytes.
    pub data: Vec<u8>,
}

impl RasterRGB8 {
    /// Borrow one row of pixels (top row is `0`).
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let row_len = self.width as usize * 3;
        let start = y as usize * row_len;
        self.data.get(start..start + row_len)
    }

    /// Read the pixel at `(x, y)` in top-down coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width {
            return None;
        }
        let row = self.row(y)?;
        let i = x as usize * 3;
        Some([row[i], row[i + 1], row[i + 2]])
    }

    /// Convert into an [`image::RgbImage`] for encoding.
    pub fn to_rgb_image(&self) -> CaptureResult<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            CaptureError::validation(format!(
                "raster buffer of {} bytes does not fit {}x{} rgb8",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }

    /// Hex-encoded SHA-256 digest of the pixel bytes.
    pub fn sha256_hex(&self) -> String {
        use sha2::Digest as _;

        let digest = sha2::Sha256::digest(&self.data);
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            out.push_str(&format!("{b:02x}"));
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
