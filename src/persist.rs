use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::RasterRGB8;
use crate::foundation::error::CaptureResult;

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> CaptureResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Write `raster` as an 8-bit RGB PNG.
pub fn save_png(raster: &RasterRGB8, path: &Path) -> CaptureResult<()> {
    ensure_parent_dir(path)?;
    raster
        .to_rgb_image()?
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote png");
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/persist.rs"]
mod tests;
