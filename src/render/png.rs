//! PNG encoding for exported bitmaps.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::error::{ExportError, Result};

/// Encode a bitmap as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|e| ExportError::Build {
            message: format!("Failed to encode PNG: {}", e),
            help: None,
        })?;
    Ok(bytes.into_inner())
}
