//! Built-in fallback image.

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thumbra_error::{CodecError, CodecErrorKind, CodecResult};

/// Encode the default placeholder: a single transparent pixel as PNG.
///
/// # Errors
///
/// Returns [`CodecErrorKind::Encode`] if the PNG encoder fails.
pub fn encode_placeholder() -> CodecResult<Bytes> {
    let pixel = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(pixel)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| CodecError::new(CodecErrorKind::Encode(format!("placeholder: {}", e))))?;
    Ok(Bytes::from(out.into_inner()))
}
