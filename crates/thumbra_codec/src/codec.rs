//! Codec trait and the width arithmetic shared by implementations.

use crate::{RasterImage, Scratch};
use thumbra_core::RasterFormat;
use thumbra_error::{CodecError, CodecErrorKind, CodecResult};

/// Decode, resize, and encode raster images.
///
/// All methods are synchronous and CPU-bound. Async callers should run them
/// on a blocking thread.
pub trait Codec: Send + Sync {
    /// Decode `bytes` as `format`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecErrorKind::Decode`] if the bytes are not a valid image.
    fn decode(&self, bytes: &[u8], format: RasterFormat) -> CodecResult<RasterImage>;

    /// Scale `image` to `width` pixels wide, preserving aspect ratio.
    ///
    /// # Errors
    ///
    /// Returns [`CodecErrorKind::WidthTooLarge`] if `width` exceeds the image's
    /// own width and [`CodecErrorKind::InvalidWidth`] for a zero width.
    fn resize(&self, image: &RasterImage, width: u32) -> CodecResult<RasterImage>;

    /// Encode `image` as `format` into a scratch buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CodecErrorKind::Encode`] if encoding fails and
    /// [`CodecErrorKind::Scratch`] if the buffer cannot be written.
    fn encode(&self, image: &RasterImage, format: RasterFormat) -> CodecResult<Scratch>;

    /// Produce a thumbnail of `source` at `width`, in the source's own format.
    ///
    /// The width is parsed and checked against the decoded original before any
    /// resampling happens.
    #[tracing::instrument(skip(self, source), fields(source_size = source.len()))]
    fn thumbnail(&self, source: &[u8], format: RasterFormat, width: &str) -> CodecResult<Scratch> {
        let width = parse_width(width)?;
        let original = self.decode(source, format)?;
        let resized = self.resize(&original, width)?;
        let scratch = self.encode(&resized, format)?;
        tracing::debug!(
            original_width = original.width(),
            width = resized.width(),
            height = resized.height(),
            "Rendered thumbnail"
        );
        Ok(scratch)
    }
}

/// Parse a requested width as a positive integer.
///
/// # Examples
///
/// ```
/// use thumbra_codec::parse_width;
///
/// assert_eq!(parse_width("200").unwrap(), 200);
/// assert!(parse_width("0").is_err());
/// assert!(parse_width("abc").is_err());
/// ```
pub fn parse_width(width: &str) -> CodecResult<u32> {
    match width.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(CodecError::new(CodecErrorKind::InvalidWidth(
            width.to_string(),
        ))),
    }
}

/// Height that keeps `original_width x original_height` proportional at `width`.
///
/// Rounds to the nearest pixel and never returns zero.
pub fn scaled_height(original_width: u32, original_height: u32, width: u32) -> u32 {
    if original_width == 0 {
        return 1;
    }
    let numerator = u64::from(original_height) * u64::from(width);
    let denominator = u64::from(original_width);
    let height = (numerator + denominator / 2) / denominator;
    u32::try_from(height).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_must_be_positive_integers() {
        assert_eq!(parse_width("1").unwrap(), 1);
        assert_eq!(parse_width("4000").unwrap(), 4000);
        for bad in ["", "0", "-5", "12.5", "1e3", "99999999999"] {
            let err = parse_width(bad).unwrap_err();
            assert!(
                matches!(err.kind(), CodecErrorKind::InvalidWidth(_)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_height_follows_aspect_ratio() {
        assert_eq!(scaled_height(400, 300, 200), 150);
        assert_eq!(scaled_height(300, 400, 150), 200);
        assert_eq!(scaled_height(3, 2, 2), 1);
        assert_eq!(scaled_height(1000, 1, 10), 1);
        assert_eq!(scaled_height(200, 200, 200), 200);
    }
}
