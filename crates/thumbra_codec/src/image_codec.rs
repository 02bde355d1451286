//! [`Codec`] implementation over the `image` crate.
//!
//! | Operation | `image` call |
//! |---|---|
//! | Decode | `load_from_memory_with_format` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode JPEG | `JpegEncoder::new_with_quality` |
//! | Encode PNG, GIF, WebP | `DynamicImage::write_to` |

use crate::{Codec, RasterImage, Scratch, scaled_height};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat};
use std::borrow::Cow;
use thumbra_core::RasterFormat;
use thumbra_error::{CodecError, CodecErrorKind, CodecResult};

/// Tunables for [`ImageCodec`].
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder, derive_getters::Getters)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct CodecSettings {
    /// JPEG quality, 1 to 100.
    #[builder(default = "85")]
    jpeg_quality: u8,
    /// Bytes of encoded output held in memory before spilling to disk.
    #[builder(default = "crate::DEFAULT_MEMORY_LIMIT")]
    scratch_memory_limit: usize,
}

impl CodecSettingsBuilder {
    /// Build the settings.
    ///
    /// # Errors
    ///
    /// Returns error if the JPEG quality is outside 1 to 100.
    pub fn build(&self) -> Result<CodecSettings, String> {
        let settings = self.build_internal().map_err(|e| e.to_string())?;
        if !(1..=100).contains(&settings.jpeg_quality) {
            return Err(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                settings.jpeg_quality
            ));
        }
        Ok(settings)
    }
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            scratch_memory_limit: crate::DEFAULT_MEMORY_LIMIT,
        }
    }
}

/// Pure-Rust codec backed by the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct ImageCodec {
    settings: CodecSettings,
}

impl ImageCodec {
    /// Create a codec with explicit settings.
    pub fn new(settings: CodecSettings) -> Self {
        Self { settings }
    }

    /// Settings in effect.
    pub fn settings(&self) -> &CodecSettings {
        &self.settings
    }
}

fn image_format(format: RasterFormat) -> ImageFormat {
    match format {
        RasterFormat::Jpeg => ImageFormat::Jpeg,
        RasterFormat::Png => ImageFormat::Png,
        RasterFormat::Gif => ImageFormat::Gif,
        RasterFormat::Webp => ImageFormat::WebP,
    }
}

/// Convert to a pixel layout the target encoder accepts.
fn encodable(image: &DynamicImage, format: RasterFormat) -> Cow<'_, DynamicImage> {
    let color = image.color();
    match format {
        RasterFormat::Jpeg if !matches!(color, ColorType::L8 | ColorType::Rgb8) => {
            Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8()))
        }
        RasterFormat::Gif | RasterFormat::Webp
            if !matches!(color, ColorType::Rgb8 | ColorType::Rgba8) =>
        {
            Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8()))
        }
        _ => Cow::Borrowed(image),
    }
}

impl Codec for ImageCodec {
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    fn decode(&self, bytes: &[u8], format: RasterFormat) -> CodecResult<RasterImage> {
        image::load_from_memory_with_format(bytes, image_format(format))
            .map(RasterImage::from)
            .map_err(|e| CodecError::new(CodecErrorKind::Decode(format!("{}: {}", format, e))))
    }

    fn resize(&self, image: &RasterImage, width: u32) -> CodecResult<RasterImage> {
        if width == 0 {
            return Err(CodecError::new(CodecErrorKind::InvalidWidth(
                width.to_string(),
            )));
        }
        let original = image.width();
        if width > original {
            return Err(CodecError::new(CodecErrorKind::WidthTooLarge {
                requested: width,
                original,
            }));
        }
        if width == original {
            return Ok(image.clone());
        }

        let height = scaled_height(original, image.height(), width);
        Ok(RasterImage::from(image.as_dynamic().resize_exact(
            width,
            height,
            FilterType::Lanczos3,
        )))
    }

    #[tracing::instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    fn encode(&self, image: &RasterImage, format: RasterFormat) -> CodecResult<Scratch> {
        let mut scratch = Scratch::new(self.settings.scratch_memory_limit);
        let pixels = encodable(image.as_dynamic(), format);

        let result = match format {
            RasterFormat::Jpeg => pixels.write_with_encoder(JpegEncoder::new_with_quality(
                &mut scratch,
                self.settings.jpeg_quality,
            )),
            other => pixels.write_to(&mut scratch, image_format(other)),
        };
        result.map_err(|e| CodecError::new(CodecErrorKind::Encode(format!("{}: {}", format, e))))?;

        tracing::debug!(spilled = scratch.is_rolled(), "Encoded image");
        Ok(scratch)
    }
}
