//! Decoded raster wrapper.

use image::DynamicImage;

/// A decoded image held in memory.
#[derive(Debug, Clone)]
pub struct RasterImage {
    inner: DynamicImage,
}

impl RasterImage {
    /// Pixel width.
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Pixel height.
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Borrow the underlying `image` representation.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.inner
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(inner: DynamicImage) -> Self {
        Self { inner }
    }
}
