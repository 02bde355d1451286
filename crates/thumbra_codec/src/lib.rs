//! Raster codec for the Thumbra media server.
//!
//! Thumbnail generation is three CPU-bound steps: decode the original, resize
//! it to the requested width preserving aspect ratio, and encode it back into
//! the original's format. The [`Codec`] trait is the seam the engine drives;
//! [`ImageCodec`] implements it with the pure-Rust `image` crate.
//!
//! Encoded output lands in a [`Scratch`] buffer that stays in memory up to a
//! configurable size and spills to an anonymous temp file beyond it. The
//! buffer is reclaimed when dropped, so an abandoned generation never leaks
//! disk.
//!
//! # Example
//!
//! ```rust
//! use thumbra_codec::{Codec, ImageCodec, encode_placeholder};
//! use thumbra_core::RasterFormat;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = ImageCodec::default();
//! let png = encode_placeholder()?;
//!
//! let image = codec.decode(&png, RasterFormat::Png)?;
//! assert_eq!((image.width(), image.height()), (1, 1));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod image_codec;
mod placeholder;
mod raster;
mod scratch;

pub use codec::{Codec, parse_width, scaled_height};
pub use image_codec::{CodecSettings, CodecSettingsBuilder, ImageCodec};
pub use placeholder::encode_placeholder;
pub use raster::RasterImage;
pub use scratch::{DEFAULT_MEMORY_LIMIT, Scratch};
pub use thumbra_error::{CodecError, CodecErrorKind, CodecResult};
