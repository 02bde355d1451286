//! Core data types for the Thumbra media server.
//!
//! This crate provides the request locators, their canonical storage keys,
//! structural validation, and the object metadata shared by every other crate.
//! Nothing here performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod format;
mod locator;
mod object;
mod validate;

pub use format::{OCTET_STREAM, RasterFormat, content_type_for, extension_of};
pub use locator::{ImageLocator, LATEST_REVISION, StorageKey, ThumbnailLocator};
pub use object::{ObjectMetadata, ObjectPayload};
pub use validate::{validate_image, validate_thumbnail};
