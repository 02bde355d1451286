//! Request locators and their canonical storage keys.

use crate::validate::{validate_image, validate_thumbnail};
use serde::{Deserialize, Serialize};
use thumbra_error::ValidationResult;

/// Revision token naming the current version of a file.
pub const LATEST_REVISION: &str = "latest";

/// Identifies an original file at one revision.
///
/// The hash buckets are derived upstream from a content hash and are opaque
/// here beyond structural validation.
///
/// # Examples
///
/// ```
/// use thumbra_core::ImageLocator;
///
/// let latest = ImageLocator::new("metawiki", "a", "a0", "foo.png", "latest");
/// assert_eq!(latest.storage_key().as_str(), "metawiki/a/a0/foo.png");
///
/// let archived = ImageLocator::new("metawiki", "a", "a0", "foo.png", "20251021233101");
/// assert_eq!(
///     archived.storage_key().as_str(),
///     "metawiki/archive/a/a0/20251021233101!foo.png"
/// );
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct ImageLocator {
    /// Wiki database name
    wiki: String,
    /// First hash bucket (one character)
    hash_bucket1: String,
    /// Second hash bucket (two or three characters, extends the first)
    hash_bucket2: String,
    /// File name as uploaded
    filename: String,
    /// `latest` or an archive timestamp token
    revision: String,
}

impl ImageLocator {
    /// Build a locator from request path segments.
    pub fn new(
        wiki: impl Into<String>,
        hash_bucket1: impl Into<String>,
        hash_bucket2: impl Into<String>,
        filename: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            wiki: wiki.into(),
            hash_bucket1: hash_bucket1.into(),
            hash_bucket2: hash_bucket2.into(),
            filename: filename.into(),
            revision: revision.into(),
        }
    }

    /// Whether this names the current revision rather than an archived one.
    pub fn is_latest(&self) -> bool {
        self.revision == LATEST_REVISION
    }

    /// Check the structural rules without touching the store.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_image(self)
    }

    /// Canonical key of the original.
    ///
    /// Only meaningful for a locator that passed [`ImageLocator::validate`].
    pub fn storage_key(&self) -> StorageKey {
        if self.is_latest() {
            StorageKey(format!(
                "{}/{}/{}/{}",
                self.wiki, self.hash_bucket1, self.hash_bucket2, self.filename
            ))
        } else {
            StorageKey(format!(
                "{}/archive/{}/{}/{}!{}",
                self.wiki, self.hash_bucket1, self.hash_bucket2, self.revision, self.filename
            ))
        }
    }

    /// Segment under which this revision's thumbnails live.
    fn thumb_directory(&self) -> String {
        if self.is_latest() {
            format!(
                "{}/thumb/{}/{}/{}",
                self.wiki, self.hash_bucket1, self.hash_bucket2, self.filename
            )
        } else {
            format!(
                "{}/thumb/archive/{}/{}/{}!{}",
                self.wiki, self.hash_bucket1, self.hash_bucket2, self.revision, self.filename
            )
        }
    }
}

/// Identifies a scaled rendition of an original at one revision.
///
/// # Examples
///
/// ```
/// use thumbra_core::{ImageLocator, ThumbnailLocator};
///
/// let image = ImageLocator::new("metawiki", "a", "a0", "foo.png", "latest");
/// let thumb = ThumbnailLocator::new(image, "200");
/// assert_eq!(
///     thumb.storage_key().as_str(),
///     "metawiki/thumb/a/a0/foo.png/200px-foo.png"
/// );
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct ThumbnailLocator {
    /// The original this rendition is scaled from
    image: ImageLocator,
    /// Requested pixel width, as given in the request
    width: String,
}

impl ThumbnailLocator {
    /// Build a thumbnail locator for `image` at `width`.
    pub fn new(image: ImageLocator, width: impl Into<String>) -> Self {
        Self {
            image,
            width: width.into(),
        }
    }

    /// Check the structural rules without touching the store.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_thumbnail(self)
    }

    /// Canonical key of the thumbnail.
    ///
    /// Only meaningful for a locator that passed [`ThumbnailLocator::validate`].
    pub fn storage_key(&self) -> StorageKey {
        StorageKey(format!(
            "{}/{}px-{}",
            self.image.thumb_directory(),
            self.width,
            self.image.filename()
        ))
    }
}

/// Canonical object-store key derived from a locator.
///
/// Keys are only produced by [`ImageLocator::storage_key`] and
/// [`ThumbnailLocator::storage_key`].
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
#[display("{}", _0)]
pub struct StorageKey(String);

impl StorageKey {
    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment of the key.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn image(revision: &str) -> ImageLocator {
        ImageLocator::new("metawiki", "a", "a0", "foo.png", revision)
    }

    #[test]
    fn test_original_keys() {
        assert_eq!(image("latest").storage_key().as_str(), "metawiki/a/a0/foo.png");
        assert_eq!(
            image("20251021233101").storage_key().as_str(),
            "metawiki/archive/a/a0/20251021233101!foo.png"
        );
    }

    #[test]
    fn test_thumbnail_keys() {
        let latest = ThumbnailLocator::new(image("latest"), "200");
        assert_eq!(
            latest.storage_key().as_str(),
            "metawiki/thumb/a/a0/foo.png/200px-foo.png"
        );

        let archived = ThumbnailLocator::new(image("20251021233101"), "200");
        assert_eq!(
            archived.storage_key().as_str(),
            "metawiki/thumb/archive/a/a0/20251021233101!foo.png/200px-foo.png"
        );
    }

    #[test]
    fn test_key_derivation_is_deterministic() {
        let thumb = ThumbnailLocator::new(image("latest"), "120");
        assert_eq!(thumb.storage_key(), thumb.clone().storage_key());
    }

    #[test]
    fn test_distinct_locators_yield_distinct_keys() {
        let locators = [
            image("latest").storage_key(),
            image("20251021233101").storage_key(),
            ImageLocator::new("enwiki", "a", "a0", "foo.png", "latest").storage_key(),
            ImageLocator::new("metawiki", "b", "b0", "foo.png", "latest").storage_key(),
            ImageLocator::new("metawiki", "a", "a01", "foo.png", "latest").storage_key(),
            ThumbnailLocator::new(image("latest"), "200").storage_key(),
            ThumbnailLocator::new(image("latest"), "201").storage_key(),
            ThumbnailLocator::new(image("20251021233101"), "200").storage_key(),
        ];
        let unique: HashSet<_> = locators.iter().collect();
        assert_eq!(unique.len(), locators.len());
    }

    #[test]
    fn test_file_name_is_last_segment() {
        let thumb = ThumbnailLocator::new(image("latest"), "200");
        assert_eq!(thumb.storage_key().file_name(), "200px-foo.png");
    }
}
