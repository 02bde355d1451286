//! Structural validation of request locators.
//!
//! Validation runs before any store access and never checks existence.

use crate::{ImageLocator, ThumbnailLocator};
use thumbra_error::{ValidationError, ValidationErrorKind, ValidationResult};

/// Validate the locator of an original.
///
/// # Examples
///
/// ```
/// use thumbra_core::{ImageLocator, validate_image};
///
/// let good = ImageLocator::new("metawiki", "a", "a0", "foo.png", "latest");
/// assert!(validate_image(&good).is_ok());
///
/// let bad = ImageLocator::new("metawiki", "a", "b0", "foo.png", "latest");
/// assert!(validate_image(&bad).is_err());
/// ```
pub fn validate_image(locator: &ImageLocator) -> ValidationResult<()> {
    reject_separators("wiki", locator.wiki())?;
    reject_separators("hash1", locator.hash_bucket1())?;
    reject_separators("hash2", locator.hash_bucket2())?;
    reject_separators("filename", locator.filename())?;
    reject_separators("revision", locator.revision())?;

    if locator.wiki().is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::EmptyWiki));
    }

    let primary = locator.hash_bucket1();
    if primary.chars().count() != 1 {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidPrimaryBucket(primary.clone()),
        ));
    }

    let secondary = locator.hash_bucket2();
    let secondary_len = secondary.chars().count();
    if !(2..=3).contains(&secondary_len) {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidSecondaryBucket(secondary.clone()),
        ));
    }
    if !secondary.starts_with(primary.as_str()) {
        return Err(ValidationError::new(
            ValidationErrorKind::BucketPrefixMismatch {
                primary: primary.clone(),
                secondary: secondary.clone(),
            },
        ));
    }

    if locator.filename().is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::EmptyFilename));
    }

    if locator.revision().is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::EmptyRevision));
    }

    Ok(())
}

/// Validate the locator of a thumbnail.
///
/// Applies every rule of [`validate_image`], then requires the width to be a
/// positive integer that fits in `u32`.
pub fn validate_thumbnail(locator: &ThumbnailLocator) -> ValidationResult<()> {
    validate_image(locator.image())?;

    let width = locator.width();
    reject_separators("width", width)?;
    if width.is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::EmptyWidth));
    }
    let numeric = width.bytes().all(|b| b.is_ascii_digit());
    if !numeric || !matches!(width.parse::<u32>(), Ok(w) if w > 0) {
        return Err(ValidationError::new(ValidationErrorKind::NonNumericWidth(
            width.clone(),
        )));
    }

    Ok(())
}

/// Each segment maps to exactly one key component, so none may split into two.
fn reject_separators(field: &'static str, segment: &str) -> ValidationResult<()> {
    if segment.contains(['/', '\\']) {
        return Err(ValidationError::new(
            ValidationErrorKind::SeparatorInSegment { field },
        ));
    }
    Ok(())
}
