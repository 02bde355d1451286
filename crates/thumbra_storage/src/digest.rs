//! Entity tags for backends that have to compute their own.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Quoted SHA-256 hex digest of `data`, in HTTP entity-tag form.
///
/// # Examples
///
/// ```
/// let tag = thumbra_storage::entity_tag(b"abc");
/// assert!(tag.starts_with('"') && tag.ends_with('"'));
/// assert_eq!(tag.len(), 64 + 2);
/// ```
pub fn entity_tag(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("\"{:x}\"", hasher.finalize())
}

/// Entity tag from an object's size and modification time, without reading it.
///
/// Changes whenever the file is rewritten with a different length or mtime.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
///
/// let modified = Utc.timestamp_opt(1_761_089_461, 0).unwrap();
/// assert_eq!(thumbra_storage::stat_tag(255, Some(modified)), "\"ff-68f817b5-0\"");
/// assert_eq!(thumbra_storage::stat_tag(3, None), "\"3-0-0\"");
/// ```
pub fn stat_tag(length: u64, modified: Option<DateTime<Utc>>) -> String {
    let (secs, nanos) = modified
        .map(|instant| (instant.timestamp(), instant.timestamp_subsec_nanos()))
        .unwrap_or_default();
    format!("\"{:x}-{:x}-{:x}\"", length, secs, nanos)
}
