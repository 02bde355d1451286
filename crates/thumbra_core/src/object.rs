//! Object metadata and payloads as reported by the store.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Metadata the store reports for an object.
///
/// Never computed locally; a HEAD probe yields this without a body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectMetadata {
    /// MIME type recorded with the object
    pub content_type: String,
    /// Body length in bytes
    pub length: u64,
    /// Entity tag, quoted as the store returns it
    pub e_tag: Option<String>,
    /// Last modification instant, when the store knows it
    pub last_modified: Option<DateTime<Utc>>,
    /// Stored `Content-Disposition`, if any
    pub content_disposition: Option<String>,
}

/// Metadata plus the full object body, produced only by a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPayload {
    /// Metadata of the fetched object
    pub metadata: ObjectMetadata,
    /// Raw object bytes
    pub body: Bytes,
}

impl ObjectPayload {
    /// Bundle a body with its metadata.
    pub fn new(metadata: ObjectMetadata, body: Bytes) -> Self {
        Self { metadata, body }
    }
}
