//! Object store trait definition.

use bytes::Bytes;
use std::sync::Arc;
use thumbra_core::{ObjectMetadata, ObjectPayload, StorageKey};
use thumbra_error::StorageResult;

/// Capability interface over the backing object store.
///
/// All three operations signal an absent object with
/// [`StorageErrorKind::NotFound`](thumbra_error::StorageErrorKind::NotFound),
/// distinct from transport or server failures.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's bytes and metadata.
    ///
    /// # Arguments
    ///
    /// * `key` - Canonical key derived from a locator
    async fn get(&self, key: &StorageKey) -> StorageResult<ObjectPayload>;

    /// Fetch an object's metadata without its body.
    ///
    /// # Arguments
    ///
    /// * `key` - Canonical key derived from a locator
    async fn head(&self, key: &StorageKey) -> StorageResult<ObjectMetadata>;

    /// Store `body` under `key`, replacing any existing object.
    ///
    /// # Arguments
    ///
    /// * `key` - Canonical key derived from a locator
    /// * `body` - Encoded object bytes
    /// * `content_type` - MIME type recorded with the object
    async fn put(&self, key: &StorageKey, body: Bytes, content_type: &str) -> StorageResult<()>;
}

#[async_trait::async_trait]
impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    async fn get(&self, key: &StorageKey) -> StorageResult<ObjectPayload> {
        (**self).get(key).await
    }

    async fn head(&self, key: &StorageKey) -> StorageResult<ObjectMetadata> {
        (**self).head(key).await
    }

    async fn put(&self, key: &StorageKey, body: Bytes, content_type: &str) -> StorageResult<()> {
        (**self).put(key, body, content_type).await
    }
}
