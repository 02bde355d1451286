//! In-memory object store.

use crate::{ObjectStore, entity_tag};
use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use thumbra_core::{ObjectMetadata, ObjectPayload, StorageKey};
use thumbra_error::{StorageError, StorageErrorKind, StorageResult};

/// Process-local object store.
///
/// Objects live for the lifetime of the value. ETags are content digests and
/// last-modified is the instant of the `put`, mirroring what a real store
/// reports. Operation counters let callers observe how often the store was
/// touched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<StorageKey, ObjectPayload>>,
    gets: AtomicUsize,
    heads: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Whether an object exists under `key`.
    pub fn contains(&self, key: &StorageKey) -> bool {
        self.objects.read().contains_key(key)
    }

    /// Number of `get` calls served so far.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `head` calls served so far.
    pub fn head_count(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }

    /// Number of `put` calls served so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn not_found(key: &StorageKey) -> StorageError {
        StorageError::new(StorageErrorKind::NotFound(key.to_string()))
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    #[tracing::instrument(skip(self, key), fields(key = %key))]
    async fn get(&self, key: &StorageKey) -> StorageResult<ObjectPayload> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.objects
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| Self::not_found(key))
    }

    #[tracing::instrument(skip(self, key), fields(key = %key))]
    async fn head(&self, key: &StorageKey) -> StorageResult<ObjectMetadata> {
        self.heads.fetch_add(1, Ordering::SeqCst);
        self.objects
            .read()
            .get(key)
            .map(|payload| payload.metadata.clone())
            .ok_or_else(|| Self::not_found(key))
    }

    #[tracing::instrument(skip(self, key, body), fields(key = %key, size = body.len()))]
    async fn put(&self, key: &StorageKey, body: Bytes, content_type: &str) -> StorageResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let metadata = ObjectMetadata {
            content_type: content_type.to_string(),
            length: body.len() as u64,
            e_tag: Some(entity_tag(&body)),
            last_modified: Some(Utc::now()),
            content_disposition: None,
        };
        self.objects
            .write()
            .insert(key.clone(), ObjectPayload::new(metadata, body));
        tracing::debug!("Stored object in memory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thumbra_core::ImageLocator;

    fn key() -> StorageKey {
        ImageLocator::new("metawiki", "a", "a0", "foo.png", "latest").storage_key()
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let store = MemoryStore::new();
        assert!(store.get(&key()).await.unwrap_err().is_not_found());
        assert!(store.head(&key()).await.unwrap_err().is_not_found());
        assert_eq!(store.get_count(), 1);
        assert_eq!(store.head_count(), 1);
    }

    #[tokio::test]
    async fn test_put_then_get_reports_metadata() {
        let store = MemoryStore::new();
        store
            .put(&key(), Bytes::from_static(b"hello"), "image/png")
            .await
            .unwrap();

        let payload = store.get(&key()).await.unwrap();
        assert_eq!(payload.body, Bytes::from_static(b"hello"));
        assert_eq!(payload.metadata.content_type, "image/png");
        assert_eq!(payload.metadata.length, 5);
        assert_eq!(payload.metadata.e_tag, Some(entity_tag(b"hello")));
        assert!(payload.metadata.last_modified.is_some());
        assert_eq!(store.len(), 1);
        assert_eq!(store.put_count(), 1);
    }
}
