//! Time-bounded wrapper around any object store.

use crate::ObjectStore;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thumbra_core::{ObjectMetadata, ObjectPayload, StorageKey};
use thumbra_error::{StorageError, StorageErrorKind, StorageResult};

/// Per-operation time bounds applied by [`StoreGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct StoreTimeouts {
    /// Bound on a full object fetch
    get: Duration,
    /// Bound on an existence probe
    head: Duration,
    /// Bound on an upload
    put: Duration,
}

impl StoreTimeouts {
    /// Create explicit bounds.
    pub fn new(get: Duration, head: Duration, put: Duration) -> Self {
        Self { get, head, put }
    }
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self {
            get: Duration::from_secs(30),
            head: Duration::from_secs(5),
            put: Duration::from_secs(30),
        }
    }
}

/// Gateway the resolution engine talks to.
///
/// Delegates to a backend and converts an elapsed bound into
/// [`StorageErrorKind::Timeout`]. No call is retried.
#[derive(Clone)]
pub struct StoreGateway {
    inner: Arc<dyn ObjectStore>,
    timeouts: StoreTimeouts,
}

impl std::fmt::Debug for StoreGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreGateway")
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl StoreGateway {
    /// Wrap `inner` with the given bounds.
    pub fn new(inner: Arc<dyn ObjectStore>, timeouts: StoreTimeouts) -> Self {
        Self { inner, timeouts }
    }

    /// Bounds in effect.
    pub fn timeouts(&self) -> &StoreTimeouts {
        &self.timeouts
    }

    async fn bounded<T>(
        operation: &'static str,
        limit: Duration,
        key: &StorageKey,
        call: impl Future<Output = StorageResult<T>>,
    ) -> StorageResult<T> {
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, key = %key, limit_ms = limit.as_millis() as u64, "Store call timed out");
                Err(StorageError::new(StorageErrorKind::Timeout(format!(
                    "{} {} after {:?}",
                    operation, key, limit
                ))))
            }
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for StoreGateway {
    async fn get(&self, key: &StorageKey) -> StorageResult<ObjectPayload> {
        Self::bounded("get", self.timeouts.get, key, self.inner.get(key)).await
    }

    async fn head(&self, key: &StorageKey) -> StorageResult<ObjectMetadata> {
        Self::bounded("head", self.timeouts.head, key, self.inner.head(key)).await
    }

    async fn put(&self, key: &StorageKey, body: Bytes, content_type: &str) -> StorageResult<()> {
        Self::bounded(
            "put",
            self.timeouts.put,
            key,
            self.inner.put(key, body, content_type),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use thumbra_core::ImageLocator;

    struct StalledStore;

    #[async_trait::async_trait]
    impl ObjectStore for StalledStore {
        async fn get(&self, _key: &StorageKey) -> StorageResult<ObjectPayload> {
            std::future::pending().await
        }

        async fn head(&self, _key: &StorageKey) -> StorageResult<ObjectMetadata> {
            std::future::pending().await
        }

        async fn put(&self, _key: &StorageKey, _body: Bytes, _ct: &str) -> StorageResult<()> {
            std::future::pending().await
        }
    }

    fn key() -> StorageKey {
        ImageLocator::new("metawiki", "a", "a0", "foo.png", "latest").storage_key()
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_calls_become_timeouts() {
        let gateway = StoreGateway::new(Arc::new(StalledStore), StoreTimeouts::default());

        let err = gateway.head(&key()).await.unwrap_err();
        assert!(matches!(err.kind(), StorageErrorKind::Timeout(_)));
        assert!(!err.is_not_found());

        let err = gateway.get(&key()).await.unwrap_err();
        assert!(matches!(err.kind(), StorageErrorKind::Timeout(_)));

        let err = gateway
            .put(&key(), Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), StorageErrorKind::Timeout(_)));
    }

    #[tokio::test]
    async fn test_results_pass_through() {
        let store = Arc::new(MemoryStore::new());
        let gateway = StoreGateway::new(store.clone(), StoreTimeouts::default());

        assert!(gateway.head(&key()).await.unwrap_err().is_not_found());
        gateway
            .put(&key(), Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap();
        assert_eq!(gateway.get(&key()).await.unwrap().body, Bytes::from_static(b"x"));
        assert_eq!(store.put_count(), 1);
    }
}
