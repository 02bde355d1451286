//! Resolution engine: probe, negotiate, generate, serve.

use crate::generate::GenerationJob;
use crate::{Conditions, Freshness, GenerationLeases, GenerationOutcome, Lease, Placeholder, negotiate};
use std::sync::Arc;
use thumbra_codec::Codec;
use thumbra_core::{
    ImageLocator, ObjectMetadata, ObjectPayload, RasterFormat, StorageKey, ThumbnailLocator,
    validate_image, validate_thumbnail,
};
use thumbra_error::{EngineError, EngineErrorKind, ThumbraResult};
use thumbra_storage::ObjectStore;

/// What the HTTP layer should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Full object, served with long-lived caching.
    Found(ObjectPayload),
    /// Client copy is current; validators only.
    NotModified(ObjectMetadata),
    /// Object absent; serve the placeholder with a 404.
    Fallback(Placeholder),
}

impl Resolution {
    /// Whether this is the placeholder fallback.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback(_))
    }
}

/// Cache-aside resolver for originals and thumbnails.
///
/// Cheap to clone; clones share the store, codec, and lease registry.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use thumbra_codec::ImageCodec;
/// use thumbra_core::ImageLocator;
/// use thumbra_engine::{Conditions, Engine, Placeholder};
/// use thumbra_storage::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = Engine::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(ImageCodec::default()),
///     Placeholder::builtin()?,
/// );
///
/// let locator = ImageLocator::new("metawiki", "a", "a0", "foo.png", "latest");
/// let resolution = engine.resolve_original(&locator, &Conditions::none()).await?;
/// assert!(resolution.is_fallback());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn ObjectStore>,
    codec: Arc<dyn Codec>,
    leases: GenerationLeases,
    placeholder: Placeholder,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("leases", &self.leases)
            .field("placeholder", &self.placeholder.content_type())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Wire an engine from its collaborators.
    pub fn new(store: Arc<dyn ObjectStore>, codec: Arc<dyn Codec>, placeholder: Placeholder) -> Self {
        Self {
            store,
            codec,
            leases: GenerationLeases::new(),
            placeholder,
        }
    }

    /// Registry of in-flight generations.
    pub fn leases(&self) -> &GenerationLeases {
        &self.leases
    }

    /// Payload served on a miss.
    pub fn placeholder(&self) -> &Placeholder {
        &self.placeholder
    }

    /// Resolve a request for an original.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed locator and a storage error
    /// for any store failure other than not-found.
    #[tracing::instrument(skip(self, locator, conditions), fields(wiki = %locator.wiki(), filename = %locator.filename(), revision = %locator.revision()))]
    pub async fn resolve_original(
        &self,
        locator: &ImageLocator,
        conditions: &Conditions,
    ) -> ThumbraResult<Resolution> {
        validate_image(locator)?;
        let key = locator.storage_key();

        match self.serve_stored(&key, conditions).await? {
            Some(resolution) => Ok(resolution),
            None => {
                tracing::warn!(key = %key, "Original not found, serving placeholder");
                Ok(self.fallback())
            }
        }
    }

    /// Resolve a request for a thumbnail, generating it on a miss.
    ///
    /// Filenames outside the raster set are served as originals.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed locator, and storage, codec,
    /// or engine errors when generation fails.
    #[tracing::instrument(skip(self, locator, conditions), fields(wiki = %locator.image().wiki(), filename = %locator.image().filename(), width = %locator.width()))]
    pub async fn resolve_thumbnail(
        &self,
        locator: &ThumbnailLocator,
        conditions: &Conditions,
    ) -> ThumbraResult<Resolution> {
        if RasterFormat::from_filename(locator.image().filename()).is_none() {
            tracing::debug!("Format not thumbnailable, serving original");
            return self.resolve_original(locator.image(), conditions).await;
        }

        validate_thumbnail(locator)?;
        let key = locator.storage_key();

        if let Some(resolution) = self.serve_stored(&key, conditions).await? {
            tracing::debug!(key = %key, "Thumbnail cache hit");
            return Ok(resolution);
        }

        tracing::debug!(key = %key, "Thumbnail cache miss");
        match self.generate(locator, &key).await? {
            GenerationOutcome::Generated => match self.fetch(&key).await? {
                Some(payload) => Ok(Resolution::Found(payload)),
                None => {
                    tracing::warn!(key = %key, "Thumbnail missing after generation, serving placeholder");
                    Ok(self.fallback())
                }
            },
            GenerationOutcome::WidthTooLarge => {
                self.resolve_original(locator.image(), conditions).await
            }
            GenerationOutcome::OriginalMissing => {
                tracing::warn!(key = %key, "Original not found, serving placeholder");
                Ok(self.fallback())
            }
            GenerationOutcome::Failed(message) => Err(EngineError::new(
                EngineErrorKind::GenerationFailed(format!("{}: {}", key, message)),
            )
            .into()),
        }
    }

    /// Probe, negotiate, and fetch a stored object. `None` means absent.
    async fn serve_stored(
        &self,
        key: &StorageKey,
        conditions: &Conditions,
    ) -> ThumbraResult<Option<Resolution>> {
        let metadata = match self.store.head(key).await {
            Ok(metadata) => metadata,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Store probe failed");
                return Err(e.into());
            }
        };

        if negotiate(conditions, &metadata) == Freshness::NotModified {
            tracing::debug!(key = %key, "Client copy is current");
            return Ok(Some(Resolution::NotModified(metadata)));
        }

        Ok(self.fetch(key).await?.map(Resolution::Found))
    }

    async fn fetch(&self, key: &StorageKey) -> ThumbraResult<Option<ObjectPayload>> {
        match self.store.get(key).await {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Store fetch failed");
                Err(e.into())
            }
        }
    }

    /// Generate `key` or wait for whoever already is.
    ///
    /// The owner's work runs on a detached task, so it completes for waiters
    /// even if the request that started it goes away.
    async fn generate(
        &self,
        locator: &ThumbnailLocator,
        key: &StorageKey,
    ) -> ThumbraResult<GenerationOutcome> {
        loop {
            match self.leases.acquire(key) {
                Lease::Owner(guard) => {
                    let job = GenerationJob {
                        store: Arc::clone(&self.store),
                        codec: Arc::clone(&self.codec),
                        locator: locator.clone(),
                    };
                    return match tokio::spawn(job.run(guard)).await {
                        Ok(Ok(outcome)) => Ok(outcome),
                        Ok(Err(e)) => {
                            tracing::error!(key = %key, error = %e, "Thumbnail generation failed");
                            Err(e)
                        }
                        Err(e) => {
                            tracing::error!(key = %key, error = %e, "Thumbnail generation task died");
                            Err(EngineError::new(EngineErrorKind::TaskFailed(e.to_string())).into())
                        }
                    };
                }
                Lease::Waiter(waiter) => {
                    tracing::debug!(key = %key, "Waiting for in-flight generation");
                    if let Some(outcome) = waiter.outcome().await {
                        return Ok(outcome);
                    }
                    tracing::debug!(key = %key, "Generation owner vanished, retrying");
                }
            }
        }
    }

    fn fallback(&self) -> Resolution {
        Resolution::Fallback(self.placeholder.clone())
    }
}
