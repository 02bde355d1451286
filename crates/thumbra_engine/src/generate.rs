//! One generate-and-cache cycle for a missing thumbnail.

use crate::{GenerationOutcome, LeaseGuard};
use std::sync::Arc;
use thumbra_codec::Codec;
use thumbra_core::{RasterFormat, ThumbnailLocator};
use thumbra_error::{CodecError, CodecErrorKind, EngineError, EngineErrorKind, ThumbraResult};
use thumbra_storage::ObjectStore;

/// Everything a detached generation task needs.
pub(crate) struct GenerationJob {
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) codec: Arc<dyn Codec>,
    pub(crate) locator: ThumbnailLocator,
}

impl GenerationJob {
    /// Run the job under `guard` and publish its outcome to waiters.
    ///
    /// Errors are published as [`GenerationOutcome::Failed`] and returned in
    /// full to the owner.
    pub(crate) async fn run(self, guard: LeaseGuard) -> ThumbraResult<GenerationOutcome> {
        let result = self.execute().await;
        let published = match &result {
            Ok(outcome) => outcome.clone(),
            Err(e) => GenerationOutcome::Failed(e.to_string()),
        };
        guard.complete(published);
        result
    }

    #[tracing::instrument(skip(self), fields(key = %self.locator.storage_key(), width = %self.locator.width()))]
    async fn execute(&self) -> ThumbraResult<GenerationOutcome> {
        let thumb_key = self.locator.storage_key();

        // A previous owner may have finished between our probe and the lease.
        match self.store.head(&thumb_key).await {
            Ok(_) => {
                tracing::debug!("Thumbnail appeared while acquiring lease");
                return Ok(GenerationOutcome::Generated);
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let original_key = self.locator.image().storage_key();
        let original = match self.store.get(&original_key).await {
            Ok(payload) => payload,
            Err(e) if e.is_not_found() => {
                tracing::warn!(original = %original_key, "Original missing, cannot generate");
                return Ok(GenerationOutcome::OriginalMissing);
            }
            Err(e) => return Err(e.into()),
        };

        let filename = self.locator.image().filename();
        let format = RasterFormat::from_filename(filename).ok_or_else(|| {
            CodecError::new(CodecErrorKind::UnsupportedFormat(filename.to_string()))
        })?;

        let codec = Arc::clone(&self.codec);
        let width = self.locator.width().clone();
        let source = original.body;
        let rendered = tokio::task::spawn_blocking(move || {
            codec
                .thumbnail(&source, format, &width)
                .and_then(|scratch| scratch.into_bytes())
        })
        .await
        .map_err(|e| EngineError::new(EngineErrorKind::TaskFailed(e.to_string())))?;

        let body = match rendered {
            Ok(body) => body,
            Err(e) if e.is_width_too_large() => {
                tracing::info!(error = %e, "Requested width exceeds original, serving original");
                return Ok(GenerationOutcome::WidthTooLarge);
            }
            Err(e) => return Err(e.into()),
        };

        let size = body.len();
        self.store
            .put(&thumb_key, body, format.content_type())
            .await?;

        tracing::info!(size, content_type = format.content_type(), "Generated and stored thumbnail");
        Ok(GenerationOutcome::Generated)
    }
}
