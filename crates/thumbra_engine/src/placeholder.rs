//! Substitute image served when an object cannot be found.

use bytes::Bytes;
use std::path::Path;
use thumbra_core::{ObjectMetadata, content_type_for};
use thumbra_error::{CodecResult, ConfigError};

/// Fixed payload returned with a 404.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct Placeholder {
    body: Bytes,
    content_type: String,
}

impl Placeholder {
    /// Wrap arbitrary bytes.
    pub fn new(body: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            body,
            content_type: content_type.into(),
        }
    }

    /// The built-in transparent 1x1 PNG.
    ///
    /// # Errors
    ///
    /// Returns error if the PNG encoder fails.
    pub fn builtin() -> CodecResult<Self> {
        Ok(Self::new(thumbra_codec::encode_placeholder()?, "image/png"))
    }

    /// Load a placeholder from disk. Content type follows the extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configured file cannot be read.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let body = tokio::fs::read(path).await.map_err(|e| {
            ConfigError::new(format!(
                "engine.placeholder_path {}: {}",
                path.display(),
                e
            ))
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        tracing::info!(path = %path.display(), size = body.len(), "Loaded placeholder image");
        Ok(Self::new(Bytes::from(body), content_type_for(&name)))
    }

    /// Metadata describing the placeholder as if it were a stored object.
    pub fn metadata(&self) -> ObjectMetadata {
        ObjectMetadata {
            content_type: self.content_type.clone(),
            length: self.body.len() as u64,
            ..ObjectMetadata::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_png() {
        let placeholder = Placeholder::builtin().unwrap();
        assert_eq!(placeholder.content_type(), "image/png");
        assert!(placeholder.body().starts_with(b"\x89PNG"));
        assert_eq!(placeholder.metadata().length, placeholder.body().len() as u64);
        assert_eq!(placeholder.metadata().e_tag, None);
    }

    #[tokio::test]
    async fn test_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let placeholder = Placeholder::from_file(&path).await.unwrap();
        assert_eq!(placeholder.content_type(), "image/gif");
        assert_eq!(placeholder.body(), &Bytes::from_static(b"GIF89a"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let err = Placeholder::from_file("/nonexistent/placeholder.png")
            .await
            .unwrap_err();
        assert!(err.message.contains("engine.placeholder_path"));
        assert!(err.message.contains("/nonexistent/placeholder.png"));
    }
}
