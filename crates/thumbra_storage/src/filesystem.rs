//! Filesystem-backed object store.
//!
//! Objects are laid out on disk under their canonical keys, so a media tree
//! copied from a wiki's upload directory can be served as-is.

use crate::{ObjectStore, entity_tag, stat_tag};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thumbra_core::{ObjectMetadata, ObjectPayload, StorageKey, content_type_for};
use thumbra_error::{StorageError, StorageErrorKind, StorageResult};
use uuid::Uuid;

/// Directory under the root holding metadata sidecars.
const META_DIR: &str = ".meta";

/// Filesystem storage backend.
///
/// Layout:
///
/// ```text
/// /var/thumbra/media/
/// ├── metawiki/
/// │   ├── a/a0/foo.png                          (original)
/// │   ├── archive/a/a0/20251021233101!foo.png   (archived original)
/// │   └── thumb/a/a0/foo.png/200px-foo.png      (thumbnail)
/// └── .meta/
///     └── metawiki/thumb/a/a0/foo.png/200px-foo.png.json
/// ```
///
/// # Features
///
/// - **Atomic writes**: temp file + rename, so readers never see partial objects
/// - **Sidecar metadata**: content type and ETag recorded at `put` time
/// - **Operator-friendly**: objects without a sidecar are served with a content
///   type derived from their extension and an ETag computed from their bytes
#[derive(Debug)]
pub struct FileSystemStore {
    base_path: PathBuf,
}

/// Metadata persisted next to each object written through the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Sidecar {
    content_type: String,
    e_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_disposition: Option<String>,
}

impl FileSystemStore {
    /// Create a new filesystem store.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem store");
        Ok(Self { base_path })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Map a key onto a path below the root, refusing anything that could escape it.
    fn object_path(&self, key: &StorageKey) -> StorageResult<PathBuf> {
        let mut path = self.base_path.clone();
        for (index, segment) in key.as_str().split('/').enumerate() {
            let invalid = segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains('\\')
                || (index == 0 && segment == META_DIR);
            if invalid {
                return Err(StorageError::new(StorageErrorKind::InvalidKey(
                    key.to_string(),
                )));
            }
            path.push(segment);
        }
        Ok(path)
    }

    fn sidecar_path(&self, key: &StorageKey) -> PathBuf {
        self.base_path
            .join(META_DIR)
            .join(format!("{}.json", key.as_str()))
    }

    async fn read_sidecar(&self, key: &StorageKey) -> Option<Sidecar> {
        let raw = tokio::fs::read(self.sidecar_path(key)).await.ok()?;
        match serde_json::from_slice(&raw) {
            Ok(sidecar) => Some(sidecar),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ignoring unreadable metadata sidecar");
                None
            }
        }
    }

    /// Write `data` to `path` through a uniquely named temp file.
    async fn write_atomic(path: &Path, data: &[u8]) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))));
        }
        Ok(())
    }

    fn read_error(key: &StorageKey, path: &Path, e: std::io::Error) -> StorageError {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::new(StorageErrorKind::NotFound(key.to_string()))
        } else {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        }
    }

    /// Assemble metadata from the file's stat and its sidecar. Objects without
    /// a sidecar get a content type from their extension and a stat-derived tag.
    async fn metadata_for(&self, key: &StorageKey, path: &Path) -> StorageResult<ObjectMetadata> {
        let stat = tokio::fs::metadata(path)
            .await
            .map_err(|e| Self::read_error(key, path, e))?;
        if !stat.is_file() {
            return Err(StorageError::new(StorageErrorKind::NotFound(key.to_string())));
        }
        let last_modified = stat.modified().ok().map(DateTime::<Utc>::from);

        let (content_type, e_tag, content_disposition) = match self.read_sidecar(key).await {
            Some(sidecar) => (
                sidecar.content_type,
                sidecar.e_tag,
                sidecar.content_disposition,
            ),
            None => (
                content_type_for(key.file_name()).to_string(),
                stat_tag(stat.len(), last_modified),
                None,
            ),
        };

        Ok(ObjectMetadata {
            content_type,
            length: stat.len(),
            e_tag: Some(e_tag),
            last_modified,
            content_disposition,
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for FileSystemStore {
    #[tracing::instrument(skip(self, key), fields(key = %key))]
    async fn get(&self, key: &StorageKey) -> StorageResult<ObjectPayload> {
        let path = self.object_path(key)?;

        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| Self::read_error(key, &path, e))?;
        let metadata = self.metadata_for(key, &path).await?;

        tracing::debug!(path = %path.display(), size = data.len(), "Read object from disk");
        Ok(ObjectPayload::new(metadata, Bytes::from(data)))
    }

    #[tracing::instrument(skip(self, key), fields(key = %key))]
    async fn head(&self, key: &StorageKey) -> StorageResult<ObjectMetadata> {
        let path = self.object_path(key)?;
        self.metadata_for(key, &path).await
    }

    #[tracing::instrument(skip(self, key, body), fields(key = %key, size = body.len()))]
    async fn put(&self, key: &StorageKey, body: Bytes, content_type: &str) -> StorageResult<()> {
        let path = self.object_path(key)?;

        let sidecar = Sidecar {
            content_type: content_type.to_string(),
            e_tag: entity_tag(&body),
            content_disposition: None,
        };
        let sidecar_json = serde_json::to_vec(&sidecar).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "encode metadata for {}: {}",
                key, e
            )))
        })?;

        // Sidecar first: a reader that sees the object also sees its metadata.
        Self::write_atomic(&self.sidecar_path(key), &sidecar_json).await?;
        Self::write_atomic(&path, &body).await?;

        tracing::info!(
            path = %path.display(),
            size = body.len(),
            content_type,
            "Stored object on disk"
        );
        Ok(())
    }
}
