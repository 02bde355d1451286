//! Tests for filesystem storage backend.

use bytes::Bytes;
use tempfile::TempDir;
use thumbra_core::{ImageLocator, ThumbnailLocator};
use thumbra_storage::{FileSystemStore, ObjectStore, StorageErrorKind, entity_tag, stat_tag};

fn original() -> ImageLocator {
    ImageLocator::new("metawiki", "a", "a0", "foo.png", "latest")
}

#[tokio::test]
async fn test_put_then_get() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemStore::new(temp_dir.path()).unwrap();
    let key = ThumbnailLocator::new(original(), "200").storage_key();

    store
        .put(&key, Bytes::from_static(b"thumbnail bytes"), "image/png")
        .await
        .unwrap();

    // Object lands under its key, nested directories included
    let on_disk = temp_dir.path().join("metawiki/thumb/a/a0/foo.png/200px-foo.png");
    assert!(on_disk.is_file());

    let payload = store.get(&key).await.unwrap();
    assert_eq!(payload.body, Bytes::from_static(b"thumbnail bytes"));
    assert_eq!(payload.metadata.content_type, "image/png");
    assert_eq!(payload.metadata.length, 15);
    assert_eq!(payload.metadata.e_tag, Some(entity_tag(b"thumbnail bytes")));
    assert!(payload.metadata.last_modified.is_some());
}

#[tokio::test]
async fn test_head_matches_get() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemStore::new(temp_dir.path()).unwrap();
    let key = original().storage_key();

    store
        .put(&key, Bytes::from_static(b"abc"), "image/png")
        .await
        .unwrap();

    let head = store.head(&key).await.unwrap();
    let get = store.get(&key).await.unwrap();
    assert_eq!(head, get.metadata);
}

#[tokio::test]
async fn test_missing_object_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemStore::new(temp_dir.path()).unwrap();
    let key = original().storage_key();

    assert!(store.get(&key).await.unwrap_err().is_not_found());
    assert!(store.head(&key).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_directory_at_key_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemStore::new(temp_dir.path()).unwrap();
    std::fs::create_dir_all(temp_dir.path().join("metawiki/a/a0/foo.png")).unwrap();

    let err = store.head(&original().storage_key()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_object_without_sidecar() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemStore::new(temp_dir.path()).unwrap();

    // Placed by an operator rather than through the store
    let dir = temp_dir.path().join("metawiki/a/a0");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("foo.png"), b"raw").unwrap();

    let metadata = store.head(&original().storage_key()).await.unwrap();
    assert_eq!(metadata.content_type, "image/png");
    assert_eq!(metadata.length, 3);
    assert_eq!(metadata.e_tag, Some(stat_tag(3, metadata.last_modified)));

    let payload = store.get(&original().storage_key()).await.unwrap();
    assert_eq!(payload.metadata, metadata);
    assert_eq!(payload.body, Bytes::from_static(b"raw"));

    // Rewritten in place by the operator
    std::fs::write(dir.join("foo.png"), b"longer raw bytes").unwrap();
    let rewritten = store.head(&original().storage_key()).await.unwrap();
    assert_ne!(rewritten.e_tag, metadata.e_tag);
}

#[tokio::test]
async fn test_overwrite_replaces_object() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemStore::new(temp_dir.path()).unwrap();
    let key = original().storage_key();

    store
        .put(&key, Bytes::from_static(b"first"), "image/png")
        .await
        .unwrap();
    store
        .put(&key, Bytes::from_static(b"second version"), "image/jpeg")
        .await
        .unwrap();

    let payload = store.get(&key).await.unwrap();
    assert_eq!(payload.body, Bytes::from_static(b"second version"));
    assert_eq!(payload.metadata.content_type, "image/jpeg");

    // No temp files left behind
    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path().join("metawiki/a/a0"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_escaping_keys_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemStore::new(temp_dir.path()).unwrap();

    for wiki in ["..", ".meta", "."] {
        let key = ImageLocator::new(wiki, "a", "a0", "foo.png", "latest").storage_key();
        let err = store.head(&key).await.unwrap_err();
        assert!(
            matches!(err.kind(), StorageErrorKind::InvalidKey(_)),
            "{wiki} should be rejected, got {err}"
        );
        let err = store
            .put(&key, Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), StorageErrorKind::InvalidKey(_)));
    }
}

#[test]
fn test_creates_base_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("nested/media");
    let store = FileSystemStore::new(&root).unwrap();
    assert!(root.is_dir());
    assert_eq!(store.base_path(), root.as_path());
}
