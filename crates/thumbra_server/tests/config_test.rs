//! Layered configuration loading.

use std::io::Write;
use thumbra_server::{StorageBackend, ThumbraConfig};

fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[test]
fn test_bundled_defaults_load() {
    let config = ThumbraConfig::load_with_env(None, env(&[])).unwrap();
    assert_eq!(config.server().port(), &8080);
    assert_eq!(config.storage().backend(), &StorageBackend::Filesystem);
    assert_eq!(config.storage().head_timeout_secs(), &5);
    assert_eq!(config.s3().region(), "us-east-1");
}

#[test]
fn test_env_overrides_apply() {
    let config = ThumbraConfig::load_with_env(
        None,
        env(&[
            ("THUMBRA__SERVER__PORT", "9191"),
            ("THUMBRA__STORAGE__BACKEND", "memory"),
            ("THUMBRA__LOGGING__JSON", "true"),
        ]),
    )
    .unwrap();
    assert_eq!(config.server().port(), &9191);
    assert_eq!(config.storage().backend(), &StorageBackend::Memory);
    assert!(config.logging().json());
}

#[test]
fn test_env_beats_explicit_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[engine]\njpeg_quality = 70\n\n[server]\nport = 7000").unwrap();

    let config = ThumbraConfig::load_with_env(
        Some(file.path()),
        env(&[("THUMBRA__SERVER__PORT", "7100")]),
    )
    .unwrap();
    assert_eq!(config.engine().jpeg_quality(), &70);
    assert_eq!(config.server().port(), &7100);
}

#[test]
fn test_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(ThumbraConfig::load_with_env(Some(&missing), env(&[])).is_err());
}

#[test]
fn test_s3_with_empty_bucket_fails_validation() {
    let err = ThumbraConfig::load_with_env(None, env(&[("THUMBRA__STORAGE__BACKEND", "s3")]))
        .unwrap_err();
    assert!(err.to_string().contains("s3.bucket"));

    let config = ThumbraConfig::load_with_env(
        None,
        env(&[
            ("THUMBRA__STORAGE__BACKEND", "s3"),
            ("THUMBRA__S3__BUCKET", "media"),
        ]),
    )
    .unwrap();
    assert_eq!(config.s3().bucket(), "media");
}
