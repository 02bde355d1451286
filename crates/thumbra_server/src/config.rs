//! Layered server configuration.
//!
//! Sources, lowest precedence first:
//! - Bundled defaults (include_str! from thumbra.toml)
//! - `./thumbra.toml`, if present
//! - An explicit file passed with `--config`
//! - `THUMBRA__<SECTION>__<KEY>` environment variables

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thumbra_codec::{CodecSettings, CodecSettingsBuilder};
use thumbra_error::{ConfigError, ThumbraError, ThumbraResult};
use thumbra_storage::StoreTimeouts;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../thumbra.toml");

/// Environment variable prefix.
const ENV_PREFIX: &str = "THUMBRA";

/// Which object store backs the server.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local, lost on restart
    Memory,
    /// Objects on local disk under `storage.root`
    Filesystem,
    /// An S3 bucket, configured under `[s3]`
    S3,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, derive_getters::Getters)]
pub struct ServerConfig {
    /// Interface to bind
    host: String,
    /// Port to bind
    port: u16,
    /// Seconds allowed for reading a request
    read_timeout: u64,
    /// Seconds allowed for writing a response
    write_timeout: u64,
}

impl ServerConfig {
    /// Bound on processing a single request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout + self.write_timeout)
    }

    /// `host:port` to listen on.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, derive_getters::Getters)]
pub struct StorageConfig {
    /// Selected backend
    backend: StorageBackend,
    /// Root directory for the filesystem backend
    root: PathBuf,
    /// Seconds allowed for a full object fetch
    get_timeout_secs: u64,
    /// Seconds allowed for a metadata probe
    head_timeout_secs: u64,
    /// Seconds allowed for an upload
    put_timeout_secs: u64,
}

impl StorageConfig {
    /// Gateway time bounds.
    pub fn timeouts(&self) -> StoreTimeouts {
        StoreTimeouts::new(
            Duration::from_secs(self.get_timeout_secs),
            Duration::from_secs(self.head_timeout_secs),
            Duration::from_secs(self.put_timeout_secs),
        )
    }
}

/// `[s3]` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct S3Config {
    /// AWS region
    region: String,
    /// Bucket holding media
    bucket: String,
    /// Static access key id
    access_key: String,
    /// Static secret access key
    secret_key: String,
    /// Custom endpoint for S3-compatible stores
    endpoint: Option<String>,
    /// Path-style bucket addressing
    force_path_style: bool,
}

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, derive_getters::Getters)]
pub struct EngineConfig {
    /// JPEG encode quality, 1 to 100
    jpeg_quality: u8,
    /// Bytes of encoded output kept in memory before spilling to disk
    scratch_memory_limit: usize,
    /// Replacement for the built-in placeholder image
    #[serde(default)]
    placeholder_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Codec settings derived from this section.
    ///
    /// # Errors
    ///
    /// Returns error if the JPEG quality is out of range.
    pub fn codec_settings(&self) -> Result<CodecSettings, ConfigError> {
        CodecSettingsBuilder::default()
            .jpeg_quality(self.jpeg_quality)
            .scratch_memory_limit(self.scratch_memory_limit)
            .build()
            .map_err(|e| ConfigError::new(format!("engine: {}", e)))
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, derive_getters::Getters)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    level: String,
    /// Emit JSON lines instead of human-readable text
    json: bool,
}

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, derive_getters::Getters)]
pub struct ThumbraConfig {
    /// HTTP listener settings
    server: ServerConfig,
    /// Object store selection and time bounds
    storage: StorageConfig,
    /// S3 connection settings
    #[serde(default)]
    s3: S3Config,
    /// Generation settings
    engine: EngineConfig,
    /// Log output settings
    logging: LoggingConfig,
}

impl ThumbraConfig {
    /// Load configuration from every layer, reading the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if a file cannot be parsed, `explicit` does not exist,
    /// or the merged result fails validation.
    #[instrument(skip(explicit), fields(explicit = ?explicit))]
    pub fn load(explicit: Option<&Path>) -> ThumbraResult<Self> {
        Self::load_with_env(explicit, None)
    }

    /// Load configuration with `env` standing in for the process environment.
    ///
    /// Keys in `env` use the same `THUMBRA__SECTION__KEY` form.
    ///
    /// # Errors
    ///
    /// Same as [`ThumbraConfig::load`].
    pub fn load_with_env(
        explicit: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> ThumbraResult<Self> {
        debug!(
            "Loading configuration with precedence: env > --config > ./thumbra.toml > bundled defaults"
        );

        let mut builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::new("thumbra.toml", FileFormat::Toml).required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let loaded: Self = builder
            .build()
            .map_err(|e| {
                ThumbraError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ThumbraError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Bundled defaults overlaid with a TOML document.
    ///
    /// # Errors
    ///
    /// Returns error if `toml` does not parse or the result fails validation.
    pub fn from_toml(toml: &str) -> ThumbraResult<Self> {
        let loaded: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| {
                ThumbraError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Replace the listening port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    /// Check cross-field constraints the types cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::S3 && self.s3.bucket.trim().is_empty() {
            return Err(ConfigError::new(
                "s3.bucket must be set when storage.backend = \"s3\"",
            ));
        }

        let timeouts = [
            ("storage.get_timeout_secs", self.storage.get_timeout_secs),
            ("storage.head_timeout_secs", self.storage.head_timeout_secs),
            ("storage.put_timeout_secs", self.storage.put_timeout_secs),
            ("server.read_timeout", self.server.read_timeout),
            ("server.write_timeout", self.server.write_timeout),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(ConfigError::new(format!("{} must be greater than zero", name)));
        }

        self.engine.codec_settings()?;
        Ok(())
    }
}
