//! Wiring configuration into a running server.

use crate::config::{StorageBackend, ThumbraConfig};
use crate::routes::{AppState, create_router};
use std::sync::Arc;
use thumbra_codec::ImageCodec;
use thumbra_engine::{Engine, Placeholder};
use thumbra_error::{ServerError, ServerErrorKind, ThumbraResult};
use thumbra_storage::{FileSystemStore, MemoryStore, ObjectStore, StoreGateway};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Build the configured backend, wrapped in its time-bounded gateway.
///
/// # Errors
///
/// Returns error if the backend cannot be initialised or is not compiled in.
#[tracing::instrument(skip(config), fields(backend = %config.storage().backend()))]
pub async fn build_store(config: &ThumbraConfig) -> ThumbraResult<Arc<dyn ObjectStore>> {
    let storage = config.storage();
    let backend: Arc<dyn ObjectStore> = match storage.backend() {
        StorageBackend::Memory => {
            warn!("Using in-memory store; objects are lost on restart");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Filesystem => {
            info!(root = %storage.root().display(), "Using filesystem store");
            Arc::new(FileSystemStore::new(storage.root().clone())?)
        }
        StorageBackend::S3 => s3_backend(config).await?,
    };

    Ok(Arc::new(StoreGateway::new(backend, storage.timeouts())))
}

#[cfg(feature = "s3")]
async fn s3_backend(config: &ThumbraConfig) -> ThumbraResult<Arc<dyn ObjectStore>> {
    use thumbra_storage::{S3Settings, S3Store};

    let s3 = config.s3();
    let mut settings = S3Settings::new(s3.region(), s3.bucket(), s3.access_key(), s3.secret_key())
        .with_force_path_style(*s3.force_path_style());
    if let Some(endpoint) = s3.endpoint() {
        settings = settings.with_endpoint(endpoint);
    }

    info!(bucket = %s3.bucket(), region = %s3.region(), "Using S3 store");
    Ok(Arc::new(S3Store::connect(&settings).await?))
}

#[cfg(not(feature = "s3"))]
async fn s3_backend(_config: &ThumbraConfig) -> ThumbraResult<Arc<dyn ObjectStore>> {
    Err(thumbra_error::ConfigError::new("storage.backend = \"s3\" requires the s3 feature").into())
}

/// Assemble the engine: store, codec, and placeholder.
///
/// # Errors
///
/// Returns error if the store cannot be built or the placeholder cannot be
/// read or rendered.
pub async fn build_engine(config: &ThumbraConfig) -> ThumbraResult<Engine> {
    let store = build_store(config).await?;
    let codec = ImageCodec::new(config.engine().codec_settings()?);

    let placeholder = match config.engine().placeholder_path() {
        Some(path) => {
            info!(path = %path.display(), "Loading placeholder image");
            Placeholder::from_file(path).await?
        }
        None => Placeholder::builtin()?,
    };

    Ok(Engine::new(store, Arc::new(codec), placeholder))
}

/// Bind, serve, and return once a shutdown signal has drained the server.
///
/// # Errors
///
/// Returns error if wiring fails, the address cannot be bound, or the server
/// loop stops abnormally.
pub async fn run(config: ThumbraConfig) -> ThumbraResult<()> {
    let engine = build_engine(&config).await?;
    let state = AppState::new(engine, config.server().request_timeout());
    let app = create_router(state);

    let addr = config.server().bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Bind(format!("{}: {}", addr, e))))?;

    info!(addr = %addr, "Thumbra listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))?;

    info!("Graceful shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let reason = await_shutdown_trigger().await;
    info!("Shutdown signal received ({})", reason);
}

/// Wait for either Ctrl+C or SIGTERM and return a label for logging.
#[cfg(unix)]
async fn await_shutdown_trigger() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => "ctrl-c",
                _ = sigterm.recv() => "SIGTERM",
            }
        }
        Err(e) => {
            warn!(
                "Failed to install SIGTERM handler: {}; falling back to Ctrl+C only",
                e
            );
            ctrl_c().await
        }
    }
}

#[cfg(not(unix))]
async fn await_shutdown_trigger() -> &'static str {
    ctrl_c().await
}

/// Ctrl+C, or never if the handler cannot be installed.
async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    "ctrl-c"
}
