//! HTTP front end for the Thumbra media server.
//!
//! Routes `GET` requests for originals and thumbnails to the resolution
//! engine and maps each [`Resolution`](thumbra_engine::Resolution) onto a
//! response with the right status, validators and cache lifetime.
//!
//! # Routes
//!
//! - `/{wiki}/{hash1}/{hash2}/{filename}/revision/{revision}`
//! - `/{wiki}/{hash1}/{hash2}/{filename}/revision/{revision}/scale-to-width/{width}`
//! - `/health`
//!
//! # Example
//!
//! ```rust,no_run
//! use thumbra_server::{ThumbraConfig, run};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ThumbraConfig::load(None)?;
//!     run(config).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod headers;
mod observability;
mod response;
mod routes;
mod server;

pub use config::{
    EngineConfig, LoggingConfig, S3Config, ServerConfig, StorageBackend, StorageConfig,
    ThumbraConfig,
};
pub use headers::{BACKEND_HEADER, BACKEND_NAME, backend_header_middleware};
pub use observability::{ObservabilityConfig, init_observability};
pub use response::{
    ApiError, FALLBACK_CACHE, GENERIC_ERROR, LONG_CACHE, ResolvedResponse, internal_error,
};
pub use routes::{AppState, ORIGINAL_ROUTE, OriginalPath, THUMBNAIL_ROUTE, ThumbnailPath, create_router};
pub use server::{build_engine, build_store, run};
