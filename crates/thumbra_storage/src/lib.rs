//! Object store gateway for the Thumbra media server.
//!
//! This crate provides the narrow capability interface the resolution engine
//! consumes (`get`, `head`, `put`) and the backends behind it. Every backend
//! translates its own failures into the closed [`StorageErrorKind`] set, so
//! callers never see an SDK error type.
//!
//! # Backends
//!
//! - **[`MemoryStore`]**: process-local map, for tests and ephemeral deployments
//! - **[`FileSystemStore`]**: objects laid out on disk under their keys
//! - **`S3Store`**: S3 or any S3-compatible service (feature `s3`)
//!
//! [`StoreGateway`] wraps any backend and bounds each call with a timeout.
//!
//! # Example
//!
//! ```rust
//! use bytes::Bytes;
//! use thumbra_core::ImageLocator;
//! use thumbra_storage::{MemoryStore, ObjectStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! let key = ImageLocator::new("metawiki", "a", "a0", "foo.png", "latest").storage_key();
//!
//! store.put(&key, Bytes::from_static(b"png bytes"), "image/png").await?;
//! let metadata = store.head(&key).await?;
//! assert_eq!(metadata.content_type, "image/png");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod digest;
mod filesystem;
mod gateway;
mod memory;
#[cfg(feature = "s3")]
mod s3;
mod store;

pub use digest::{entity_tag, stat_tag};
pub use filesystem::FileSystemStore;
pub use gateway::{StoreGateway, StoreTimeouts};
pub use memory::MemoryStore;
#[cfg(feature = "s3")]
pub use s3::{S3Settings, S3Store};
pub use store::ObjectStore;
pub use thumbra_error::{StorageError, StorageErrorKind, StorageResult};
