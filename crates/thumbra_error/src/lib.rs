//! Error types for the Thumbra media server.
//!
//! This crate provides the error taxonomy shared by every Thumbra crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! The top-level [`ThumbraError`] lifts any concern-specific error with `?`.
//!
//! # Examples
//!
//! ```
//! use thumbra_error::{ThumbraResult, ValidationError, ValidationErrorKind};
//!
//! fn check_wiki(wiki: &str) -> ThumbraResult<()> {
//!     if wiki.is_empty() {
//!         Err(ValidationError::new(ValidationErrorKind::EmptyWiki))?
//!     }
//!     Ok(())
//! }
//!
//! let err = check_wiki("").unwrap_err();
//! assert!(err.is_validation());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod config;
mod engine;
mod error;
mod server;
mod storage;
mod validation;

pub use codec::{CodecError, CodecErrorKind, CodecResult};
pub use config::ConfigError;
pub use engine::{EngineError, EngineErrorKind};
pub use error::{ThumbraError, ThumbraErrorKind, ThumbraResult};
pub use server::{ServerError, ServerErrorKind};
pub use storage::{StorageError, StorageErrorKind, StorageResult};
pub use validation::{ValidationError, ValidationErrorKind, ValidationResult};
