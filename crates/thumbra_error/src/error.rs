//! Top-level error wrapper types.

use crate::{CodecError, ConfigError, EngineError, ServerError, StorageError, ValidationError};

/// Every error a Thumbra operation can surface, by concern.
///
/// # Examples
///
/// ```
/// use thumbra_error::{ThumbraError, StorageError, StorageErrorKind};
///
/// let storage = StorageError::new(StorageErrorKind::Transport("connection reset".into()));
/// let err: ThumbraError = storage.into();
/// assert!(format!("{}", err).contains("Storage Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ThumbraErrorKind {
    /// Malformed request locator
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Object store failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Decode/resize/encode failure
    #[from(CodecError)]
    Codec(CodecError),
    /// Resolution engine failure
    #[from(EngineError)]
    Engine(EngineError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// HTTP server error
    #[from(ServerError)]
    Server(ServerError),
}

/// Thumbra error with kind discrimination.
///
/// # Examples
///
/// ```
/// use thumbra_error::{ThumbraResult, ConfigError};
///
/// fn might_fail() -> ThumbraResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Thumbra Error: {}", _0)]
pub struct ThumbraError(Box<ThumbraErrorKind>);

impl ThumbraError {
    /// Create a new error from a kind.
    pub fn new(kind: ThumbraErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ThumbraErrorKind {
        &self.0
    }

    /// Whether the caller sent a malformed request.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), ThumbraErrorKind::Validation(_))
    }

    /// Whether the store reported the object as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), ThumbraErrorKind::Storage(e) if e.is_not_found())
    }
}

// Generic From implementation for any type that converts to ThumbraErrorKind
impl<T> From<T> for ThumbraError
where
    T: Into<ThumbraErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Thumbra operations.
pub type ThumbraResult<T> = std::result::Result<T, ThumbraError>;
