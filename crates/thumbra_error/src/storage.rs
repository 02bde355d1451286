//! Object store error types.

/// Kinds of object store errors.
///
/// This is the closed set every store adapter translates its SDK errors into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Object absent at the given key
    #[display("Object not found: {}", _0)]
    NotFound(String),
    /// Store call exceeded its time bound
    #[display("Store operation timed out: {}", _0)]
    Timeout(String),
    /// Network or connection failure talking to the store
    #[display("Store transport failure: {}", _0)]
    Transport(String),
    /// Store answered with an unexpected error
    #[display("Store backend error: {}", _0)]
    Backend(String),
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Key cannot be mapped onto this backend
    #[display("Invalid storage key: {}", _0)]
    InvalidKey(String),
    /// Invalid storage configuration
    #[display("Invalid configuration: {}", _0)]
    InvalidConfig(String),
}

/// Object store error with location tracking.
///
/// # Examples
///
/// ```
/// use thumbra_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("metawiki/a/a0/foo.png".to_string()));
/// assert!(err.is_not_found());
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }

    /// Whether the store reported the object as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, StorageErrorKind::NotFound(_))
    }
}

/// Result type for object store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
