//! Request validation error types.

/// One variant per structural rule a locator can violate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Wiki segment is empty
    #[display("invalid wiki name")]
    EmptyWiki,
    /// First hash bucket is absent or longer than one character
    #[display("invalid hash structure: first bucket '{}' must be exactly one character", _0)]
    InvalidPrimaryBucket(String),
    /// Second hash bucket is absent or not two to three characters long
    #[display("invalid hash structure: second bucket '{}' must be two or three characters", _0)]
    InvalidSecondaryBucket(String),
    /// Second hash bucket does not extend the first
    #[display("invalid hash structure: '{}' is not prefixed by '{}'", secondary, primary)]
    BucketPrefixMismatch {
        /// First hash bucket
        primary: String,
        /// Second hash bucket
        secondary: String,
    },
    /// Filename segment is empty
    #[display("invalid file name")]
    EmptyFilename,
    /// Revision segment is empty
    #[display("invalid revision")]
    EmptyRevision,
    /// Width segment is empty
    #[display("invalid width: width is required")]
    EmptyWidth,
    /// A segment contains `/` or `\`
    #[display("invalid {}: path separators are not allowed", field)]
    SeparatorInSegment {
        /// Name of the offending segment
        field: &'static str,
    },
    /// Width segment is not a positive integer
    #[display("invalid width: '{}' is not a positive integer", _0)]
    NonNumericWidth(String),
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use thumbra_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::EmptyFilename);
/// assert_eq!(err.kind(), &ValidationErrorKind::EmptyFilename);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The violated rule
    pub kind: ValidationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
}

/// Result type for locator validation.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
