//! Image codec error types.

/// Kinds of codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CodecErrorKind {
    /// Extension is not a decodable/encodable raster format
    #[display("Unsupported image format: {}", _0)]
    UnsupportedFormat(String),
    /// Failed to decode source bytes
    #[display("Failed to decode image: {}", _0)]
    Decode(String),
    /// Failed to encode the resized image
    #[display("Failed to encode image: {}", _0)]
    Encode(String),
    /// Requested width is not a positive integer
    #[display("Invalid width: {}", _0)]
    InvalidWidth(String),
    /// Requested width exceeds the original's pixel width
    #[display("Requested width {} exceeds original width {}", requested, original)]
    WidthTooLarge {
        /// Width asked for
        requested: u32,
        /// Width of the decoded original
        original: u32,
    },
    /// Scratch buffer could not be written or read back
    #[display("Scratch buffer failure: {}", _0)]
    Scratch(String),
}

/// Codec error with location tracking.
///
/// # Examples
///
/// ```
/// use thumbra_error::{CodecError, CodecErrorKind};
///
/// let err = CodecError::new(CodecErrorKind::WidthTooLarge { requested: 400, original: 200 });
/// assert!(err.is_width_too_large());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Codec Error: {} at line {} in {}", kind, line, file)]
pub struct CodecError {
    /// The kind of error that occurred
    pub kind: CodecErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CodecError {
    /// Create a new codec error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CodecErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CodecErrorKind {
        &self.kind
    }

    /// Whether this is the recoverable width-too-large condition.
    pub fn is_width_too_large(&self) -> bool {
        matches!(self.kind, CodecErrorKind::WidthTooLarge { .. })
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
