//! Resolution engine error types.

/// Error kinds raised by the resolution engine itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum EngineErrorKind {
    /// Background generation task panicked or was cancelled
    #[display("Generation task failed: {}", _0)]
    TaskFailed(String),

    /// Another request's generation of the same key failed
    #[display("Concurrent generation failed for {}", _0)]
    GenerationFailed(String),
}

/// Engine error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Engine Error: {} at line {} in {}", kind, line, file)]
pub struct EngineError {
    /// The error kind
    pub kind: EngineErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl EngineError {
    /// Create a new EngineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: EngineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &EngineErrorKind {
        &self.kind
    }
}
