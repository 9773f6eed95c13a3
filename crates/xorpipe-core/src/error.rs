//! Error types for xorpipe core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to exit codes and user-facing messages.

use thiserror::Error;

/// Result type alias for xorpipe operations.
pub type Result<T> = std::result::Result<T, XorError>;

/// Core error type for xorpipe operations.
#[derive(Debug, Error)]
pub enum XorError {
    /// Malformed or unusable configuration (bad key escape, empty key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Underlying stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stage does not implement the requested operation
    #[error("{stage} stage does not support {operation}")]
    Unsupported {
        stage: &'static str,
        operation: &'static str,
    },

    /// Operation on a chain with no stage left to delegate to
    #[error("Stream is closed")]
    Closed,
}

impl XorError {
    /// Create an `Unsupported` error for `operation` on `stage`.
    pub fn unsupported(stage: &'static str, operation: &'static str) -> Self {
        XorError::Unsupported { stage, operation }
    }
}

impl From<XorError> for std::io::Error {
    fn from(err: XorError) -> Self {
        match err {
            XorError::Io(inner) => inner,
            XorError::Config(_) => std::io::Error::new(std::io::ErrorKind::InvalidInput, err),
            XorError::Unsupported { .. } => {
                std::io::Error::new(std::io::ErrorKind::Unsupported, err)
            }
            XorError::Closed => std::io::Error::new(std::io::ErrorKind::BrokenPipe, err),
        }
    }
}
