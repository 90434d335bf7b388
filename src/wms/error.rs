//! WMS codec error types.

use thiserror::Error;

/// Errors raised while encoding commands or decoding status responses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Aisle/target id does not fit in a single wire byte.
    #[error("Invalid aisle {0}: must be between 0 and 255")]
    InvalidAisle(i32),

    /// Status response has the wrong length.
    #[error("Malformed response: expected {expected} bytes, got {actual}")]
    MalformedResponse { expected: usize, actual: usize },
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
