//! Error types and handling.

use thiserror::Error;

use crate::wms::CodecError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Command encoding or status decoding failed
    #[error("Protocol error: {0}")]
    Codec(#[from] CodecError),

    /// TCP connection failed or dropped
    #[error("TCP connection failed: {0}")]
    TcpConnectionFailed(String),

    /// Controller did not answer in time
    #[error("Device timeout: {0}")]
    DeviceTimeout(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a config error with message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error with message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the failure happened on the transport rather than in the codec.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TcpConnectionFailed(_) | Self::DeviceTimeout(_))
    }
}
