//! Error types for the penflow engine

use thiserror::Error;

/// Result type alias using PenflowError
pub type Result<T> = std::result::Result<T, PenflowError>;

/// Errors that can occur in the penflow engine
#[derive(Debug, Error)]
pub enum PenflowError {
    /// Node evaluation failed
    #[error("Node execution failed: {0}")]
    ExecutionFailed(String),

    /// Sandboxed script failed to compile, run, or validate
    #[error("Script error: {0}")]
    Script(String),

    /// Image `src` is not a usable data URL
    #[error("Invalid image data URL: {0}")]
    InvalidDataUrl(String),

    /// Raster payload could not be decoded
    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression error
    #[error("Compression error: {0}")]
    Compression(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PenflowError {
    /// Create an execution failed error with a message
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Create a script error with a message
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }
}
