//! Error types for the image resizer.
//!
//! Provides a single error enum using `thiserror` so that every failure can be
//! scoped to one image (or to the archive) and reported upward as data.

use std::io;
use thiserror::Error;
use serde::Serialize;

/// Main error type for the resizer.
///
/// Errors are serializable so they can travel inside [`crate::core::BatchEvent`]s.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum ResizerError {
    /// Input bytes are not a supported raster format, or are truncated/corrupt
    #[error("Decode error: {0}")]
    Decode(String),

    /// Target size has a zero dimension or exceeds the size limits
    #[error("Invalid size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// Archive construction failed
    #[error("Packaging error: {0}")]
    Packaging(String),

    /// Re-encoding a resized raster failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Format was detected but cannot be written back
    #[error("Format error: {0}")]
    Format(String),

    /// Operation is not valid in the current state
    #[error("State error: {0}")]
    State(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Malformed shell command
    #[error("Usage: {0}")]
    Usage(String),

    /// Background task panicked or was cancelled
    #[error("Processing error: {0}")]
    Processing(String),
}

/// Convenience result type for resizer operations.
pub type ResizerResult<T> = Result<T, ResizerError>;

// Helper methods for error creation
impl ResizerError {
    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub fn invalid_size(width: u32, height: u32) -> Self {
        Self::InvalidSize { width, height }
    }

    pub fn packaging<T: Into<String>>(msg: T) -> Self {
        Self::Packaging(msg.into())
    }

    pub fn format<T: Into<String>>(msg: T) -> Self {
        Self::Format(msg.into())
    }

    pub fn state<T: Into<String>>(msg: T) -> Self {
        Self::State(msg.into())
    }

    pub fn usage<T: Into<String>>(msg: T) -> Self {
        Self::Usage(msg.into())
    }
}

// Convert std::io::Error to ResizerError
impl From<io::Error> for ResizerError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<image::ImageError> for ResizerError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => Self::Encode(e.to_string()),
            image::ImageError::Unsupported(e) => Self::Format(e.to_string()),
            image::ImageError::IoError(e) => Self::IO(e.to_string()),
            other => Self::Decode(other.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for ResizerError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Packaging(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ResizerError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            Self::Processing("Task cancelled".to_string())
        } else {
            Self::Processing(format!("Task panicked: {err}"))
        }
    }
}
