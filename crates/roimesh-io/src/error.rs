//! Error types for I/O operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Structurally valid file using a feature we do not read.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid or corrupted file.
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Decoded data could not form a volume.
    #[error(transparent)]
    Core(#[from] roimesh_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
