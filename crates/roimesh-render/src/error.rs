//! Error types for rendering.

use thiserror::Error;

/// Rendering error.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Viewport with a zero or oversized side.
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// Writing an image failed.
    #[error(transparent)]
    Io(#[from] roimesh_io::IoError),
}

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;
