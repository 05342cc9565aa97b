//! Error types for color resolution.

use thiserror::Error;

/// Color operation error.
#[derive(Debug, Error)]
pub enum ColorError {
    /// No colormap with this name.
    #[error("unknown colormap '{name}' (supported: {supported})")]
    UnknownColormap {
        /// Requested name.
        name: String,
        /// Comma-separated list of valid names.
        supported: String,
    },

    /// Range bounds that cannot normalize values.
    #[error("invalid colormap range [{min}, {max}]")]
    InvalidRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Colormap coloring was requested without a value table.
    #[error("no ROI values loaded")]
    NoValues,

    /// Color parse error.
    #[error(transparent)]
    Core(#[from] roimesh_core::Error),
}

/// Result type for color operations.
pub type ColorResult<T> = Result<T, ColorError>;
