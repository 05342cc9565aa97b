//! Error types for roimesh-core.
//!
//! # Usage
//!
//! ```rust
//! use roimesh_core::{Error, Result, Volume, Vec3};
//!
//! fn checked(dims: [usize; 3]) -> Result<Volume> {
//!     Volume::zeros(dims, Vec3::ONE, Vec3::ZERO)
//! }
//!
//! assert!(matches!(checked([0, 4, 4]), Err(Error::InvalidDimensions { .. })));
//! ```
//!
//! # Used By
//!
//! - `roimesh-io` - Wraps core errors raised while building volumes
//! - `roimesh-cli` - Color and view parsing for flags

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing or parsing core types.
#[derive(Debug, Error)]
pub enum Error {
    /// A volume axis has zero length.
    #[error("Invalid volume dimensions: {nx}x{ny}x{nz}")]
    InvalidDimensions {
        /// Samples along X.
        nx: usize,
        /// Samples along Y.
        ny: usize,
        /// Samples along Z.
        nz: usize,
    },

    /// Voxel buffer does not match the declared dimensions.
    #[error("Voxel data length mismatch: expected {expected}, got {actual}")]
    DataLengthMismatch {
        /// `nx * ny * nz`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// Spacing is zero, negative or not finite.
    #[error("Invalid voxel spacing: {0:?}")]
    InvalidSpacing([f32; 3]),

    /// A color string could not be parsed.
    #[error("Invalid color '{0}': expected #RRGGBB, #RGB or a color name")]
    InvalidColor(String),

    /// A label string is not a non-zero integer.
    #[error("Invalid label '{0}': expected a non-zero integer")]
    InvalidLabel(String),

    /// A style or view name is not recognized.
    #[error("Unknown {kind} '{name}'; expected one of: {expected}")]
    UnknownName {
        /// What was being parsed ("style", "view").
        kind: &'static str,
        /// The rejected input.
        name: String,
        /// Comma-separated accepted names.
        expected: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_input() {
        let err = Error::InvalidColor("#12".into());
        assert!(err.to_string().contains("#12"));

        let err = Error::DataLengthMismatch { expected: 8, actual: 7 };
        assert_eq!(err.to_string(), "Voxel data length mismatch: expected 8, got 7");
    }
}
