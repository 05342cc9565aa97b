//! Error types for mesh extraction.

use thiserror::Error;

/// Error type for mesh extraction.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A derived field could not form a volume.
    #[error(transparent)]
    Core(#[from] roimesh_core::Error),
}

/// Result type for mesh extraction.
pub type MeshResult<T> = Result<T, MeshError>;
