//! # roimesh-core
//!
//! Core types shared by every roimesh crate.
//!
//! - [`Volume`] - Immutable 3D scalar grid with voxel spacing and world origin
//! - [`Label`] - Region identifier: a non-zero sample value of a labeled volume
//! - [`Rgb`] - 8-bit display color with hex parsing and formatting
//! - [`Bounds`] - Axis-aligned world-space box
//! - [`ValueTable`] - Optional per-label scalar values for colormap coloring
//! - [`Style`], [`ViewPreset`] - Presentation choices shared by renderer, session and CLI
//!
//! ## Crate Structure
//!
//! ```text
//! roimesh-core (this crate)
//!    ^
//!    |
//!    +-- roimesh-io (NIfTI, value tables, PNG)
//!    +-- roimesh-mesh (filtering, marching cubes, smoothing)
//!    +-- roimesh-color (palette, colormaps, resolver)
//!    +-- roimesh-render (camera, lights, rasterizer)
//!    +-- roimesh-session (scheduler, controller)
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Serialize [`Style`], [`ViewPreset`], [`Label`] and [`Rgb`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bounds;
pub mod color;
pub mod error;
pub mod label;
pub mod style;
pub mod values;
pub mod volume;

pub use bounds::Bounds;
pub use color::Rgb;
pub use error::{Error, Result};
pub use label::Label;
pub use style::{Style, ViewPreset};
pub use values::ValueTable;
pub use volume::Volume;

/// Re-export of the vector type used for world-space positions.
pub use glam::Vec3;

/// Prelude module for convenient imports.
///
/// ```
/// use roimesh_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bounds::Bounds;
    pub use crate::color::Rgb;
    pub use crate::error::{Error, Result};
    pub use crate::label::Label;
    pub use crate::style::{Style, ViewPreset};
    pub use crate::values::ValueTable;
    pub use crate::volume::Volume;
    pub use glam::Vec3;
}
