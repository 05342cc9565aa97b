//! # roimesh-color
//!
//! Label coloring for roimesh scenes.
//!
//! - [`palette`] - the 8-entry categorical palette and the neutral fallback
//! - [`colormap`] - 26 named continuous colormaps with colorbar sampling
//! - [`range`] - value normalization, explicit or auto-derived
//! - [`resolver`] - the per-label color state machine
//!
//! The palette and the colormap tables are read-only process-wide data; the
//! colormap lookup tables are built once on first use.
//!
//! # Usage
//!
//! ```rust
//! use roimesh_color::{Colormap, ColormapRange};
//!
//! let range = ColormapRange::new(0.0, 10.0)?;
//! let color = Colormap::by_name("coolwarm")?.sample(range.normalize(5.0));
//! assert!(color.r > 200 && color.g > 200);
//! # Ok::<(), roimesh_color::ColorError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `serde` - Serialize [`ColorMode`] and [`ColormapRange`]

#![warn(missing_docs)]

pub mod colormap;
pub mod error;
pub mod palette;
pub mod range;
pub mod resolver;

pub use colormap::{Colormap, ColormapKind, DEFAULT_COLORMAP, colormap_names};
pub use error::{ColorError, ColorResult};
pub use palette::{NEUTRAL, PALETTE, palette_color};
pub use range::ColormapRange;
pub use resolver::{ColorMode, ColorResolver};
