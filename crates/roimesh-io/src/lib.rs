//! # roimesh-io
//!
//! File formats used by roimesh.
//!
//! - [`nifti`] - NIfTI-1 volumes (`.nii`, `.nii.gz`, `.hdr`/`.img` pairs)
//! - [`values`] - ROI value tables (CSV/TSV with label and value columns)
//! - [`png`] - 8-bit RGB/RGBA PNG files for screenshots
//!
//! # Usage
//!
//! ```rust,ignore
//! use roimesh_io::{nifti, values};
//!
//! let vol = nifti::read_volume("atlas.nii.gz")?;
//! let table = values::read("overlap.csv")?;
//! ```
//!
//! # Dependencies
//!
//! - [`byteorder`] - Endian-aware header and sample decoding
//! - [`flate2`] - Gzip-compressed volumes
//! - [`png`] - Screenshot encoding

#![warn(missing_docs)]

pub mod error;
pub mod nifti;
pub mod png;
pub mod values;

pub use error::{IoError, IoResult};
pub use nifti::{DataType, Nifti, NiftiHeader};
