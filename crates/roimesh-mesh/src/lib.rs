//! # roimesh-mesh
//!
//! Turns a labeled [`Volume`](roimesh_core::Volume) into one triangle surface
//! per label.
//!
//! Per label the pipeline is:
//!
//! ```text
//! mask (voxel == label) -> Gaussian blur (sigma) -> marching cubes @ 0.5 -> Laplacian relaxation
//! ```
//!
//! The two geometry steps sit behind traits so other implementations can be
//! swapped in:
//!
//! - [`Isosurfacer`] - scalar field to triangle mesh ([`MarchingCubes`])
//! - [`MeshSmoother`] - mesh relaxation ([`LaplacianSmoother`])
//!
//! # Example
//!
//! ```rust
//! use roimesh_core::{Label, Vec3, Volume};
//! use roimesh_mesh::{ExtractParams, LabelMeshExtractor};
//!
//! let vol = Volume::from_fn([12, 12, 12], Vec3::ONE, Vec3::ZERO, |x, y, z| {
//!     let inside = (3..9).contains(&x) && (3..9).contains(&y) && (3..9).contains(&z);
//!     if inside { 2.0 } else { 0.0 }
//! })?;
//! let meshes = <LabelMeshExtractor>::default().extract(&vol, &[Label(2.0), Label(9.0)], &ExtractParams::default())?;
//! assert_eq!(meshes.len(), 1);
//! assert_eq!(meshes[0].label, Label(2.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` - Run Gaussian filter passes on the rayon thread pool

#![warn(missing_docs)]

pub mod error;
pub mod extract;
pub mod filter;
pub mod marching;
pub mod mesh;
pub mod smooth;
mod tables;

pub use error::{MeshError, MeshResult};
pub use extract::{ExtractParams, LabelMesh, LabelMeshExtractor};
pub use filter::gaussian_filter;
pub use marching::{Isosurfacer, MarchingCubes};
pub use mesh::TriMesh;
pub use smooth::{LaplacianSmoother, MeshSmoother};
