//! # roimesh-render
//!
//! CPU renderer for label meshes.
//!
//! - [`camera`] - pose, projection, fitting, orbit and zoom
//! - [`view`] - the named view presets
//! - [`light`] - the fixed three-light rig and per-style materials
//! - [`raster`] - triangle rasterization with depth test, edges and triad
//! - [`renderer`] - [`SceneRenderer`], the stateful front end
//!
//! # Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use roimesh_core::{Label, Style, Vec3, ViewPreset};
//! use roimesh_mesh::{LabelMesh, TriMesh};
//! use roimesh_render::{RenderOptions, SceneRenderer};
//!
//! let tri = TriMesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 2]]);
//! let meshes = [LabelMesh { label: Label(1.0), mesh: Arc::new(tri) }];
//! let mut renderer = SceneRenderer::with_options(RenderOptions { width: 64, height: 48, ..Default::default() });
//! let frame = renderer.render(&meshes, &HashMap::new(), Style::Shaded3d, false, ViewPreset::Top);
//! assert_eq!(frame.width(), 64);
//! ```

#![warn(missing_docs)]

pub mod camera;
pub mod error;
pub mod framebuffer;
pub mod light;
pub mod raster;
pub mod renderer;
pub mod scene;
pub mod view;

pub use camera::{Camera, Projection, VIEW_ANGLE_DEG};
pub use error::{RenderError, RenderResult};
pub use framebuffer::Framebuffer;
pub use light::{Light, Material, THREE_POINT};
pub use raster::{EDGE_COLOR, Rasterizer, SUPERSAMPLE, SoftwareRasterizer};
pub use renderer::{MAX_VIEWPORT, SceneRenderer};
pub use scene::{RenderOptions, Scene, SceneItem};
pub use view::{CameraPose, VIEW_DISTANCE_FACTOR, ViewSetup, apply_view, camera_for, camera_for_name};
