//! Scene contents and output options.

use std::sync::Arc;

use roimesh_core::{Bounds, Label, Rgb, Style};
use roimesh_mesh::TriMesh;

use crate::light::{Light, Material, THREE_POINT};

/// One colored surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    /// Region the surface belongs to.
    pub label: Label,
    /// Geometry in world coordinates.
    pub mesh: Arc<TriMesh>,
    /// Base color.
    pub color: Rgb,
}

/// Everything drawn in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Surfaces in draw order.
    pub items: Vec<SceneItem>,
    /// Rendering style.
    pub style: Style,
    /// Edge overlay request; only honored by the shaded style.
    pub show_edges: bool,
    /// Lights, in world space.
    pub lights: Vec<Light>,
    /// Material of the shaded style.
    pub shaded: Material,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Style::default(), false)
    }
}

impl Scene {
    /// Empty scene with the three-point rig installed.
    pub fn new(style: Style, show_edges: bool) -> Self {
        Self {
            items: Vec::new(),
            style,
            show_edges,
            lights: THREE_POINT.to_vec(),
            shaded: Material::SHADED,
        }
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Union of all item bounds.
    pub fn bounds(&self) -> Bounds {
        self.items
            .iter()
            .fold(Bounds::EMPTY, |b, item| b.union(item.mesh.bounds()))
    }

    /// Surface material for the style.
    pub fn material(&self) -> Material {
        match self.style {
            Style::Shaded3d => self.shaded,
            Style::Flat2d => Material::FLAT,
        }
    }

    /// Whether edges are drawn. The flat style never draws them.
    pub fn edges_visible(&self) -> bool {
        self.show_edges && !self.style.is_flat()
    }
}

/// Output image settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Clear color.
    pub background: Rgb,
    /// Draw the orientation triad in the lower-left corner.
    pub show_axes: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            background: Rgb::WHITE,
            show_axes: false,
        }
    }
}

impl RenderOptions {
    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
