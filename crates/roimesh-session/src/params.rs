//! Render parameters edited by the user.

use roimesh_core::{Style, ViewPreset};
use roimesh_mesh::{ExtractParams, MeshResult};

/// Iso-value used for mask surfaces.
pub const MASK_THRESHOLD: f32 = 0.5;

/// Everything that shapes a render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderParams {
    /// Gaussian blur width before surfacing.
    pub sigma: f32,
    /// Relaxation passes after surfacing.
    pub smooth_iter: usize,
    /// Relaxation factor.
    pub smooth_relax: f32,
    /// Shaded or flat rendering.
    pub style: Style,
    /// Edge overlay request.
    pub show_edges: bool,
    /// Camera preset.
    pub view: ViewPreset,
}

impl Default for RenderParams {
    /// Interactive defaults: the left view and the gentler blur.
    fn default() -> Self {
        let extract = ExtractParams::default();
        Self {
            sigma: extract.sigma,
            smooth_iter: extract.smooth_iter,
            smooth_relax: extract.smooth_relax,
            style: Style::Shaded3d,
            show_edges: false,
            view: ViewPreset::Left,
        }
    }
}

impl RenderParams {
    /// Extraction settings at the mask threshold.
    pub fn extract_params(&self) -> ExtractParams {
        ExtractParams {
            sigma: self.sigma,
            smooth_iter: self.smooth_iter,
            smooth_relax: self.smooth_relax,
            threshold: MASK_THRESHOLD,
        }
    }

    /// Checks the extraction settings.
    pub fn validate(&self) -> MeshResult<()> {
        self.extract_params().validate()
    }
}
