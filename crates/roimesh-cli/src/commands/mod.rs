//! CLI command implementations

pub mod demo;
pub mod gui;
pub mod info;
pub mod multi;
pub mod render;
pub mod script;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use roimesh_core::{Label, Rgb, Style, ViewPreset, Volume};
use roimesh_mesh::{ExtractParams, LabelMesh};
use roimesh_render::{Material, RenderOptions, SceneRenderer};
use tracing::{debug, info};

use crate::{OutputArgs, SurfaceArgs};

/// Load a volume from path
pub fn load_volume(path: &Path) -> Result<Volume> {
    roimesh_io::nifti::read_volume(path)
        .with_context(|| format!("Failed to load: {}", path.display()))
}

/// Parse `WxH`
pub fn parse_size(s: &str) -> Result<(u32, u32)> {
    roimesh_session::parse_size(s).map_err(|e| anyhow!(e))
}

/// Parse a color argument
pub fn parse_color(s: &str, what: &str) -> Result<Rgb> {
    s.parse().with_context(|| format!("Invalid {what} color: {s}"))
}

/// Fatal message when nothing was extracted.
pub fn no_surface(input: &Path, iso: f32) -> anyhow::Error {
    anyhow!(
        "No surface extracted from {} at threshold {iso}. \
         Try a different label/threshold or lower sigma.",
        input.display()
    )
}

impl SurfaceArgs {
    /// Extraction settings at `threshold`.
    pub fn params(&self, threshold: f32) -> ExtractParams {
        ExtractParams {
            sigma: self.sigma,
            smooth_iter: self.smooth_iter,
            smooth_relax: self.smooth_relax,
            threshold,
        }
    }
}

/// A finished batch scene, ready to be written or shown.
pub struct Shot {
    /// Window title for previews.
    pub title: String,
    /// Surfaces.
    pub meshes: Vec<LabelMesh>,
    /// Per-label colors.
    pub colors: HashMap<Label, Rgb>,
    /// Shading style.
    pub style: Style,
    /// Edge overlay.
    pub show_edges: bool,
    /// Camera preset.
    pub view: ViewPreset,
    /// Size, background, axes.
    pub options: RenderOptions,
}

impl Shot {
    /// Scene settings from the shared output flags, at `size`.
    pub fn new(title: String, output: &OutputArgs, size: &str) -> Result<Self> {
        let (width, height) = parse_size(size)?;
        let view: ViewPreset = output.view.parse().context("Invalid --view")?;
        let style: Style = output.style.parse().context("Invalid --style")?;
        let background = parse_color(&output.background, "background")?;
        Ok(Self {
            title,
            meshes: Vec::new(),
            colors: HashMap::new(),
            style,
            show_edges: output.show_edges,
            view,
            options: RenderOptions {
                width,
                height,
                background,
                show_axes: true,
            },
        })
    }

    /// Writes the shot to `screenshot`, or opens a preview window without one.
    pub fn present(self, screenshot: Option<&PathBuf>) -> Result<()> {
        match screenshot {
            Some(path) => self.save(path),
            None => self.preview(),
        }
    }

    fn save(self, path: &Path) -> Result<()> {
        let mut renderer = SceneRenderer::with_options(self.options).with_shaded_material(Material::BATCH);
        renderer.render(
            &self.meshes,
            &self.colors,
            self.style,
            self.show_edges,
            self.view,
        );
        if !renderer.save_screenshot(path) {
            bail!("Failed to save screenshot: {}", path.display());
        }
        info!(path = %path.display(), meshes = self.meshes.len(), "screenshot written");
        println!("Saved screenshot to {}", path.display());
        Ok(())
    }

    #[cfg(feature = "viewer")]
    fn preview(self) -> Result<()> {
        debug!(meshes = self.meshes.len(), "opening preview");
        let code = roimesh_view::preview(roimesh_view::Preview {
            title: self.title,
            meshes: self.meshes,
            colors: self.colors,
            style: self.style,
            show_edges: self.show_edges,
            view: self.view,
            options: self.options,
        });
        if code != 0 {
            std::process::exit(code);
        }
        Ok(())
    }

    #[cfg(not(feature = "viewer"))]
    fn preview(self) -> Result<()> {
        debug!(meshes = self.meshes.len(), "preview unavailable");
        bail!("Built without the viewer; pass --screenshot to write a PNG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_and_colors() {
        assert_eq!(parse_size("1200x800").unwrap(), (1200, 800));
        assert!(parse_size("1200").is_err());
        assert_eq!(parse_color("#4C78A8", "mesh").unwrap().to_hex(), "#4C78A8");
        assert_eq!(parse_color("white", "background").unwrap(), Rgb::WHITE);
        assert!(parse_color("nope", "mesh").is_err());
    }

    #[test]
    fn fatal_message_names_input_and_iso() {
        let msg = no_surface(Path::new("atlas.nii.gz"), 0.5).to_string();
        assert_eq!(
            msg,
            "No surface extracted from atlas.nii.gz at threshold 0.5. \
             Try a different label/threshold or lower sigma."
        );
    }
}
