//! Stateful scene renderer.
//!
//! [`SceneRenderer`] owns the scene, the camera and the last frame. A full
//! [`render`](SceneRenderer::render) replaces the scene and re-fits the
//! camera; camera interactions only redraw.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use roimesh_color::palette_color;
use roimesh_core::{Label, Rgb, Style, ViewPreset};
use roimesh_mesh::LabelMesh;
use tracing::{debug, warn};

use crate::camera::{Camera, Projection};
use crate::framebuffer::Framebuffer;
use crate::light::{Light, Material};
use crate::raster::{Rasterizer, SoftwareRasterizer};
use crate::scene::{RenderOptions, Scene, SceneItem};
use crate::view::apply_view;
use crate::{RenderError, RenderResult};

/// Largest accepted viewport side.
pub const MAX_VIEWPORT: u32 = 16384;

/// Renders label meshes through a [`Rasterizer`].
#[derive(Debug, Clone)]
pub struct SceneRenderer<R = SoftwareRasterizer> {
    rasterizer: R,
    scene: Scene,
    camera: Camera,
    options: RenderOptions,
    shaded: Material,
    frame: Option<Framebuffer>,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new(SoftwareRasterizer, RenderOptions::default())
    }
}

impl SceneRenderer {
    /// Software renderer with `options`.
    pub fn with_options(options: RenderOptions) -> Self {
        Self::new(SoftwareRasterizer, options)
    }
}

impl<R: Rasterizer> SceneRenderer<R> {
    /// Renderer with an empty scene. Nothing is drawn until the first
    /// [`render`](Self::render) or [`clear`](Self::clear).
    pub fn new(rasterizer: R, options: RenderOptions) -> Self {
        Self {
            rasterizer,
            scene: Scene::default(),
            camera: Camera::default(),
            options,
            shaded: Material::SHADED,
            frame: None,
        }
    }

    /// Material for the shaded style of later renders.
    pub fn with_shaded_material(mut self, material: Material) -> Self {
        self.shaded = material;
        self
    }

    /// Replaces the scene with `meshes` and draws it from `view`.
    ///
    /// Labels missing from `colors` take the palette entry of their
    /// position in `meshes`. The flat style uses parallel projection and
    /// never shows edges.
    pub fn render(
        &mut self,
        meshes: &[LabelMesh],
        colors: &HashMap<Label, Rgb>,
        style: Style,
        show_edges: bool,
        view: ViewPreset,
    ) -> &Framebuffer {
        let mut scene = Scene::new(style, show_edges);
        scene.shaded = self.shaded;
        scene.items = meshes
            .iter()
            .enumerate()
            .map(|(i, m)| SceneItem {
                label: m.label,
                mesh: m.mesh.clone(),
                color: colors.get(&m.label).copied().unwrap_or_else(|| palette_color(i)),
            })
            .collect();
        self.scene = scene;
        self.camera.projection = if style.is_flat() {
            Projection::Parallel
        } else {
            Projection::Perspective
        };
        apply_view(&mut self.camera, view, self.scene.bounds());
        debug!(
            meshes = meshes.len(),
            style = style.name(),
            view = view.name(),
            edges = self.scene.edges_visible(),
            "render"
        );
        self.redraw()
    }

    /// Removes every surface and redraws the empty background.
    pub fn clear(&mut self) -> &Framebuffer {
        self.scene.items.clear();
        self.redraw()
    }

    /// Re-applies `view` to the current scene.
    pub fn reset_view(&mut self, view: ViewPreset) -> &Framebuffer {
        apply_view(&mut self.camera, view, self.scene.bounds());
        self.redraw()
    }

    /// Orbits the camera by degrees and redraws.
    pub fn orbit(&mut self, azimuth: f32, elevation: f32) -> &Framebuffer {
        self.camera.orbit(azimuth, elevation);
        self.camera.reset_clipping(self.scene.bounds());
        self.redraw()
    }

    /// Zooms the camera by `factor` (> 1 magnifies) and redraws.
    pub fn zoom(&mut self, factor: f32) -> &Framebuffer {
        self.camera.zoom(factor);
        self.camera.reset_clipping(self.scene.bounds());
        self.redraw()
    }

    /// Changes the output size. Takes effect on the next draw.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 || width > MAX_VIEWPORT || height > MAX_VIEWPORT {
            return Err(RenderError::InvalidViewport { width, height });
        }
        self.options.width = width;
        self.options.height = height;
        Ok(())
    }

    /// Toggles the orientation triad. Takes effect on the next draw.
    pub fn set_show_axes(&mut self, show: bool) {
        self.options.show_axes = show;
    }

    /// Changes the clear color. Takes effect on the next draw.
    pub fn set_background(&mut self, background: Rgb) {
        self.options.background = background;
    }

    /// Draws the current scene from the current camera.
    pub fn redraw(&mut self) -> &Framebuffer {
        let started = Instant::now();
        let fb = self.rasterizer.rasterize(&self.scene, &self.camera, &self.options);
        debug!(
            width = fb.width(),
            height = fb.height(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
            "frame"
        );
        self.frame.insert(fb)
    }

    /// Last drawn frame.
    pub fn frame(&self) -> Option<&Framebuffer> {
        self.frame.as_ref()
    }

    /// Writes the last frame as PNG. Returns false when nothing has been
    /// drawn yet or the write fails.
    pub fn save_screenshot<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        let Some(frame) = &self.frame else {
            warn!(path = %path.display(), "screenshot requested before first frame");
            return false;
        };
        match frame.save_png(path) {
            Ok(()) => {
                debug!(path = %path.display(), "screenshot saved");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "screenshot failed");
                false
            }
        }
    }

    /// Current scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Current camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Lights of the current scene.
    pub fn lights(&self) -> &[Light] {
        &self.scene.lights
    }

    /// Output options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roimesh_core::Vec3;
    use roimesh_mesh::TriMesh;
    use std::sync::Arc;

    fn tetra(offset: Vec3) -> TriMesh {
        TriMesh::new(
            vec![
                offset,
                offset + Vec3::X,
                offset + Vec3::Y,
                offset + Vec3::Z,
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
    }

    fn meshes() -> Vec<LabelMesh> {
        vec![
            LabelMesh {
                label: Label(4.0),
                mesh: Arc::new(tetra(Vec3::ZERO)),
            },
            LabelMesh {
                label: Label(9.0),
                mesh: Arc::new(tetra(Vec3::new(3.0, 0.0, 0.0))),
            },
        ]
    }

    fn small() -> SceneRenderer {
        SceneRenderer::with_options(RenderOptions {
            width: 80,
            height: 60,
            ..RenderOptions::default()
        })
    }

    #[test]
    fn no_frame_before_first_draw() {
        let r = small();
        assert!(r.frame().is_none());
        let dir = tempfile::tempdir().unwrap();
        assert!(!r.save_screenshot(dir.path().join("shot.png")));
    }

    #[test]
    fn missing_colors_fall_back_to_palette() {
        let mut r = small();
        let colors = HashMap::from([(Label(9.0), Rgb::new(1, 2, 3))]);
        r.render(&meshes(), &colors, Style::Shaded3d, false, ViewPreset::Iso);
        let items = &r.scene().items;
        assert_eq!(items[0].color, palette_color(0));
        assert_eq!(items[1].color, Rgb::new(1, 2, 3));
        assert_eq!(r.lights().len(), 3);
    }

    #[test]
    fn style_selects_projection() {
        let mut r = small();
        r.render(&meshes(), &HashMap::new(), Style::Flat2d, true, ViewPreset::Top);
        assert_eq!(r.camera().projection, Projection::Parallel);
        assert!(!r.scene().edges_visible());
        r.render(&meshes(), &HashMap::new(), Style::Shaded3d, true, ViewPreset::Top);
        assert_eq!(r.camera().projection, Projection::Perspective);
        assert!(r.scene().edges_visible());
    }

    #[test]
    fn render_frames_scene() {
        let mut r = small();
        let fb = r.render(&meshes(), &HashMap::new(), Style::Shaded3d, false, ViewPreset::Front);
        assert_eq!((fb.width(), fb.height()), (80, 60));
        assert!(fb.rgba().chunks_exact(4).any(|px| px[..3] != [255, 255, 255]));
        // bounds are x 0..4, y 0..1, z 0..1
        assert_relative_eq!(r.camera().focal_point.x, 2.0, epsilon = 1e-5);
        assert!(r.camera().direction().y > 0.99);
    }

    #[test]
    fn batch_material_brightens_shaded_frames() {
        let total = |fb: &Framebuffer| fb.rgba().iter().map(|&c| u64::from(c)).sum::<u64>();
        let mut plain = small();
        let plain_sum = total(plain.render(&meshes(), &HashMap::new(), Style::Shaded3d, false, ViewPreset::Front));

        let mut batch = small().with_shaded_material(Material::BATCH);
        let batch_sum = total(batch.render(&meshes(), &HashMap::new(), Style::Shaded3d, false, ViewPreset::Front));
        assert_eq!(batch.scene().material(), Material::BATCH);
        assert!(batch_sum > plain_sum, "{batch_sum} <= {plain_sum}");

        // flat frames are unaffected
        let flat_plain = total(plain.render(&meshes(), &HashMap::new(), Style::Flat2d, false, ViewPreset::Front));
        let flat_batch = total(batch.render(&meshes(), &HashMap::new(), Style::Flat2d, false, ViewPreset::Front));
        assert_eq!(flat_plain, flat_batch);
    }

    #[test]
    fn clear_keeps_camera() {
        let mut r = small();
        r.render(&meshes(), &HashMap::new(), Style::Shaded3d, false, ViewPreset::Left);
        let cam = *r.camera();
        let fb = r.clear();
        assert!(fb.rgba().chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
        assert!(r.scene().is_empty());
        assert_eq!(r.camera().position, cam.position);
    }

    #[test]
    fn interaction_moves_camera() {
        let mut r = small();
        r.render(&meshes(), &HashMap::new(), Style::Shaded3d, false, ViewPreset::Iso);
        let d0 = r.camera().distance();
        r.zoom(2.0);
        assert_relative_eq!(r.camera().distance(), d0 / 2.0, epsilon = 1e-3);
        let before = r.camera().position;
        r.orbit(45.0, 0.0);
        assert_ne!(r.camera().position, before);
        r.reset_view(ViewPreset::Iso);
        assert_relative_eq!(r.camera().distance(), d0, epsilon = 1e-3);
    }

    #[test]
    fn viewport_validation() {
        let mut r = small();
        assert!(matches!(
            r.set_viewport(0, 10),
            Err(RenderError::InvalidViewport { width: 0, height: 10 })
        ));
        r.set_viewport(32, 16).unwrap();
        assert_eq!(r.redraw().width(), 32);
    }

    #[test]
    fn screenshot_after_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let mut r = small();
        r.render(&meshes(), &HashMap::new(), Style::Flat2d, false, ViewPreset::Top);
        assert!(r.save_screenshot(&path));
        let img = roimesh_io::png::read(&path).unwrap();
        assert_eq!((img.width, img.height), (80, 60));
        assert!(!r.save_screenshot(dir.path().join("missing").join("shot.png")));
    }
}
