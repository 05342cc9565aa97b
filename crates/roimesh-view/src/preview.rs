//! Read-only preview window for batch renders.
//!
//! Shows a fixed set of meshes with the same camera interaction as the
//! session window, without labels, colors or parameter controls.

use std::collections::HashMap;

use egui::{Color32, ColorImage, Sense, TextureHandle, TextureOptions, Vec2};
use roimesh_core::{Label, Rgb, Style, ViewPreset};
use roimesh_mesh::LabelMesh;
use roimesh_render::{Material, RenderOptions, SceneRenderer};
use tracing::warn;

use crate::app::viewport_pixels;

const ORBIT_SPEED: f32 = 0.4;
const ZOOM_SPEED: f32 = 0.002;

/// What a preview window shows.
#[derive(Debug, Clone)]
pub struct Preview {
    /// Window title.
    pub title: String,
    /// Surfaces to draw.
    pub meshes: Vec<LabelMesh>,
    /// Per-label colors; missing labels use the palette.
    pub colors: HashMap<Label, Rgb>,
    /// Shading style.
    pub style: Style,
    /// Edge overlay.
    pub show_edges: bool,
    /// Initial camera preset.
    pub view: ViewPreset,
    /// Initial size, background and axes.
    pub options: RenderOptions,
}

/// eframe application behind [`crate::preview`].
pub struct PreviewApp {
    renderer: SceneRenderer,
    view: ViewPreset,
    texture: Option<TextureHandle>,
    viewport: [u32; 2],
    dirty: bool,
}

impl PreviewApp {
    /// Renders `preview` once; the window then only moves the camera.
    pub fn new(preview: Preview) -> Self {
        let mut renderer = SceneRenderer::with_options(preview.options).with_shaded_material(Material::BATCH);
        renderer.render(
            &preview.meshes,
            &preview.colors,
            preview.style,
            preview.show_edges,
            preview.view,
        );
        Self {
            renderer,
            view: preview.view,
            texture: None,
            viewport: [preview.options.width, preview.options.height],
            dirty: true,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        match self.renderer.set_viewport(width, height) {
            Ok(()) => {
                self.viewport = [width, height];
                self.renderer.redraw();
                self.dirty = true;
            }
            Err(e) => warn!(error = %e, "preview resize rejected"),
        }
    }

    fn upload(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.renderer.frame() else {
            return;
        };
        let size = [frame.width() as usize, frame.height() as usize];
        let image = ColorImage::from_rgba_unmultiplied(size, frame.rgba());
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("roimesh_preview", image, TextureOptions::LINEAR));
            }
        }
        self.dirty = false;
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (close, reset) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::R),
            )
        });
        if close {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }
        if reset {
            self.renderer.reset_view(self.view);
            self.dirty = true;
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::WHITE))
            .show(ctx, |ui| {
                let available = ui.available_size();
                let pixels_per_point = ctx.pixels_per_point();
                let [width, height] = viewport_pixels(available, pixels_per_point);
                if width.abs_diff(self.viewport[0]) > 1 || height.abs_diff(self.viewport[1]) > 1 {
                    self.resize(width, height);
                }

                let (rect, response) = ui.allocate_exact_size(available, Sense::click_and_drag());
                if response.dragged() {
                    let delta = response.drag_delta();
                    if delta != Vec2::ZERO {
                        self.renderer
                            .orbit(-delta.x * ORBIT_SPEED, delta.y * ORBIT_SPEED);
                        self.dirty = true;
                    }
                }
                if response.hovered() {
                    let scroll = ui.input(|i| i.raw_scroll_delta.y);
                    if scroll != 0.0 {
                        self.renderer.zoom((scroll * ZOOM_SPEED).exp());
                        self.dirty = true;
                    }
                }

                if self.dirty {
                    self.upload(ctx);
                }
                if let Some(texture) = &self.texture {
                    ui.painter_at(rect).image(
                        texture.id(),
                        egui::Rect::from_min_size(rect.min, texture.size_vec2() / pixels_per_point),
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
            });
    }
}
