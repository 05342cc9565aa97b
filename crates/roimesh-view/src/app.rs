//! Main viewer application.
//!
//! Owns a [`Session`] on the UI thread. Panels queue [`SessionMsg`] values
//! while they draw; the queue is applied once per frame and the resulting
//! events are folded into [`ViewerState`]. Scheduled renders run from
//! [`Session::tick`] at the start of each update.

use std::path::PathBuf;
use std::time::Instant;

use egui::{Color32, ColorImage, Sense, TextureHandle, TextureOptions, Vec2};
use roimesh_color::{Colormap, colormap_names};
use roimesh_core::{Rgb, Style, ViewPreset};
use roimesh_render::RenderOptions;
use roimesh_session::{SchedulerConfig, Session, SessionEvent, SessionMsg};
use tracing::{debug, info};

use crate::state::{ViewerPersistence, ViewerState};

/// Storage key of [`ViewerPersistence`].
pub(crate) const APP_KEY: &str = "roimesh_viewer_state";

/// Degrees of orbit per dragged point.
const ORBIT_SPEED: f32 = 0.4;
/// Zoom exponent per scrolled point.
const ZOOM_SPEED: f32 = 0.002;
/// Samples in the colorbar strip.
const COLORBAR_SAMPLES: usize = 128;

/// Viewer configuration.
#[derive(Debug, Clone, Default)]
pub struct ViewerConfig {
    /// Debounce settings for the session.
    pub scheduler: SchedulerConfig,
    /// Verbosity level.
    pub verbose: u8,
}

/// Interactive session window.
pub struct ViewerApp {
    session: Session,
    state: ViewerState,
    texture: Option<TextureHandle>,
    outbox: Vec<SessionMsg>,
}

impl ViewerApp {
    /// Creates the application and loads `volume` when given.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        volume: Option<PathBuf>,
        config: ViewerConfig,
    ) -> Self {
        let persistence: ViewerPersistence = cc
            .storage
            .and_then(|s| eframe::get_value(s, APP_KEY))
            .unwrap_or_default();

        let mut app = Self::with_persistence(&persistence, config);
        if let Some(path) = volume {
            app.state.file_text = path.display().to_string();
            app.outbox.push(SessionMsg::LoadVolume(path));
        }
        app
    }

    fn with_persistence(persistence: &ViewerPersistence, config: ViewerConfig) -> Self {
        let state = ViewerState::from_persistence(persistence);
        let session = Session::new(RenderOptions::default(), config.scheduler)
            .with_params(state.params);

        let mut app = Self {
            session,
            state,
            texture: None,
            outbox: Vec::new(),
        };
        // Validated against the table; an unknown saved name falls back.
        app.outbox
            .push(SessionMsg::SetColormap(persistence.colormap.clone()));
        app
    }

    // ---------------------------------------------------------------------
    // Session plumbing
    // ---------------------------------------------------------------------

    /// Applies queued messages, then drains session events into the state.
    fn dispatch(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let mut frame_ready = false;
        for msg in std::mem::take(&mut self.outbox) {
            let loading = match &msg {
                SessionMsg::LoadVolume(path) => Some(path.clone()),
                _ => None,
            };
            self.session.handle(msg, now);
            let events = self.session.take_events();
            let loaded = events
                .iter()
                .any(|e| matches!(e, SessionEvent::LabelsChanged(_)));
            if let (Some(path), true) = (loading, loaded) {
                self.volume_loaded(ctx, path);
            }
            frame_ready |= self.apply_events(events);
        }

        if self.session.tick(now) {
            let events = self.session.take_events();
            frame_ready |= self.apply_events(events);
        }

        self.state.params = *self.session.params();
        self.state.sync_colors(self.session.colors());

        if frame_ready {
            self.upload_frame(ctx);
        }
    }

    fn apply_events(&mut self, events: Vec<SessionEvent>) -> bool {
        let mut frame_ready = false;
        for event in events {
            frame_ready |= self.state.apply(event);
        }
        frame_ready
    }

    fn volume_loaded(&mut self, ctx: &egui::Context, path: PathBuf) {
        info!(path = %path.display(), "volume opened");
        let name = self.session.volume_name().unwrap_or("volume");
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!("roimesh - {name}")));
        self.state.file_text = path.display().to_string();
        self.state.volume_path = Some(path);
    }

    fn upload_frame(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.session.frame() else {
            return;
        };
        let size = [frame.width() as usize, frame.height() as usize];
        let image = ColorImage::from_rgba_unmultiplied(size, frame.rgba());
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("roimesh_frame", image, TextureOptions::LINEAR));
            }
        }
        debug!(width = size[0], height = size[1], "frame uploaded");
    }

    // ---------------------------------------------------------------------
    // Dialogs and input
    // ---------------------------------------------------------------------

    fn open_volume_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("NIfTI", &["nii", "gz", "hdr"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            self.outbox.push(SessionMsg::LoadVolume(path));
        }
    }

    fn open_values_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("ROI values", &["csv", "tsv", "txt"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            self.outbox.push(SessionMsg::LoadValues(path));
        }
    }

    fn save_screenshot_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name("screenshot.png")
            .save_file()
        {
            self.outbox.push(SessionMsg::Screenshot(path));
        }
    }

    /// Keyboard shortcuts. Returns true if the window should close.
    fn handle_input(&mut self, ctx: &egui::Context) -> bool {
        if ctx.wants_keyboard_input() {
            return false;
        }
        let (close, open, reset) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::O) && !i.modifiers.ctrl,
                i.key_pressed(egui::Key::R) && !i.modifiers.ctrl,
            )
        });
        if open {
            self.open_volume_dialog();
        }
        if reset {
            self.outbox.push(SessionMsg::ResetView);
        }
        close
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.outbox.push(SessionMsg::LoadVolume(path));
        }
    }

    // ---------------------------------------------------------------------
    // Panels
    // ---------------------------------------------------------------------

    fn draw_controls(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .width_range(280.0..=320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_loader(ui);
                    ui.separator();
                    self.draw_labels(ui);
                    ui.separator();
                    self.draw_colormap(ui);
                    ui.separator();
                    self.draw_params(ui);
                    ui.separator();
                    self.draw_actions(ui);
                });
            });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.state.status);
        });
    }

    fn draw_loader(&mut self, ui: &mut egui::Ui) {
        ui.heading("Volume");
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.state.file_text).desired_width(170.0));
            if ui.button("Browse…").clicked() {
                self.open_volume_dialog();
            }
            if ui.button("Load").clicked() && !self.state.file_text.trim().is_empty() {
                let path = PathBuf::from(self.state.file_text.trim());
                self.outbox.push(SessionMsg::LoadVolume(path));
            }
        });
    }

    fn draw_labels(&mut self, ui: &mut egui::Ui) {
        ui.heading("Labels");
        ui.horizontal(|ui| {
            if ui.button("Select all").clicked() {
                self.outbox.push(SessionMsg::SelectAll);
            }
            if ui.button("Clear").clicked() {
                self.outbox.push(SessionMsg::ClearSelection);
            }
            ui.label(format!(
                "{} / {}",
                self.state.checked_count(),
                self.state.rows.len()
            ));
        });

        let mut toggled = Vec::new();
        egui::ScrollArea::vertical()
            .id_salt("label_list")
            .max_height(240.0)
            .show(ui, |ui| {
                for row in &mut self.state.rows {
                    ui.horizontal(|ui| {
                        if ui.checkbox(&mut row.checked, "").changed() {
                            self.outbox.push(SessionMsg::SetChecked {
                                label: row.label,
                                checked: row.checked,
                            });
                        }
                        swatch(ui, row.color);
                        let highlighted = self.state.highlighted.contains(&row.label);
                        if ui.selectable_label(highlighted, &row.text).clicked() {
                            toggled.push(row.label);
                        }
                    });
                }
            });
        for label in toggled {
            self.state.toggle_highlight(label);
        }

        ui.horizontal(|ui| {
            ui.color_edit_button_srgb(&mut self.state.pick_color);
            let apply = ui.add_enabled(
                !self.state.highlighted.is_empty(),
                egui::Button::new("Apply color"),
            );
            if apply.clicked() {
                self.outbox.push(SessionMsg::SetColor {
                    labels: self.state.highlighted_labels(),
                    color: self.state.pick_rgb(),
                });
            }
        });
    }

    fn draw_colormap(&mut self, ui: &mut egui::Ui) {
        ui.heading("ROI values");
        ui.horizontal(|ui| {
            if ui.button("Load values…").clicked() {
                self.open_values_dialog();
            }
            if ui.button("Clear values").clicked() {
                self.outbox.push(SessionMsg::ClearValues);
            }
        });

        let mut use_colormap = self.state.use_colormap;
        if ui.checkbox(&mut use_colormap, "Use colormap").changed() {
            self.outbox.push(SessionMsg::SetUseColormap(use_colormap));
        }

        let mut selected = self.state.colormap.clone();
        egui::ComboBox::from_id_salt("colormap")
            .selected_text(&selected)
            .show_ui(ui, |ui| {
                for name in colormap_names() {
                    ui.selectable_value(&mut selected, name.to_string(), name);
                }
            });
        if selected != self.state.colormap {
            self.outbox.push(SessionMsg::SetColormap(selected));
        }

        if let Ok(map) = Colormap::by_name(&self.state.colormap) {
            colorbar(ui, map);
        }

        ui.horizontal(|ui| {
            ui.label("Range");
            ui.add(egui::DragValue::new(&mut self.state.range[0]).speed(0.01));
            ui.add(egui::DragValue::new(&mut self.state.range[1]).speed(0.01));
        });
        ui.horizontal(|ui| {
            if ui.button("Apply range").clicked() {
                self.outbox.push(SessionMsg::SetRange {
                    min: self.state.range[0],
                    max: self.state.range[1],
                });
            }
            if ui.button("Auto range").clicked() {
                self.outbox.push(SessionMsg::AutoRange);
            }
        });
    }

    fn draw_params(&mut self, ui: &mut egui::Ui) {
        ui.heading("Surface");
        let params = &mut self.state.params;

        if ui
            .add(egui::Slider::new(&mut params.sigma, 0.0..=5.0).step_by(0.1).text("Sigma"))
            .changed()
        {
            self.outbox.push(SessionMsg::SetSigma(params.sigma));
        }
        if ui
            .add(egui::Slider::new(&mut params.smooth_iter, 0..=200).text("Smooth iter"))
            .changed()
        {
            self.outbox.push(SessionMsg::SetSmoothIter(params.smooth_iter));
        }
        if ui
            .add(
                egui::Slider::new(&mut params.smooth_relax, 0.0..=1.0)
                    .step_by(0.01)
                    .text("Relaxation"),
            )
            .changed()
        {
            self.outbox.push(SessionMsg::SetSmoothRelax(params.smooth_relax));
        }
        if ui.checkbox(&mut params.show_edges, "Show edges").changed() {
            self.outbox.push(SessionMsg::SetShowEdges(params.show_edges));
        }

        let mut style = params.style;
        egui::ComboBox::from_id_salt("style")
            .selected_text(style.label())
            .show_ui(ui, |ui| {
                for s in Style::ALL {
                    ui.selectable_value(&mut style, s, s.label());
                }
            });
        if style != params.style {
            self.outbox.push(SessionMsg::SetStyle(style));
        }

        let mut view = params.view;
        egui::ComboBox::from_id_salt("view")
            .selected_text(view.name())
            .show_ui(ui, |ui| {
                for v in ViewPreset::ALL {
                    ui.selectable_value(&mut view, v, v.name());
                }
            });
        if view != params.view {
            self.outbox.push(SessionMsg::SetView(view));
        }
    }

    fn draw_actions(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Render").clicked() {
                self.outbox.push(SessionMsg::Render);
            }
            if ui.button("Reset view").clicked() {
                self.outbox.push(SessionMsg::ResetView);
            }
            if ui.button("Save screenshot…").clicked() {
                self.save_screenshot_dialog();
            }
        });
    }

    fn draw_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::WHITE))
            .show(ctx, |ui| {
                let available = ui.available_size();
                let pixels_per_point = ctx.pixels_per_point();
                let [width, height] = viewport_pixels(available, pixels_per_point);
                if width.abs_diff(self.state.viewport[0]) > 1
                    || height.abs_diff(self.state.viewport[1]) > 1
                {
                    self.state.viewport = [width, height];
                    self.outbox.push(SessionMsg::SetViewport { width, height });
                }

                let (rect, response) = ui.allocate_exact_size(available, Sense::click_and_drag());
                let painter = ui.painter_at(rect);

                let Some(texture) = &self.texture else {
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        "Double-click or drop a NIfTI file to open",
                        egui::FontId::default(),
                        Color32::DARK_GRAY,
                    );
                    if response.double_clicked() {
                        self.open_volume_dialog();
                    }
                    return;
                };

                if response.dragged() {
                    let delta = response.drag_delta();
                    if delta != Vec2::ZERO {
                        self.outbox.push(SessionMsg::Orbit {
                            azimuth: -delta.x * ORBIT_SPEED,
                            elevation: delta.y * ORBIT_SPEED,
                        });
                    }
                }
                if response.hovered() {
                    let scroll = ui.input(|i| i.raw_scroll_delta.y);
                    if scroll != 0.0 {
                        self.outbox.push(SessionMsg::Zoom((scroll * ZOOM_SPEED).exp()));
                    }
                }

                let image_rect =
                    egui::Rect::from_min_size(rect.min, texture.size_vec2() / pixels_per_point);
                painter.image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            });
    }
}

/// Framebuffer size in physical pixels for a canvas of `available` points.
pub(crate) fn viewport_pixels(available: Vec2, pixels_per_point: f32) -> [u32; 2] {
    let physical = available * pixels_per_point;
    [physical.x.round().max(1.0) as u32, physical.y.round().max(1.0) as u32]
}

/// Small filled square in `color`.
pub(crate) fn swatch(ui: &mut egui::Ui, color: Rgb) {
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(14.0), Sense::hover());
    ui.painter().rect_filled(rect, 2.0, to_color32(color));
}

/// Horizontal strip sampled from `map`.
fn colorbar(ui: &mut egui::Ui, map: &Colormap) {
    let width = ui.available_width();
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 14.0), Sense::hover());
    let strip = map.gradient(COLORBAR_SAMPLES);
    let step = rect.width() / COLORBAR_SAMPLES as f32;
    let painter = ui.painter();
    for (i, c) in strip.into_iter().enumerate() {
        let min = egui::pos2(rect.min.x + i as f32 * step, rect.min.y);
        // Overlap by half a point to avoid seams.
        let cell = egui::Rect::from_min_size(min, egui::vec2(step + 0.5, rect.height()));
        painter.rect_filled(cell, 0.0, to_color32(c));
    }
}

pub(crate) fn to_color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        if self.handle_input(ctx) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        self.draw_controls(ctx);
        self.draw_canvas(ctx);
        self.dispatch(ctx);

        // Wake up for the pending render.
        if let Some(wait) = self.session.time_until_due(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let persistence = self.state.to_persistence();
        eframe::set_value(storage, APP_KEY, &persistence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_colormap_is_requested() {
        let persistence = ViewerPersistence {
            colormap: "magma".into(),
            ..Default::default()
        };
        let app = ViewerApp::with_persistence(&persistence, ViewerConfig::default());
        assert_eq!(app.outbox, vec![SessionMsg::SetColormap("magma".into())]);
        assert_eq!(app.session.params(), &persistence.params);
    }

    #[test]
    fn viewport_follows_display_scale() {
        assert_eq!(viewport_pixels(egui::vec2(400.0, 300.0), 1.0), [400, 300]);
        assert_eq!(viewport_pixels(egui::vec2(400.0, 300.0), 2.0), [800, 600]);
        assert_eq!(viewport_pixels(egui::vec2(333.5, 0.0), 1.5), [500, 1]);
    }

    #[test]
    fn color_conversion() {
        assert_eq!(to_color32(Rgb::new(1, 2, 3)), Color32::from_rgb(1, 2, 3));
    }
}
