//! Session controller.
//!
//! [`Session`] owns the loaded volume, the label list, the color state, the
//! render parameters and the renderer. It runs on one thread: the UI calls
//! [`Session::handle`] for each user action and [`Session::tick`] from its
//! event loop, then drains [`Session::take_events`].
//!
//! Parameter and selection changes go through the [`RenderScheduler`], so a
//! burst of edits renders once after the quiet period. Camera changes
//! re-rasterize the current scene right away.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use roimesh_color::{ColorMode, ColorResolver, ColormapRange};
use roimesh_core::{Label, Rgb, Volume};
use roimesh_mesh::{LabelMesh, LabelMeshExtractor, TriMesh};
use roimesh_render::{Framebuffer, RenderOptions, SceneRenderer};
use tracing::{debug, info, warn};

use crate::messages::{LabelRow, SessionEvent, SessionMsg};
use crate::params::RenderParams;
use crate::scheduler::{RenderScheduler, SchedulerConfig};

/// Status shown before anything is loaded.
pub const INITIAL_STATUS: &str = "Load a NIfTI to begin.";

// cached surfaces beyond this are dropped wholesale
const MAX_CACHE_ENTRIES: usize = 512;

/// Extraction cache key: volume generation, label and the extraction
/// parameters (floats by bit pattern).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    generation: u64,
    label: Label,
    sigma: u32,
    smooth_iter: usize,
    smooth_relax: u32,
}

/// A loaded volume and where it came from.
#[derive(Debug)]
struct Loaded {
    volume: Volume,
    name: String,
}

/// Interactive session state.
#[derive(Debug)]
pub struct Session {
    loaded: Option<Loaded>,
    generation: u64,
    labels: Vec<(Label, bool)>,
    colors: ColorResolver,
    params: RenderParams,
    scheduler: RenderScheduler,
    extractor: LabelMeshExtractor,
    cache: HashMap<CacheKey, Option<Arc<TriMesh>>>,
    renderer: SceneRenderer,
    meshes: Vec<LabelMesh>,
    status: String,
    events: Vec<SessionEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RenderOptions::default(), SchedulerConfig::default())
    }
}

impl Session {
    /// Empty session.
    pub fn new(options: RenderOptions, config: SchedulerConfig) -> Self {
        Self {
            loaded: None,
            generation: 0,
            labels: Vec::new(),
            colors: ColorResolver::new(),
            params: RenderParams::default(),
            scheduler: RenderScheduler::new(config),
            extractor: LabelMeshExtractor::default(),
            cache: HashMap::new(),
            renderer: SceneRenderer::with_options(options),
            meshes: Vec::new(),
            status: INITIAL_STATUS.to_string(),
            events: Vec::new(),
        }
    }

    /// Empty session starting from `params`.
    pub fn with_params(mut self, params: RenderParams) -> Self {
        self.params = params;
        self
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Loaded volume.
    pub fn volume(&self) -> Option<&Volume> {
        self.loaded.as_ref().map(|l| &l.volume)
    }

    /// File name of the loaded volume.
    pub fn volume_name(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.name.as_str())
    }

    /// Label list in ordinal order.
    pub fn label_rows(&self) -> Vec<LabelRow> {
        self.labels
            .iter()
            .map(|&(label, checked)| LabelRow {
                label,
                checked,
                color: self.colors.color(label),
                text: self.colors.display_text(label),
            })
            .collect()
    }

    /// Checked labels in ordinal order.
    pub fn checked_labels(&self) -> Vec<Label> {
        self.labels.iter().filter(|(_, c)| *c).map(|&(l, _)| l).collect()
    }

    /// Color state.
    pub fn colors(&self) -> &ColorResolver {
        &self.colors
    }

    /// Render parameters.
    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    /// Scheduler state.
    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    /// Renderer, for camera and scene inspection.
    pub fn renderer(&self) -> &SceneRenderer {
        &self.renderer
    }

    /// Meshes of the last render pass.
    pub fn meshes(&self) -> &[LabelMesh] {
        &self.meshes
    }

    /// Last frame.
    pub fn frame(&self) -> Option<&Framebuffer> {
        self.renderer.frame()
    }

    /// Time until a scheduled render is due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_due(now)
    }

    /// Drains pending notifications.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // ---------------------------------------------------------------------
    // Input
    // ---------------------------------------------------------------------

    /// Applies one message.
    pub fn handle(&mut self, msg: SessionMsg, now: Instant) {
        debug!(?msg, "session message");
        match msg {
            SessionMsg::LoadVolume(path) => self.load_volume(&path),
            SessionMsg::LoadValues(path) => self.load_values(&path, now),
            SessionMsg::ClearValues => {
                self.colors.clear_values();
                self.labels_changed();
                self.set_status("ROI values cleared.");
                self.schedule(now);
            }

            SessionMsg::SetChecked { label, checked } => {
                if let Some(entry) = self.labels.iter_mut().find(|(l, _)| *l == label) {
                    entry.1 = checked;
                    self.labels_changed();
                    self.schedule(now);
                }
            }
            SessionMsg::Select(labels) => {
                for entry in &mut self.labels {
                    entry.1 = labels.contains(&entry.0);
                }
                self.labels_changed();
                self.schedule(now);
            }
            SessionMsg::SelectAll => self.check_all(true, now),
            SessionMsg::ClearSelection => self.check_all(false, now),

            SessionMsg::SetColor { labels, color } => {
                let n = self.colors.set_color(&labels, color);
                self.labels_changed();
                self.set_status(format!("Set color {} for {n} ROI(s).", color.to_hex()));
                self.schedule(now);
            }
            SessionMsg::SetUseColormap(enabled) => match self.colors.set_use_colormap(enabled) {
                Ok(()) => {
                    self.labels_changed();
                    self.schedule(now);
                }
                Err(_) => self.set_status("Load ROI values to use a colormap."),
            },
            SessionMsg::SetColormap(name) => match self.colors.set_colormap(&name) {
                Ok(()) => self.colormap_changed(now),
                Err(_) => self.set_status(format!("Unknown colormap: {name}")),
            },
            SessionMsg::SetRange { min, max } => match ColormapRange::new(min, max) {
                Ok(range) => {
                    self.colors.set_range(range);
                    self.colormap_changed(now);
                }
                Err(e) => self.set_status(e.to_string()),
            },
            SessionMsg::AutoRange => match self.colors.auto_range() {
                Some(_) => self.colormap_changed(now),
                None => self.set_status("Load ROI values to use a colormap."),
            },

            SessionMsg::SetSigma(sigma) => self.update_params(now, |p| p.sigma = sigma),
            SessionMsg::SetSmoothIter(n) => self.update_params(now, |p| p.smooth_iter = n),
            SessionMsg::SetSmoothRelax(r) => self.update_params(now, |p| p.smooth_relax = r),
            SessionMsg::SetStyle(style) => self.update_params(now, |p| p.style = style),
            SessionMsg::SetShowEdges(show) => self.update_params(now, |p| p.show_edges = show),

            SessionMsg::SetView(view) => {
                self.params.view = view;
                self.reset_view();
            }
            SessionMsg::ResetView => self.reset_view(),
            SessionMsg::Orbit { azimuth, elevation } => {
                if self.renderer.frame().is_some() {
                    self.renderer.orbit(azimuth, elevation);
                    self.frame_ready();
                }
            }
            SessionMsg::Zoom(factor) => {
                if self.renderer.frame().is_some() {
                    self.renderer.zoom(factor);
                    self.frame_ready();
                }
            }
            SessionMsg::SetViewport { width, height } => {
                match self.renderer.set_viewport(width, height) {
                    Ok(()) => self.schedule(now),
                    Err(e) => self.set_status(e.to_string()),
                }
            }

            SessionMsg::Render => {
                self.scheduler.flush();
                self.render_scene();
            }
            SessionMsg::Screenshot(path) => self.screenshot(&path),
        }
    }

    /// Runs the scheduled render if it is due. Returns whether one ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.scheduler.poll(now) {
            self.render_scene();
            true
        } else {
            false
        }
    }

    /// Runs a pending render immediately. Returns whether one ran.
    pub fn flush(&mut self) -> bool {
        if self.scheduler.flush() {
            self.render_scene();
            true
        } else {
            false
        }
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    fn load_volume(&mut self, path: &Path) {
        if !path.exists() {
            self.set_status(format!("File not found: {}", path.display()));
            return;
        }
        let volume = match roimesh_io::nifti::read_volume(path) {
            Ok(v) => v,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "volume load failed");
                self.set_status(format!("Failed to load: {e}"));
                return;
            }
        };

        let labels = volume.labels();
        let name = file_name(path);
        info!(path = %path.display(), dims = ?volume.dims(), labels = labels.len(), "volume loaded");

        self.generation += 1;
        self.cache.clear();
        self.labels = labels.iter().map(|&l| (l, true)).collect();
        self.colors.populate(&labels);
        self.loaded = Some(Loaded { volume, name: name.clone() });
        self.labels_changed();
        self.set_status(format!("Loaded {name}; found {} labels.", labels.len()));

        self.scheduler.volume_loaded();
        self.render_scene();
    }

    fn load_values(&mut self, path: &Path, now: Instant) {
        if !path.exists() {
            self.set_status(format!("File not found: {}", path.display()));
            return;
        }
        let table = match roimesh_io::values::read(path) {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "value table load failed");
                self.set_status(format!("Failed to load: {e}"));
                return;
            }
        };
        let n = table.len();
        if !self.colors.set_values(table) {
            self.set_status(format!("No valid ROI values found in {}.", file_name(path)));
            return;
        }
        self.labels_changed();
        self.set_status(format!("Loaded {n} ROI values."));
        self.schedule(now);
    }

    fn check_all(&mut self, checked: bool, now: Instant) {
        for entry in &mut self.labels {
            entry.1 = checked;
        }
        self.labels_changed();
        self.schedule(now);
    }

    fn colormap_changed(&mut self, now: Instant) {
        if self.colors.mode() == ColorMode::Colormap {
            self.labels_changed();
            self.schedule(now);
        }
    }

    fn update_params<F: FnOnce(&mut RenderParams)>(&mut self, now: Instant, edit: F) {
        let mut params = self.params;
        edit(&mut params);
        if let Err(e) = params.validate() {
            self.set_status(e.to_string());
            return;
        }
        self.params = params;
        self.schedule(now);
    }

    fn reset_view(&mut self) {
        if self.renderer.frame().is_some() {
            self.renderer.reset_view(self.params.view);
            self.frame_ready();
        }
    }

    fn screenshot(&mut self, path: &Path) {
        if self.renderer.frame().is_none() {
            self.set_status("Nothing to capture. Render first.");
        } else if self.renderer.save_screenshot(path) {
            self.set_status(format!("Saved screenshot: {}", path.display()));
        } else {
            self.set_status("Failed to save screenshot.");
        }
    }

    /// One full render pass: extract (through the cache), color, draw.
    fn render_scene(&mut self) {
        let Some(loaded) = &self.loaded else {
            self.set_status("Load a NIfTI first.");
            return;
        };

        let labels = self.checked_labels();
        if labels.is_empty() {
            self.clear_scene();
            self.set_status("No labels selected.");
            return;
        }

        let params = self.params.extract_params();
        if self.cache.len() > MAX_CACHE_ENTRIES {
            self.cache.clear();
        }
        let mut meshes = Vec::with_capacity(labels.len());
        for &label in &labels {
            let key = CacheKey {
                generation: self.generation,
                label,
                sigma: params.sigma.to_bits(),
                smooth_iter: params.smooth_iter,
                smooth_relax: params.smooth_relax.to_bits(),
            };
            let cached = self.cache.get(&key).cloned();
            let mesh = match cached {
                Some(cached) => cached,
                None => match self.extractor.extract_label(&loaded.volume, label, &params) {
                    Ok(mesh) => {
                        let mesh = mesh.map(Arc::new);
                        self.cache.insert(key, mesh.clone());
                        mesh
                    }
                    Err(e) => {
                        warn!(label = %label, error = %e, "extraction failed");
                        self.clear_scene();
                        self.set_status(e.to_string());
                        return;
                    }
                },
            };
            if let Some(mesh) = mesh {
                meshes.push(LabelMesh { label, mesh });
            }
        }

        if meshes.is_empty() {
            self.clear_scene();
            self.set_status("No meshes extracted with current settings.");
            return;
        }

        let colors: HashMap<Label, Rgb> = self.colors.resolve(&labels).into_iter().collect();
        self.renderer.render(
            &meshes,
            &colors,
            self.params.style,
            self.params.show_edges,
            self.params.view,
        );
        let n = meshes.len();
        self.meshes = meshes;
        self.frame_ready();
        self.set_status(format!("Rendered {n} meshes."));
    }

    fn clear_scene(&mut self) {
        self.meshes.clear();
        self.renderer.clear();
        self.events.push(SessionEvent::SceneCleared);
        self.frame_ready();
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    fn schedule(&mut self, now: Instant) {
        self.scheduler.request(now);
    }

    fn set_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        info!(status = %status, "status");
        self.status = status.clone();
        self.events.push(SessionEvent::StatusChanged(status));
    }

    fn labels_changed(&mut self) {
        let rows = self.label_rows();
        self.events.push(SessionEvent::LabelsChanged(rows));
    }

    fn frame_ready(&mut self) {
        if let Some(fb) = self.renderer.frame() {
            self.events.push(SessionEvent::FrameReady {
                width: fb.width(),
                height: fb.height(),
            });
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
