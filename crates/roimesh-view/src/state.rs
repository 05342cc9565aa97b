//! Viewer state and persistence.
//!
//! [`ViewerPersistence`] is what survives a restart; [`ViewerState`] mirrors
//! the session for the panels and holds the widgets' edit buffers.

use std::collections::BTreeSet;
use std::path::PathBuf;

use roimesh_color::{ColorMode, ColorResolver, DEFAULT_COLORMAP};
use roimesh_core::{Label, Rgb};
use roimesh_session::{INITIAL_STATUS, LabelRow, RenderParams, SessionEvent};
use serde::{Deserialize, Serialize};

/// Default window size.
pub const DEFAULT_WINDOW: [f32; 2] = [1400.0, 900.0];

/// Persistent viewer settings (saved between sessions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerPersistence {
    /// Last opened volume.
    pub last_file: Option<PathBuf>,
    /// Last render parameters.
    pub params: RenderParams,
    /// Last selected colormap.
    pub colormap: String,
}

impl Default for ViewerPersistence {
    fn default() -> Self {
        Self {
            last_file: None,
            params: RenderParams::default(),
            colormap: DEFAULT_COLORMAP.to_string(),
        }
    }
}

/// Runtime viewer state (not persisted).
#[derive(Debug, Clone)]
pub struct ViewerState {
    // Session mirror
    /// Label list as last reported by the session.
    pub rows: Vec<LabelRow>,
    /// Status line.
    pub status: String,
    /// Loaded volume.
    pub volume_path: Option<PathBuf>,

    // Edit buffers
    /// Parameters shown in the controls.
    pub params: RenderParams,
    /// Labels highlighted for a color override.
    pub highlighted: BTreeSet<Label>,
    /// Color picker value.
    pub pick_color: [u8; 3],
    /// Colormap toggle as shown.
    pub use_colormap: bool,
    /// Selected colormap name.
    pub colormap: String,
    /// Range fields.
    pub range: [f64; 2],
    /// Path typed into the loader field.
    pub file_text: String,

    // Canvas
    /// Size of the last requested frame.
    pub viewport: [u32; 2],
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::from_persistence(&ViewerPersistence::default())
    }
}

impl ViewerState {
    /// Initial state from saved settings.
    pub fn from_persistence(p: &ViewerPersistence) -> Self {
        Self {
            rows: Vec::new(),
            status: INITIAL_STATUS.to_string(),
            volume_path: None,
            params: p.params,
            highlighted: BTreeSet::new(),
            pick_color: [255, 255, 255],
            use_colormap: false,
            colormap: p.colormap.clone(),
            range: [0.0, 1.0],
            file_text: p
                .last_file
                .as_ref()
                .map(|f| f.display().to_string())
                .unwrap_or_default(),
            viewport: [0, 0],
        }
    }

    /// Settings to save.
    pub fn to_persistence(&self) -> ViewerPersistence {
        ViewerPersistence {
            last_file: self.volume_path.clone(),
            params: self.params,
            colormap: self.colormap.clone(),
        }
    }

    /// Applies one session event. Returns true when a new frame is ready.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::StatusChanged(status) => {
                self.status = status;
                false
            }
            SessionEvent::LabelsChanged(rows) => {
                self.highlighted
                    .retain(|l| rows.iter().any(|r| r.label == *l));
                self.rows = rows;
                false
            }
            SessionEvent::FrameReady { .. } => true,
            SessionEvent::SceneCleared => false,
        }
    }

    /// Copies colormap mode, name and range back from the resolver, so the
    /// widgets show what the session accepted.
    pub fn sync_colors(&mut self, colors: &ColorResolver) {
        self.use_colormap = colors.mode() == ColorMode::Colormap;
        self.colormap = colors.colormap().name().to_string();
        let range = colors.range();
        self.range = [range.min, range.max];
    }

    /// Flips the highlight of `label`.
    pub fn toggle_highlight(&mut self, label: Label) {
        if !self.highlighted.remove(&label) {
            self.highlighted.insert(label);
        }
    }

    /// Highlighted labels in ascending order.
    pub fn highlighted_labels(&self) -> Vec<Label> {
        self.highlighted.iter().copied().collect()
    }

    /// Picker value as a color.
    pub fn pick_rgb(&self) -> Rgb {
        let [r, g, b] = self.pick_color;
        Rgb::new(r, g, b)
    }

    /// Number of checked rows.
    pub fn checked_count(&self) -> usize {
        self.rows.iter().filter(|r| r.checked).count()
    }
}
