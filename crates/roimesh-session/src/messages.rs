//! Message types for UI <-> session communication.
//!
//! Panels send [`SessionMsg`] values in; the session answers with
//! [`SessionEvent`] values that the UI drains after each call.

use std::path::PathBuf;

use roimesh_core::{Label, Rgb, Style, ViewPreset};

/// Requests into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMsg {
    /// Load a NIfTI volume and render it right away.
    LoadVolume(PathBuf),
    /// Load a ROI value table.
    LoadValues(PathBuf),
    /// Drop the value table and return to palette colors.
    ClearValues,

    /// Check or uncheck one label.
    SetChecked {
        /// Label to change.
        label: Label,
        /// New state.
        checked: bool,
    },
    /// Check exactly these labels.
    Select(Vec<Label>),
    /// Check every label.
    SelectAll,
    /// Uncheck every label.
    ClearSelection,

    /// Override the color of some labels.
    SetColor {
        /// Labels to recolor.
        labels: Vec<Label>,
        /// New color.
        color: Rgb,
    },
    /// Toggle colormap coloring.
    SetUseColormap(bool),
    /// Select a colormap by name.
    SetColormap(String),
    /// Set the colormap range explicitly.
    SetRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Re-derive the colormap range from the values.
    AutoRange,

    /// Gaussian blur width.
    SetSigma(f32),
    /// Relaxation passes.
    SetSmoothIter(usize),
    /// Relaxation factor.
    SetSmoothRelax(f32),
    /// Rendering style.
    SetStyle(Style),
    /// Edge overlay.
    SetShowEdges(bool),

    /// Switch the camera preset (applied immediately).
    SetView(ViewPreset),
    /// Re-apply the current preset (applied immediately).
    ResetView,
    /// Rotate the camera by degrees (applied immediately).
    Orbit {
        /// Degrees around view-up.
        azimuth: f32,
        /// Degrees around the right axis.
        elevation: f32,
    },
    /// Magnify by a factor (applied immediately).
    Zoom(f32),
    /// Output size in pixels (scheduled).
    SetViewport {
        /// Width.
        width: u32,
        /// Height.
        height: u32,
    },

    /// Run a full render pass now, bypassing the quiet period.
    Render,
    /// Write the last frame as PNG.
    Screenshot(PathBuf),
}

/// One row of the label list.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRow {
    /// Label.
    pub label: Label,
    /// Whether it is rendered.
    pub checked: bool,
    /// Current color.
    pub color: Rgb,
    /// List text, with the value when one is loaded.
    pub text: String,
}

/// Notifications out of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The status line changed.
    StatusChanged(String),
    /// Labels, their colors, values or checked states changed.
    LabelsChanged(Vec<LabelRow>),
    /// A new frame is available through `Session::frame`.
    FrameReady {
        /// Width.
        width: u32,
        /// Height.
        height: u32,
    },
    /// The scene was emptied.
    SceneCleared,
}
