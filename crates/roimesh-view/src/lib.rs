//! # roimesh-view
//!
//! Desktop viewer for labeled NIfTI volumes.
//!
//! Features:
//! - Label list with per-label visibility and color overrides
//! - ROI value tables mapped through named colormaps, with a colorbar
//! - Blur and smoothing controls with debounced re-render
//! - Shaded and flat styles, camera presets
//! - Drag to orbit, scroll to zoom
//! - Persistent settings
//!
//! # Quick Start
//!
//! ```ignore
//! use roimesh_view::{run_opt, ViewerConfig};
//!
//! let exit_code = run_opt(Some("atlas.nii.gz".into()), ViewerConfig::default());
//! ```
//!
//! # Keyboard Shortcuts
//!
//! | Key | Action |
//! |-----|--------|
//! | `O` | Open volume |
//! | `R` | Reset view |
//! | `Esc` | Exit |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod app;
mod preview;
mod state;

pub use app::{ViewerApp, ViewerConfig};
pub use preview::{Preview, PreviewApp};
pub use state::{DEFAULT_WINDOW, ViewerPersistence, ViewerState};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

/// Runs the session window with an optional initial volume.
///
/// Without a path, reopens the last volume from persistence when it still
/// exists. Returns the process exit code.
pub fn run_opt(path: Option<PathBuf>, config: ViewerConfig) -> i32 {
    let resolved = path.or_else(|| {
        load_persistence()
            .and_then(|p| p.last_file)
            .filter(|f| f.exists())
    });

    match &resolved {
        Some(p) => info!(path = %p.display(), "starting viewer"),
        None => info!("starting empty viewer"),
    }

    let title = resolved
        .as_ref()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map_or_else(|| "roimesh".into(), |n| format!("roimesh - {n}"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&title)
            .with_inner_size(DEFAULT_WINDOW)
            .with_min_inner_size([800.0, 600.0]),
        persistence_path: persistence_path(),
        ..Default::default()
    };

    let result = eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, resolved, config)))),
    );
    exit_code(result)
}

/// Runs the session window on `path`. Fails early when it does not exist.
pub fn run<P: AsRef<Path>>(path: P, config: ViewerConfig) -> i32 {
    let path = path.as_ref();
    if !path.exists() {
        error!(path = %path.display(), "file not found");
        return 1;
    }
    run_opt(Some(path.to_path_buf()), config)
}

/// Shows already extracted meshes in a preview window.
///
/// The window opens at the size in `preview.options`.
pub fn preview(preview: Preview) -> i32 {
    let size = [
        preview.options.width as f32,
        preview.options.height as f32,
    ];
    let title = preview.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&title)
            .with_inner_size(size),
        ..Default::default()
    };
    debug!(meshes = preview.meshes.len(), "opening preview");
    let result = eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(PreviewApp::new(preview)))),
    );
    exit_code(result)
}

fn exit_code(result: eframe::Result) -> i32 {
    match result {
        Ok(()) => {
            debug!("viewer exited normally");
            0
        }
        Err(e) => {
            error!(error = %e, "viewer error");
            1
        }
    }
}

/// Platform-specific settings file.
fn persistence_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("roimesh").join("viewer.ron"))
}

/// Loads saved settings without opening a window.
fn load_persistence() -> Option<ViewerPersistence> {
    let text = std::fs::read_to_string(persistence_path()?).ok()?;
    parse_persistence(&text)
}

/// Extracts viewer settings from eframe's key-value RON store.
fn parse_persistence(text: &str) -> Option<ViewerPersistence> {
    let store: HashMap<String, String> = ron::from_str(text).ok()?;
    ron::from_str(store.get(app::APP_KEY)?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_config_default() {
        let config = ViewerConfig::default();
        assert_eq!(config.verbose, 0);
        assert_eq!(
            config.scheduler.quiet_period,
            roimesh_session::DEFAULT_QUIET_PERIOD
        );
    }

    #[test]
    fn persistence_file_name() {
        if let Some(path) = persistence_path() {
            assert!(path.ends_with("roimesh/viewer.ron"));
        }
    }

    #[test]
    fn parse_saved_store() {
        let saved = ViewerPersistence {
            last_file: Some(PathBuf::from("/data/atlas.nii.gz")),
            colormap: "inferno".into(),
            ..Default::default()
        };
        let mut store = HashMap::new();
        store.insert(app::APP_KEY.to_string(), ron::to_string(&saved).unwrap());
        let text = ron::to_string(&store).unwrap();

        assert_eq!(parse_persistence(&text), Some(saved));
        assert_eq!(parse_persistence("not ron"), None);
        assert_eq!(parse_persistence("{}"), None);
    }

    #[test]
    fn persistence_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.ron");
        let mut store = HashMap::new();
        store.insert(
            app::APP_KEY.to_string(),
            ron::to_string(&ViewerPersistence::default()).unwrap(),
        );
        std::fs::write(&path, ron::to_string(&store).unwrap()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_persistence(&text), Some(ViewerPersistence::default()));
    }
}
