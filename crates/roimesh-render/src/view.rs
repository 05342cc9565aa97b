//! Named view presets.
//!
//! Presets place the eye on one side of the scene at `1.8 * span` from the
//! bounds midpoint, where `span` is the largest box side (at least 1):
//!
//! | Preset  | Eye side | Up |
//! |---------|----------|----|
//! | `left`  | -X       | +Z |
//! | `right` | +X       | +Z |
//! | `top`   | +Z       | +Y |
//! | `front` | -Y       | +Z |
//!
//! `iso` is the isometric reset instead: it looks along (-1, -1, -1) with +Z
//! up and is independent of the bounds until the camera is fitted.

use glam::Vec3;
use roimesh_core::{Bounds, ViewPreset};

use crate::camera::{Camera, framing_bounds};

/// Multiple of the scene span between the eye and the focal point.
pub const VIEW_DISTANCE_FACTOR: f32 = 1.8;

/// Explicit camera placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Eye position.
    pub position: Vec3,
    /// Bounds midpoint.
    pub focal_point: Vec3,
    /// View-up.
    pub up: Vec3,
}

/// What a preset asks of the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewSetup {
    /// Move to this pose.
    Pose(CameraPose),
    /// Isometric reset.
    Isometric,
}

/// Camera setup for `preset` over `bounds`.
pub fn camera_for(preset: ViewPreset, bounds: Bounds) -> ViewSetup {
    let (side, up) = match preset {
        ViewPreset::Left => (Vec3::NEG_X, Vec3::Z),
        ViewPreset::Right => (Vec3::X, Vec3::Z),
        ViewPreset::Top => (Vec3::Z, Vec3::Y),
        ViewPreset::Front => (Vec3::NEG_Y, Vec3::Z),
        ViewPreset::Iso => return ViewSetup::Isometric,
    };
    let bounds = framing_bounds(bounds);
    let size = bounds.size();
    let span = size.x.max(size.y).max(size.z).max(1.0);
    let focal_point = bounds.center();
    ViewSetup::Pose(CameraPose {
        position: focal_point + side * (VIEW_DISTANCE_FACTOR * span),
        focal_point,
        up,
    })
}

/// [`camera_for`] by name; unknown names give the isometric reset.
pub fn camera_for_name(name: &str, bounds: Bounds) -> ViewSetup {
    camera_for(ViewPreset::from_name(name), bounds)
}

/// Applies `preset` to `camera` and fits it to `bounds`.
pub fn apply_view(camera: &mut Camera, preset: ViewPreset, bounds: Bounds) {
    match camera_for(preset, bounds) {
        ViewSetup::Pose(pose) => {
            camera.position = pose.position;
            camera.focal_point = pose.focal_point;
            camera.up = pose.up;
        }
        ViewSetup::Isometric => {
            camera.focal_point = Vec3::ZERO;
            camera.position = Vec3::ONE;
            camera.up = Vec3::Z;
        }
    }
    camera.reset(bounds);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scene() -> Bounds {
        Bounds::new(Vec3::new(0.0, 10.0, -2.0), Vec3::new(4.0, 12.0, 0.0))
    }

    fn pose(preset: ViewPreset, bounds: Bounds) -> CameraPose {
        match camera_for(preset, bounds) {
            ViewSetup::Pose(p) => p,
            ViewSetup::Isometric => panic!("expected a pose for {preset}"),
        }
    }

    #[test]
    fn presets_sit_on_their_axis() {
        let mid = Vec3::new(2.0, 11.0, -1.0);
        let dist = 1.8 * 4.0;
        let left = pose(ViewPreset::Left, scene());
        assert_eq!(left.focal_point, mid);
        assert_relative_eq!(left.position.x, mid.x - dist);
        assert_eq!(left.up, Vec3::Z);

        let right = pose(ViewPreset::Right, scene());
        assert_relative_eq!(right.position.x, mid.x + dist);

        let top = pose(ViewPreset::Top, scene());
        assert_relative_eq!(top.position.z, mid.z + dist);
        assert_eq!(top.up, Vec3::Y);

        let front = pose(ViewPreset::Front, scene());
        assert_relative_eq!(front.position.y, mid.y - dist);
        assert_eq!(front.up, Vec3::Z);
    }

    #[test]
    fn span_is_at_least_one() {
        let tiny = Bounds::new(Vec3::ZERO, Vec3::splat(0.1));
        let left = pose(ViewPreset::Left, tiny);
        assert_relative_eq!(left.focal_point.x - left.position.x, 1.8, epsilon = 1e-6);
    }

    #[test]
    fn iso_ignores_bounds() {
        assert_eq!(camera_for(ViewPreset::Iso, scene()), ViewSetup::Isometric);
        assert_eq!(camera_for(ViewPreset::Iso, Bounds::EMPTY), ViewSetup::Isometric);
        assert_eq!(camera_for_name("diagonal", scene()), ViewSetup::Isometric);
        assert!(matches!(camera_for_name("top", scene()), ViewSetup::Pose(_)));
    }

    #[test]
    fn apply_view_looks_along_preset() {
        let mut cam = Camera::default();
        apply_view(&mut cam, ViewPreset::Iso, scene());
        let d = cam.direction();
        assert_relative_eq!(d.x, d.y, epsilon = 1e-6);
        assert_relative_eq!(d.y, d.z, epsilon = 1e-6);
        assert!(d.x < 0.0);
        assert_relative_eq!(cam.focal_point.y, 11.0);

        apply_view(&mut cam, ViewPreset::Left, scene());
        assert_relative_eq!(cam.direction().x, 1.0, epsilon = 1e-6);
        assert!(cam.view_up().z > 0.99);
    }
}
