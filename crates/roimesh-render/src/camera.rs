//! Scene camera.
//!
//! The camera is a pose (position, focal point, view-up) plus a projection.
//! Perspective cameras use a 30 degree vertical view angle; parallel cameras
//! show `2 * parallel_scale` world units vertically.

use glam::{Mat4, Quat, Vec3};
use roimesh_core::Bounds;

/// Vertical view angle of perspective cameras, in degrees.
pub const VIEW_ANGLE_DEG: f32 = 30.0;

/// Projection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Perspective with [`VIEW_ANGLE_DEG`].
    #[default]
    Perspective,
    /// Orthographic.
    Parallel,
}

/// Camera pose and projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position.
    pub position: Vec3,
    /// Point looked at; orbiting and zooming happen around it.
    pub focal_point: Vec3,
    /// Approximate up direction.
    pub up: Vec3,
    /// Projection model.
    pub projection: Projection,
    /// Half the visible height for parallel projection.
    pub parallel_scale: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            focal_point: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::Perspective,
            parallel_scale: 1.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

/// Bounds usable for framing: empty boxes become a unit box at the origin.
pub(crate) fn framing_bounds(bounds: Bounds) -> Bounds {
    if bounds.is_empty() {
        Bounds::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    } else {
        bounds
    }
}

impl Camera {
    /// Unit vector from the eye toward the focal point.
    pub fn direction(&self) -> Vec3 {
        (self.focal_point - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Eye to focal point distance.
    pub fn distance(&self) -> f32 {
        self.position.distance(self.focal_point)
    }

    /// Up vector made orthogonal to the view direction.
    pub fn view_up(&self) -> Vec3 {
        let dir = self.direction();
        let right = dir.cross(self.up);
        let right = if right.length_squared() < 1e-12 {
            dir.any_orthonormal_vector()
        } else {
            right.normalize()
        };
        right.cross(dir).normalize()
    }

    /// World to eye transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.focal_point, self.view_up())
    }

    /// Eye to clip transform for a viewport of the given aspect (width / height).
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        match self.projection {
            Projection::Perspective => {
                Mat4::perspective_rh(VIEW_ANGLE_DEG.to_radians(), aspect, self.near, self.far)
            }
            Projection::Parallel => {
                let s = self.parallel_scale;
                Mat4::orthographic_rh(-s * aspect, s * aspect, -s, s, self.near, self.far)
            }
        }
    }

    /// Places the camera so the bounding sphere of `bounds` fills the view,
    /// keeping the current direction and view-up.
    pub fn reset(&mut self, bounds: Bounds) {
        let bounds = framing_bounds(bounds);
        let mut radius = bounds.radius();
        if radius <= 0.0 {
            radius = 0.5;
        }
        let dir = self.direction();
        let up = self.view_up();
        let half_angle = (VIEW_ANGLE_DEG * 0.5).to_radians();
        let distance = radius / half_angle.sin();

        self.focal_point = bounds.center();
        self.position = self.focal_point - dir * distance;
        self.up = up;
        self.parallel_scale = radius;
        self.reset_clipping(bounds);
    }

    /// Fits the near and far planes around `bounds`.
    pub fn reset_clipping(&mut self, bounds: Bounds) {
        let bounds = framing_bounds(bounds);
        let radius = bounds.radius().max(1e-3);
        let depth = (bounds.center() - self.position).dot(self.direction());
        let far = (depth + radius * 1.1).max(1e-2);
        let near = (depth - radius * 1.1).max(far * 1e-3);
        self.near = near;
        self.far = far;
    }

    /// Rotates the eye about the focal point: `azimuth` degrees around the
    /// view-up, then `elevation` degrees around the right axis.
    pub fn orbit(&mut self, azimuth: f32, elevation: f32) {
        let up = self.view_up();
        let offset = self.position - self.focal_point;
        let offset = Quat::from_axis_angle(up, azimuth.to_radians()) * offset;

        let dir = (-offset).normalize_or(Vec3::NEG_Z);
        // positive elevation raises the eye toward view-up
        let axis = up.cross(dir).normalize_or(Vec3::X);
        let tilt = Quat::from_axis_angle(axis, elevation.to_radians());
        let offset = tilt * offset;

        self.position = self.focal_point + offset;
        self.up = tilt * up;
    }

    /// Magnifies the view by `factor` (> 1 zooms in).
    ///
    /// Perspective cameras move toward the focal point; parallel cameras
    /// shrink their scale.
    pub fn zoom(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        match self.projection {
            Projection::Perspective => {
                let offset = self.position - self.focal_point;
                self.position = self.focal_point + offset / factor;
            }
            Projection::Parallel => self.parallel_scale /= factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube() -> Bounds {
        Bounds::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn reset_fits_bounding_sphere() {
        let mut cam = Camera {
            position: Vec3::new(10.0, 0.0, 0.0),
            up: Vec3::Z,
            ..Camera::default()
        };
        cam.reset(cube());
        let radius = 3f32.sqrt();
        assert_relative_eq!(cam.distance(), radius / 15f32.to_radians().sin(), epsilon = 1e-4);
        assert_relative_eq!(cam.direction().x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(cam.parallel_scale, radius, epsilon = 1e-6);
        assert!(cam.near > 0.0 && cam.near < cam.distance() - radius);
        assert!(cam.far > cam.distance() + radius);
    }

    #[test]
    fn reset_of_empty_bounds_is_finite() {
        let mut cam = Camera::default();
        cam.reset(Bounds::EMPTY);
        assert!(cam.position.is_finite());
        assert_eq!(cam.focal_point, Vec3::ZERO);
    }

    #[test]
    fn view_up_is_orthogonal() {
        let cam = Camera {
            position: Vec3::new(1.0, 1.0, 1.0),
            up: Vec3::Z,
            ..Camera::default()
        };
        assert_relative_eq!(cam.view_up().dot(cam.direction()), 0.0, epsilon = 1e-6);
        assert!(cam.view_up().z > 0.0);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut cam = Camera {
            position: Vec3::new(0.0, -5.0, 0.0),
            up: Vec3::Z,
            ..Camera::default()
        };
        cam.orbit(90.0, 0.0);
        assert_relative_eq!(cam.distance(), 5.0, epsilon = 1e-5);
        // a quarter turn about +Z takes -Y to +X
        assert_relative_eq!(cam.position.x, 5.0, epsilon = 1e-5);
        cam.orbit(0.0, 30.0);
        assert_relative_eq!(cam.distance(), 5.0, epsilon = 1e-5);
        assert!(cam.position.z > 0.0);
    }

    #[test]
    fn zoom_by_projection() {
        let mut cam = Camera {
            position: Vec3::new(0.0, 0.0, 8.0),
            ..Camera::default()
        };
        cam.zoom(2.0);
        assert_relative_eq!(cam.distance(), 4.0);
        cam.projection = Projection::Parallel;
        cam.parallel_scale = 3.0;
        cam.zoom(1.5);
        assert_relative_eq!(cam.parallel_scale, 2.0);
        assert_relative_eq!(cam.distance(), 4.0);
        cam.zoom(0.0);
        assert_relative_eq!(cam.parallel_scale, 2.0);
    }

    #[test]
    fn focal_point_projects_to_centre() {
        let mut cam = Camera::default();
        cam.reset(cube());
        let clip = cam.projection_matrix(4.0 / 3.0) * cam.view_matrix() * cam.focal_point.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
