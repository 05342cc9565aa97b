//! Axis-aligned world-space bounds.

use glam::Vec3;

/// Axis-aligned box. An empty box has `min > max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lower corner.
    pub min: Vec3,
    /// Upper corner.
    pub max: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    /// Box containing nothing; the identity for [`union`](Self::union).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Box spanning two corners, in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box holding every point.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        points.into_iter().fold(Self::EMPTY, |b, &p| b.including(p))
    }

    /// Whether the box contains no point.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Box grown to include `p`.
    pub fn including(self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Smallest box holding both.
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Midpoint.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Width, height and depth.
    pub fn size(&self) -> Vec3 {
        (self.max - self.min).max(Vec3::ZERO)
    }

    /// Half the diagonal.
    pub fn radius(&self) -> f32 {
        self.size().length() * 0.5
    }

    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn to_array(&self) -> [f32; 6] {
        [
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_union_identity() {
        let b = Bounds::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        assert!(Bounds::EMPTY.is_empty());
        assert_eq!(Bounds::EMPTY.union(b), b);
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.to_array(), [0.0, 1.0, 0.0, 2.0, 0.0, 3.0]);
    }

    #[test]
    fn from_points_and_center() {
        let pts = [Vec3::new(-1.0, 0.0, 0.0), Vec3::new(3.0, 2.0, -4.0)];
        let b = Bounds::from_points(&pts);
        assert_eq!(b.center(), Vec3::new(1.0, 1.0, -2.0));
        assert_eq!(b.size(), Vec3::new(4.0, 2.0, 4.0));
        assert_eq!(b.radius(), 3.0);
    }
}
