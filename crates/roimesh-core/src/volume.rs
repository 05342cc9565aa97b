//! Labeled scalar volumes.
//!
//! A [`Volume`] is an immutable 3D grid of `f32` samples together with the
//! physical voxel spacing and the world position of voxel `(0, 0, 0)`.
//! Samples are stored with X varying fastest, which is the native NIfTI order:
//!
//! ```text
//! index(x, y, z) = x + nx * (y + ny * z)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use roimesh_core::{Label, Vec3, Volume};
//!
//! let vol = Volume::from_fn([4, 4, 4], Vec3::ONE, Vec3::ZERO, |x, y, z| {
//!     if (x, y, z) == (1, 1, 1) { 3.0 } else { 0.0 }
//! })?;
//! assert_eq!(vol.labels(), vec![Label(3.0)]);
//! assert_eq!(vol.voxel_count(Label(3.0)), 1);
//! # Ok::<(), roimesh_core::Error>(())
//! ```

use std::collections::BTreeSet;

use glam::Vec3;

use crate::bounds::Bounds;
use crate::error::{Error, Result};
use crate::label::Label;

/// Immutable 3D scalar grid in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    dims: [usize; 3],
    spacing: Vec3,
    origin: Vec3,
    data: Vec<f32>,
}

impl Volume {
    /// Wraps an X-fastest sample buffer.
    ///
    /// Fails when an axis is empty, the buffer length differs from
    /// `nx * ny * nz`, or a spacing component is not a positive finite number.
    pub fn new(dims: [usize; 3], spacing: Vec3, origin: Vec3, data: Vec<f32>) -> Result<Self> {
        let [nx, ny, nz] = dims;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(Error::InvalidDimensions { nx, ny, nz });
        }
        let expected = nx * ny * nz;
        if data.len() != expected {
            return Err(Error::DataLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        if !spacing.is_finite() || spacing.min_element() <= 0.0 {
            return Err(Error::InvalidSpacing(spacing.to_array()));
        }
        Ok(Self {
            dims,
            spacing,
            origin,
            data,
        })
    }

    /// All-zero volume.
    pub fn zeros(dims: [usize; 3], spacing: Vec3, origin: Vec3) -> Result<Self> {
        let len = dims.iter().product();
        Self::new(dims, spacing, origin, vec![0.0; len])
    }

    /// Builds a volume by evaluating `f(x, y, z)` for every voxel.
    pub fn from_fn<F>(dims: [usize; 3], spacing: Vec3, origin: Vec3, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize, usize) -> f32,
    {
        let [nx, ny, nz] = dims;
        let mut data = Vec::with_capacity(nx * ny * nz);
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    data.push(f(x, y, z));
                }
            }
        }
        Self::new(dims, spacing, origin, data)
    }

    /// Grid dimensions `[nx, ny, nz]`.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Physical size of one voxel along each axis.
    #[inline]
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// World position of voxel `(0, 0, 0)`.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Raw X-fastest samples.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; a volume has at least one voxel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Linear index of `(x, y, z)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.dims[0] * (y + self.dims[1] * z)
    }

    /// Sample at `(x, y, z)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        let [nx, ny, nz] = self.dims;
        if x < nx && y < ny && z < nz {
            Some(self.data[self.index(x, y, z)])
        } else {
            None
        }
    }

    /// World position of a (possibly fractional) grid coordinate.
    #[inline]
    pub fn world(&self, grid: Vec3) -> Vec3 {
        self.origin + grid * self.spacing
    }

    /// World-space box spanned by the voxel centers.
    pub fn bounds(&self) -> Bounds {
        let last = Vec3::new(
            (self.dims[0] - 1) as f32,
            (self.dims[1] - 1) as f32,
            (self.dims[2] - 1) as f32,
        );
        Bounds::new(self.world(Vec3::ZERO), self.world(last))
    }

    /// Sorted distinct labels present in the volume.
    ///
    /// Zero is background and non-finite samples are skipped. Every other
    /// sample value, fractional ones included, is its own label.
    pub fn labels(&self) -> Vec<Label> {
        let mut seen = BTreeSet::new();
        let mut last = 0.0f32;
        for &v in &self.data {
            // runs of identical values are common in label maps
            if v == last {
                continue;
            }
            last = v;
            if let Some(label) = Label::from_value(f64::from(v)) {
                seen.insert(label);
            }
        }
        seen.into_iter().collect()
    }

    /// Binary field: 1.0 where the voxel equals `label`, else 0.0.
    pub fn mask(&self, label: Label) -> Vec<f32> {
        let target = label.as_f32();
        self.data
            .iter()
            .map(|&v| if v == target { 1.0 } else { 0.0 })
            .collect()
    }

    /// Number of voxels carrying `label`.
    pub fn voxel_count(&self, label: Label) -> usize {
        let target = label.as_f32();
        self.data.iter().filter(|&&v| v == target).count()
    }

    /// Minimum and maximum sample.
    pub fn value_range(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn labeled() -> Volume {
        Volume::from_fn([3, 2, 2], Vec3::new(2.0, 1.0, 0.5), Vec3::new(-1.0, 0.0, 4.0), |x, y, z| {
            match (x, y, z) {
                (0, 0, 0) => 5.0,
                (2, 1, 1) => 1.0,
                (1, 0, 1) => 2.5,
                (1, 1, 0) => 5.0,
                _ => 0.0,
            }
        })
        .unwrap()
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(
            Volume::zeros([0, 1, 1], Vec3::ONE, Vec3::ZERO),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Volume::new([2, 2, 2], Vec3::ONE, Vec3::ZERO, vec![0.0; 7]),
            Err(Error::DataLengthMismatch { expected: 8, actual: 7 })
        ));
        assert!(matches!(
            Volume::zeros([2, 2, 2], Vec3::new(1.0, 0.0, 1.0), Vec3::ZERO),
            Err(Error::InvalidSpacing(_))
        ));
    }

    #[test]
    fn x_fastest_indexing() {
        let vol = labeled();
        assert_eq!(vol.index(1, 0, 0), 1);
        assert_eq!(vol.index(0, 1, 0), 3);
        assert_eq!(vol.index(0, 0, 1), 6);
        assert_eq!(vol.get(2, 1, 1), Some(1.0));
        assert_eq!(vol.get(3, 0, 0), None);
    }

    #[test]
    fn labels_are_sorted_nonzero_samples() {
        let vol = labeled();
        assert_eq!(vol.labels(), vec![Label(1.0), Label(2.5), Label(5.0)]);
        assert_eq!(vol.voxel_count(Label(2.5)), 1);
        assert_eq!(vol.voxel_count(Label(5.0)), 2);
        assert_eq!(vol.voxel_count(Label(7.0)), 0);
    }

    #[test]
    fn mask_marks_only_matching_voxels() {
        let vol = labeled();
        let mask = vol.mask(Label(5.0));
        assert_eq!(mask.iter().filter(|&&m| m == 1.0).count(), 2);
        assert_eq!(mask[vol.index(1, 1, 0)], 1.0);
        assert_eq!(mask[vol.index(2, 1, 1)], 0.0);

        let half = vol.mask(Label(2.5));
        assert_eq!(half.iter().filter(|&&m| m == 1.0).count(), 1);
        assert_eq!(half[vol.index(1, 0, 1)], 1.0);
    }

    #[test]
    fn non_finite_samples_are_not_labels() {
        let vol = Volume::new([2, 2, 1], Vec3::ONE, Vec3::ZERO, vec![f32::NAN, 1.5, 2.0, 1.5]).unwrap();
        assert_eq!(vol.labels(), vec![Label(1.5), Label(2.0)]);
    }

    #[test]
    fn bounds_follow_spacing_and_origin() {
        let b = labeled().bounds();
        assert_relative_eq!(b.min.x, -1.0);
        assert_relative_eq!(b.max.x, 3.0);
        assert_relative_eq!(b.max.y, 1.0);
        assert_relative_eq!(b.min.z, 4.0);
        assert_relative_eq!(b.max.z, 4.5);
    }
}
