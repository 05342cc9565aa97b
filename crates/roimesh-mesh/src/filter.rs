//! Separable Gaussian smoothing of scalar volumes.
//!
//! The kernel is truncated at four standard deviations with radius
//! `floor(4 * sigma + 0.5)`. Borders use half-sample symmetric reflection
//! (`d c b a | a b c d | d c b a`). These are the usual SciPy
//! `gaussian_filter` conventions, so a blurred mask puts the 0.5 level in the
//! familiar place.
//!
//! # Example
//!
//! ```rust
//! use roimesh_core::{Vec3, Volume};
//! use roimesh_mesh::gaussian_filter;
//!
//! let vol = Volume::from_fn([5, 5, 5], Vec3::ONE, Vec3::ZERO, |x, y, z| {
//!     if (x, y, z) == (2, 2, 2) { 1.0 } else { 0.0 }
//! })?;
//! let blurred = gaussian_filter(&vol, 1.0)?;
//! let total: f32 = blurred.data().iter().sum();
//! assert!((total - 1.0).abs() < 0.05);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use roimesh_core::Volume;
use tracing::trace;

use crate::{MeshError, MeshResult};

/// Normalized 1D Gaussian weights for offsets `-radius..=radius`.
///
/// Returns `[1.0]` when sigma is zero or the radius rounds to zero.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (4.0 * sigma + 0.5).floor().max(0.0) as usize;
    if sigma <= 0.0 || radius == 0 {
        return vec![1.0];
    }
    let inv = -0.5 / (sigma * sigma);
    let mut weights: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (inv * x * x).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Maps any integer coordinate into `0..n` by mirrored repetition.
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m < n { m } else { 2 * n - 1 - m }
}

/// Applies an isotropic Gaussian blur of `sigma` voxels.
///
/// `sigma == 0` returns an unchanged copy.
pub fn gaussian_filter(volume: &Volume, sigma: f32) -> MeshResult<Volume> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(MeshError::InvalidParameter {
            name: "sigma",
            reason: format!("must be a finite value >= 0, got {sigma}"),
        });
    }
    let kernel = gaussian_kernel(f64::from(sigma));
    if kernel.len() == 1 {
        return Ok(volume.clone());
    }
    trace!(sigma, taps = kernel.len(), "gaussian filter");

    let dims = volume.dims();
    let mut data = volume.data().to_vec();
    for axis in 0..3 {
        if dims[axis] > 1 {
            data = blur_axis(&data, dims, axis, &kernel);
        }
    }
    Ok(Volume::new(dims, volume.spacing(), volume.origin(), data)?)
}

/// One 1D convolution pass along `axis`, written row by row along X.
fn blur_axis(src: &[f32], dims: [usize; 3], axis: usize, kernel: &[f64]) -> Vec<f32> {
    let [nx, ny, _] = dims;
    let n = dims[axis];
    let stride = match axis {
        0 => 1,
        1 => nx,
        _ => nx * ny,
    };
    let radius = (kernel.len() / 2) as isize;

    let row = |(r, out): (usize, &mut [f32])| {
        let y = r % ny;
        let z = r / ny;
        let row_base = nx * (y + ny * z);
        for (x, o) in out.iter_mut().enumerate() {
            let coord = [x, y, z][axis];
            // index of this voxel with its `axis` coordinate zeroed
            let base = row_base + x - coord * stride;
            let mut acc = 0.0f64;
            for (k, &w) in kernel.iter().enumerate() {
                let c = reflect(coord as isize + k as isize - radius, n);
                acc += w * f64::from(src[base + c * stride]);
            }
            *o = acc as f32;
        }
    };

    let mut dst = vec![0.0f32; src.len()];
    #[cfg(feature = "parallel")]
    dst.par_chunks_mut(nx).enumerate().for_each(row);
    #[cfg(not(feature = "parallel"))]
    dst.chunks_mut(nx).enumerate().for_each(row);
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roimesh_core::Vec3;

    #[test]
    fn kernel_shape() {
        assert_eq!(gaussian_kernel(0.0), vec![1.0]);
        assert_eq!(gaussian_kernel(0.1), vec![1.0]);

        let k = gaussian_kernel(1.0);
        assert_eq!(k.len(), 9);
        assert_relative_eq!(k.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(k[0], k[8]);
        assert!(k[4] > k[3] && k[3] > k[2]);
        // reference value for the centre tap of a sigma=1 kernel truncated at 4
        assert_relative_eq!(k[4], 0.398_942_4, epsilon = 1e-4);
    }

    #[test]
    fn reflect_is_half_sample_symmetric() {
        let n = 4;
        let got: Vec<usize> = (-5..9).map(|i| reflect(i, n)).collect();
        assert_eq!(got, vec![3, 3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0, 0]);
        assert_eq!(reflect(0, 1), 0);
        assert_eq!(reflect(-3, 1), 0);
    }

    #[test]
    fn zero_sigma_is_identity() {
        let vol = Volume::from_fn([3, 4, 5], Vec3::ONE, Vec3::ZERO, |x, y, z| (x * y + z) as f32).unwrap();
        assert_eq!(gaussian_filter(&vol, 0.0).unwrap(), vol);
    }

    #[test]
    fn constant_field_is_preserved() {
        let vol = Volume::from_fn([6, 5, 4], Vec3::ONE, Vec3::ZERO, |_, _, _| 0.75).unwrap();
        let out = gaussian_filter(&vol, 1.5).unwrap();
        for &v in out.data() {
            assert_relative_eq!(v, 0.75, epsilon = 1e-6);
        }
    }

    #[test]
    fn impulse_spreads_symmetrically_and_conserves_mass() {
        let vol = Volume::from_fn([9, 9, 9], Vec3::ONE, Vec3::ZERO, |x, y, z| {
            if (x, y, z) == (4, 4, 4) { 1.0 } else { 0.0 }
        })
        .unwrap();
        let out = gaussian_filter(&vol, 1.0).unwrap();
        let at = |x, y, z| out.get(x, y, z).unwrap();
        assert_relative_eq!(at(3, 4, 4), at(5, 4, 4), epsilon = 1e-7);
        assert_relative_eq!(at(4, 3, 4), at(4, 4, 5), epsilon = 1e-7);
        assert!(at(4, 4, 4) < 0.1);
        let total: f32 = out.data().iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn rejects_negative_sigma() {
        let vol = Volume::zeros([2, 2, 2], Vec3::ONE, Vec3::ZERO).unwrap();
        assert!(matches!(
            gaussian_filter(&vol, -1.0),
            Err(MeshError::InvalidParameter { name: "sigma", .. })
        ));
    }
}
