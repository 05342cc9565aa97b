//! Per-label surface extraction.
//!
//! [`LabelMeshExtractor`] runs the mask, blur, isosurface and relax steps for
//! each requested label in turn. Labels whose surface comes out empty are
//! left out of the result without an error, and the remaining labels keep
//! their requested order.

use std::sync::Arc;

use roimesh_core::{Label, Volume};
use tracing::{debug, trace};

use crate::filter::gaussian_filter;
use crate::marching::{Isosurfacer, MarchingCubes};
use crate::mesh::TriMesh;
use crate::smooth::{LaplacianSmoother, MeshSmoother};
use crate::{MeshError, MeshResult};

/// Tunables of the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractParams {
    /// Gaussian blur width in voxels applied before surfacing; 0 disables it.
    pub sigma: f32,
    /// Relaxation passes applied after surfacing; 0 disables them.
    pub smooth_iter: usize,
    /// Fraction of the way each vertex moves toward its neighbours per pass.
    pub smooth_relax: f32,
    /// Iso-value. Masks are 0/1 fields, so 0.5 sits halfway across the boundary.
    pub threshold: f32,
}

impl Default for ExtractParams {
    /// Interactive defaults.
    fn default() -> Self {
        Self {
            sigma: 0.8,
            smooth_iter: 30,
            smooth_relax: 0.1,
            threshold: 0.5,
        }
    }
}

impl ExtractParams {
    /// Batch defaults: a wider blur and more relaxation.
    pub fn batch() -> Self {
        Self {
            sigma: 1.0,
            smooth_iter: 50,
            ..Self::default()
        }
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> MeshResult<()> {
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(invalid("sigma", format!("must be a finite value >= 0, got {}", self.sigma)));
        }
        if !self.smooth_relax.is_finite() || !(0.0..=1.0).contains(&self.smooth_relax) {
            return Err(invalid(
                "smooth_relax",
                format!("must be within [0, 1], got {}", self.smooth_relax),
            ));
        }
        if !self.threshold.is_finite() {
            return Err(invalid("threshold", format!("must be finite, got {}", self.threshold)));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> MeshError {
    MeshError::InvalidParameter { name, reason }
}

/// A surface belonging to one label.
///
/// The mesh is shared so callers can cache results and hand them to a
/// renderer without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMesh {
    /// Region the surface encloses.
    pub label: Label,
    /// Surface in world coordinates.
    pub mesh: Arc<TriMesh>,
}

/// Label-to-surface pipeline, generic over its isosurfacer and smoother.
#[derive(Debug, Clone, Default)]
pub struct LabelMeshExtractor<I = MarchingCubes, S = LaplacianSmoother> {
    isosurfacer: I,
    smoother: S,
}

impl<I: Isosurfacer, S: MeshSmoother> LabelMeshExtractor<I, S> {
    /// Builds an extractor from explicit stages.
    pub fn new(isosurfacer: I, smoother: S) -> Self {
        Self { isosurfacer, smoother }
    }

    /// Extracts one surface per label, in the order given.
    ///
    /// Labels without a surface are omitted; only invalid parameters fail.
    pub fn extract(&self, volume: &Volume, labels: &[Label], params: &ExtractParams) -> MeshResult<Vec<LabelMesh>> {
        params.validate()?;
        let mut out = Vec::with_capacity(labels.len());
        for &label in labels {
            if let Some(mesh) = self.extract_label(volume, label, params)? {
                out.push(LabelMesh {
                    label,
                    mesh: Arc::new(mesh),
                });
            }
        }
        debug!(requested = labels.len(), extracted = out.len(), "label extraction");
        Ok(out)
    }

    /// Surface of a single label, or `None` when it has no geometry.
    pub fn extract_label(&self, volume: &Volume, label: Label, params: &ExtractParams) -> MeshResult<Option<TriMesh>> {
        params.validate()?;
        let voxels = volume.voxel_count(label);
        if voxels == 0 {
            trace!(label = %label, "no voxels");
            return Ok(None);
        }
        let mask = Volume::new(volume.dims(), volume.spacing(), volume.origin(), volume.mask(label))?;
        let mesh = self.surface(&mask, params)?;
        match &mesh {
            Some(m) => debug!(
                label = %label,
                voxels,
                points = m.vertex_count(),
                triangles = m.triangle_count(),
                "extracted"
            ),
            None => debug!(label = %label, voxels, "empty surface"),
        }
        Ok(mesh)
    }

    /// Surfaces the raw volume at `params.threshold`, without masking.
    pub fn extract_isosurface(&self, field: &Volume, params: &ExtractParams) -> MeshResult<Option<TriMesh>> {
        params.validate()?;
        let mesh = self.surface(field, params)?;
        debug!(
            threshold = params.threshold,
            points = mesh.as_ref().map_or(0, TriMesh::vertex_count),
            "threshold extraction"
        );
        Ok(mesh)
    }

    fn surface(&self, field: &Volume, params: &ExtractParams) -> MeshResult<Option<TriMesh>> {
        let blurred;
        let field = if params.sigma > 0.0 {
            blurred = gaussian_filter(field, params.sigma)?;
            &blurred
        } else {
            field
        };
        let mesh = self.isosurfacer.isosurface(field, params.threshold);
        if mesh.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.smoother.smooth(&mesh, params.smooth_iter, params.smooth_relax)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roimesh_core::Vec3;

    fn sharp() -> ExtractParams {
        ExtractParams {
            sigma: 0.0,
            smooth_iter: 0,
            ..ExtractParams::default()
        }
    }

    /// Two boxes labeled 1 and 5, plus a lone voxel labeled 3.
    fn phantom() -> Volume {
        Volume::from_fn([16, 12, 10], Vec3::new(1.0, 1.5, 2.0), Vec3::new(-8.0, 0.0, 5.0), |x, y, z| {
            if (2..6).contains(&x) && (2..6).contains(&y) && (2..6).contains(&z) {
                1.0
            } else if (9..14).contains(&x) && (3..9).contains(&y) && (3..7).contains(&z) {
                5.0
            } else if (x, y, z) == (7, 10, 8) {
                3.0
            } else {
                0.0
            }
        })
        .unwrap()
    }

    #[test]
    fn defaults() {
        let p = ExtractParams::default();
        assert_eq!((p.sigma, p.smooth_iter, p.smooth_relax, p.threshold), (0.8, 30, 0.1, 0.5));
        let b = ExtractParams::batch();
        assert_eq!((b.sigma, b.smooth_iter, b.smooth_relax, b.threshold), (1.0, 50, 0.1, 0.5));
    }

    #[test]
    fn preserves_requested_order_and_omits_absent_labels() {
        let vol = phantom();
        let ex = <LabelMeshExtractor>::default();
        let request = [Label(5.0), Label(42.0), Label(1.0), Label(3.0)];
        let out = ex.extract(&vol, &request, &sharp()).unwrap();
        let labels: Vec<Label> = out.iter().map(|m| m.label).collect();
        assert_eq!(labels, vec![Label(5.0), Label(1.0), Label(3.0)]);
        assert!(out.iter().all(|m| m.mesh.vertex_count() > 0));

        // blurring spreads the lone voxel below the threshold
        let out = ex.extract(&vol, &request, &ExtractParams::default()).unwrap();
        let labels: Vec<Label> = out.iter().map(|m| m.label).collect();
        assert_eq!(labels, vec![Label(5.0), Label(1.0)]);
    }

    #[test]
    fn single_voxel_surfaces_as_closed_octahedron() {
        let vol = Volume::from_fn([10, 10, 10], Vec3::ONE, Vec3::ZERO, |x, y, z| {
            if (x, y, z) == (4, 5, 6) { 3.0 } else { 0.0 }
        })
        .unwrap();
        let out = <LabelMeshExtractor>::default().extract(&vol, &[Label(3.0)], &sharp()).unwrap();
        assert_eq!(out.len(), 1);
        let mesh = &out[0].mesh;
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 8);
        assert!(mesh.is_closed());
    }

    #[test]
    fn surfaces_are_in_world_coordinates() {
        let vol = phantom();
        let out = <LabelMeshExtractor>::default().extract(&vol, &[Label(1.0)], &sharp()).unwrap();
        let b = out[0].mesh.bounds();
        // voxels 2..=5 on each axis, boundary half a voxel outside
        assert_relative_eq!(b.min.x, -8.0 + 1.5);
        assert_relative_eq!(b.max.x, -8.0 + 5.5);
        assert_relative_eq!(b.min.y, 1.5 * 1.5);
        assert_relative_eq!(b.max.z, 5.0 + 2.0 * 5.5);
    }

    #[test]
    fn smoothing_is_deterministic() {
        let vol = phantom();
        let ex = <LabelMeshExtractor>::default();
        let p = ExtractParams::default();
        let a = ex.extract(&vol, &[Label(1.0), Label(5.0)], &p).unwrap();
        let b = ex.extract(&vol, &[Label(1.0), Label(5.0)], &p).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn relaxation_shrinks_faceted_box() {
        let vol = phantom();
        let ex = <LabelMeshExtractor>::default();
        let raw = ex.extract_label(&vol, Label(5.0), &sharp()).unwrap().unwrap();
        let relaxed = ex
            .extract_label(&vol, Label(5.0), &ExtractParams { smooth_iter: 20, ..sharp() })
            .unwrap()
            .unwrap();
        assert_eq!(raw.triangles, relaxed.triangles);
        assert!(relaxed.area() < raw.area());
    }

    #[test]
    fn raw_threshold_extraction() {
        let vol = phantom();
        let ex = <LabelMeshExtractor>::default();
        // everything above 2 is label 3 and 5
        let both = ex
            .extract_isosurface(&vol, &ExtractParams { threshold: 2.0, ..sharp() })
            .unwrap()
            .unwrap();
        let five = ex.extract_label(&vol, Label(5.0), &sharp()).unwrap().unwrap();
        assert!(both.vertex_count() > five.vertex_count());
        assert!(ex
            .extract_isosurface(&vol, &ExtractParams { threshold: 10.0, ..sharp() })
            .unwrap()
            .is_none());
    }

    #[test]
    fn rejects_bad_parameters() {
        let vol = phantom();
        let ex = <LabelMeshExtractor>::default();
        let bad = ExtractParams {
            sigma: f32::NAN,
            ..ExtractParams::default()
        };
        assert!(matches!(
            ex.extract(&vol, &[Label(1.0)], &bad),
            Err(MeshError::InvalidParameter { name: "sigma", .. })
        ));
        let bad = ExtractParams {
            smooth_relax: 1.5,
            ..ExtractParams::default()
        };
        assert!(ex.extract(&vol, &[Label(1.0)], &bad).is_err());
    }

    #[test]
    fn custom_stages_are_used() {
        struct Nothing;
        impl Isosurfacer for Nothing {
            fn isosurface(&self, _: &Volume, _: f32) -> TriMesh {
                TriMesh::default()
            }
        }
        let ex = LabelMeshExtractor::new(Nothing, LaplacianSmoother);
        assert!(ex.extract(&phantom(), &[Label(1.0)], &sharp()).unwrap().is_empty());
    }
}
