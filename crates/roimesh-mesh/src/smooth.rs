//! Laplacian mesh relaxation.

use roimesh_core::Vec3;
use tracing::trace;

use crate::mesh::TriMesh;

/// Relaxes a mesh to reduce faceting.
pub trait MeshSmoother {
    /// Returns a smoothed copy with the same connectivity.
    ///
    /// `iterations == 0` returns the mesh unchanged.
    fn smooth(&self, mesh: &TriMesh, iterations: usize, relaxation: f32) -> TriMesh;
}

/// Umbrella-operator smoothing: every vertex moves toward the mean of its
/// edge neighbours by `relaxation` per iteration. All vertices are updated
/// from the previous iteration's positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaplacianSmoother;

impl MeshSmoother for LaplacianSmoother {
    fn smooth(&self, mesh: &TriMesh, iterations: usize, relaxation: f32) -> TriMesh {
        if iterations == 0 || relaxation == 0.0 || mesh.is_empty() {
            return mesh.clone();
        }
        let neighbours = mesh.neighbours();
        let mut current = mesh.positions.clone();
        let mut next = current.clone();

        for _ in 0..iterations {
            for (i, adj) in neighbours.iter().enumerate() {
                if adj.is_empty() {
                    next[i] = current[i];
                    continue;
                }
                let sum: Vec3 = adj.iter().map(|&j| current[j as usize]).sum();
                let mean = sum / adj.len() as f32;
                next[i] = current[i] + (mean - current[i]) * relaxation;
            }
            std::mem::swap(&mut current, &mut next);
        }
        trace!(iterations, relaxation, vertices = current.len(), "laplacian smoothing");

        TriMesh::new(current, mesh.triangles.clone())
    }
}
