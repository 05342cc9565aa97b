//! Marching cubes isosurfacing.
//!
//! Every cell of the voxel lattice (eight neighbouring samples) is classified
//! against the iso-value and triangulated from [`TRI_TABLE`]. Vertices are
//! linearly interpolated along lattice edges and shared between neighbouring
//! cells, so the output is an indexed mesh. Closed level sets give closed,
//! consistently wound surfaces whose normals point toward lower values.
//!
//! A sample exactly at the iso-value counts as inside. Vertices that land
//! exactly on a sample are keyed by that sample, and triangles that collapse as
//! a result are dropped.

use std::collections::HashMap;

use roimesh_core::{Vec3, Volume};

use crate::mesh::TriMesh;
use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, TRI_TABLE};

/// Extracts the surface where a scalar field crosses an iso-value.
pub trait Isosurfacer {
    /// Triangle mesh in world coordinates; empty when the field never crosses `iso`.
    fn isosurface(&self, field: &Volume, iso: f32) -> TriMesh;
}

/// Classic lookup-table marching cubes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarchingCubes;

/// Identity of a surface vertex on the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum VertexKey {
    /// On the lattice edge leaving sample `index` along `axis`.
    Edge { index: usize, axis: u8 },
    /// Exactly on sample `index`.
    Sample { index: usize },
}

struct Builder<'a> {
    field: &'a Volume,
    iso: f32,
    keys: HashMap<VertexKey, u32>,
    positions: Vec<Vec3>,
}

impl Builder<'_> {
    /// Vertex on the lattice edge from `a` to `b` (grid coordinates).
    fn vertex(&mut self, a: [usize; 3], b: [usize; 3]) -> u32 {
        let field = self.field;
        let va = field.data()[field.index(a[0], a[1], a[2])];
        let vb = field.data()[field.index(b[0], b[1], b[2])];
        let denom = vb - va;
        let t = if denom.abs() < f32::EPSILON {
            0.5
        } else {
            ((self.iso - va) / denom).clamp(0.0, 1.0)
        };

        let key = if t <= 0.0 {
            VertexKey::Sample {
                index: field.index(a[0], a[1], a[2]),
            }
        } else if t >= 1.0 {
            VertexKey::Sample {
                index: field.index(b[0], b[1], b[2]),
            }
        } else {
            // edges are keyed from their lower sample
            let (lo, axis) = if a <= b { (a, axis_of(a, b)) } else { (b, axis_of(b, a)) };
            VertexKey::Edge {
                index: field.index(lo[0], lo[1], lo[2]),
                axis,
            }
        };

        if let Some(&id) = self.keys.get(&key) {
            return id;
        }
        let ga = Vec3::new(a[0] as f32, a[1] as f32, a[2] as f32);
        let gb = Vec3::new(b[0] as f32, b[1] as f32, b[2] as f32);
        let pos = field.world(ga + (gb - ga) * t);
        let id = self.positions.len() as u32;
        self.positions.push(pos);
        self.keys.insert(key, id);
        id
    }
}

fn axis_of(lo: [usize; 3], hi: [usize; 3]) -> u8 {
    if hi[0] != lo[0] {
        0
    } else if hi[1] != lo[1] {
        1
    } else {
        2
    }
}

impl Isosurfacer for MarchingCubes {
    fn isosurface(&self, field: &Volume, iso: f32) -> TriMesh {
        let [nx, ny, nz] = field.dims();
        if nx < 2 || ny < 2 || nz < 2 {
            return TriMesh::default();
        }
        let data = field.data();
        let mut builder = Builder {
            field,
            iso,
            keys: HashMap::new(),
            positions: Vec::new(),
        };
        let mut triangles = Vec::new();

        for z in 0..nz - 1 {
            for y in 0..ny - 1 {
                for x in 0..nx - 1 {
                    let corners = CORNER_OFFSETS.map(|[dx, dy, dz]| [x + dx, y + dy, z + dz]);
                    let mut case = 0usize;
                    for (i, c) in corners.iter().enumerate() {
                        if data[field.index(c[0], c[1], c[2])] < iso {
                            case |= 1 << i;
                        }
                    }
                    let row = &TRI_TABLE[case];
                    if row[0] < 0 {
                        continue;
                    }
                    for tri in row.chunks_exact(3).take_while(|t| t[0] >= 0) {
                        let ids = [tri[0], tri[1], tri[2]].map(|e| {
                            let [a, b] = EDGE_CORNERS[e as usize];
                            builder.vertex(corners[a], corners[b])
                        });
                        if ids[0] != ids[1] && ids[1] != ids[2] && ids[0] != ids[2] {
                            triangles.push(ids);
                        }
                    }
                }
            }
        }

        TriMesh::new(builder.positions, triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_voxel(n: usize, at: [usize; 3]) -> Volume {
        Volume::from_fn([n, n, n], Vec3::ONE, Vec3::ZERO, |x, y, z| {
            if [x, y, z] == at { 1.0 } else { 0.0 }
        })
        .unwrap()
    }

    #[test]
    fn single_voxel_gives_octahedron() {
        let vol = single_voxel(10, [5, 5, 5]);
        let mesh = MarchingCubes.isosurface(&vol, 0.5);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 8);
        assert!(mesh.is_closed());
        let c = mesh.centroid();
        assert_relative_eq!(c.x, 5.0, epsilon = 1e-6);
        assert_relative_eq!(c.y, 5.0, epsilon = 1e-6);
        assert_relative_eq!(c.z, 5.0, epsilon = 1e-6);
        for p in &mesh.positions {
            assert_relative_eq!(p.distance(Vec3::splat(5.0)), 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn normals_point_outward() {
        let vol = single_voxel(5, [2, 2, 2]);
        let mesh = MarchingCubes.isosurface(&vol, 0.5);
        let centre = mesh.centroid();
        for i in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(i);
            let mid = (a + b + c) / 3.0;
            assert!(mesh.face_normal(i).dot(mid - centre) > 0.0);
        }
    }

    #[test]
    fn world_coordinates_use_spacing_and_origin() {
        let vol = Volume::from_fn([3, 3, 3], Vec3::new(2.0, 1.0, 0.5), Vec3::new(10.0, -4.0, 3.0), |x, y, z| {
            if (x, y, z) == (1, 1, 1) { 1.0 } else { 0.0 }
        })
        .unwrap();
        let b = MarchingCubes.isosurface(&vol, 0.5).bounds();
        assert_relative_eq!(b.min.x, 10.0 + 1.0);
        assert_relative_eq!(b.max.x, 10.0 + 3.0);
        assert_relative_eq!(b.min.y, -4.0 + 0.5);
        assert_relative_eq!(b.max.z, 3.0 + 0.75);
    }

    #[test]
    fn block_surface_is_closed_and_welded() {
        let vol = Volume::from_fn([8, 8, 8], Vec3::ONE, Vec3::ZERO, |x, y, z| {
            let inside = (2..6).contains(&x) && (2..5).contains(&y) && (3..6).contains(&z);
            if inside { 1.0 } else { 0.0 }
        })
        .unwrap();
        let mesh = MarchingCubes.isosurface(&vol, 0.5);
        assert!(mesh.is_closed());
        // Euler characteristic of a sphere
        let euler = mesh.vertex_count() as i64 - mesh.edges().len() as i64 + mesh.triangle_count() as i64;
        assert_eq!(euler, 2);
    }

    #[test]
    fn no_crossing_gives_empty_mesh() {
        let vol = Volume::zeros([4, 4, 4], Vec3::ONE, Vec3::ZERO).unwrap();
        assert!(MarchingCubes.isosurface(&vol, 0.5).is_empty());
        let flat = Volume::zeros([4, 4, 1], Vec3::ONE, Vec3::ZERO).unwrap();
        assert!(MarchingCubes.isosurface(&flat, 0.5).is_empty());
    }

    #[test]
    fn samples_on_the_iso_value_do_not_duplicate_vertices() {
        let vol = Volume::from_fn([5, 5, 5], Vec3::ONE, Vec3::ZERO, |x, y, z| {
            if (x, y, z) == (2, 2, 2) { 1.0 } else if (1..4).contains(&x) && (1..4).contains(&y) && (1..4).contains(&z) { 0.5 } else { 0.0 }
        })
        .unwrap();
        let mesh = MarchingCubes.isosurface(&vol, 0.5);
        assert!(!mesh.is_empty());
        for [a, b, c] in &mesh.triangles {
            assert!(a != b && b != c && a != c);
        }
        let mut sorted: Vec<[u32; 3]> = mesh
            .positions
            .iter()
            .map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
            .collect();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), mesh.vertex_count());
    }
}
