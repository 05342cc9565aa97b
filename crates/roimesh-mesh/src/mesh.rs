//! Indexed triangle meshes.

use std::collections::HashMap;

use roimesh_core::{Bounds, Vec3};

/// Indexed triangle surface in world coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Counter-clockwise vertex index triples.
    pub triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Creates a mesh from positions and triangles.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            triangles,
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True when the mesh has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// World-space bounds of all vertices.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.positions)
    }

    /// Corner positions of triangle `i`.
    #[inline]
    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[i];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// Unit normal of triangle `i`, zero for degenerate triangles.
    pub fn face_normal(&self, i: usize) -> Vec3 {
        let [a, b, c] = self.triangle(i);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Area-weighted unit vertex normals.
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for (i, tri) in self.triangles.iter().enumerate() {
            let [a, b, c] = self.triangle(i);
            // cross product length is twice the area
            let n = (b - a).cross(c - a);
            for &v in tri {
                normals[v as usize] += n;
            }
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        normals
    }

    /// Unique undirected edges as `[low, high]` pairs, sorted.
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut edges: Vec<[u32; 2]> = self
            .triangles
            .iter()
            .flat_map(|&[a, b, c]| [[a, b], [b, c], [c, a]])
            .map(|[p, q]| [p.min(q), p.max(q)])
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Edge-connected neighbours of every vertex, sorted and unique.
    pub fn neighbours(&self) -> Vec<Vec<u32>> {
        let mut adj = vec![Vec::new(); self.positions.len()];
        for [a, b] in self.edges() {
            adj[a as usize].push(b);
            adj[b as usize].push(a);
        }
        for list in &mut adj {
            list.sort_unstable();
        }
        adj
    }

    /// Whether every edge is shared by exactly two triangles with opposite
    /// directions, i.e. the surface is closed and consistently wound.
    pub fn is_closed(&self) -> bool {
        let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
        for &[a, b, c] in &self.triangles {
            for e in [(a, b), (b, c), (c, a)] {
                *directed.entry(e).or_default() += 1;
            }
        }
        !directed.is_empty()
            && directed
                .iter()
                .all(|(&(a, b), &n)| n == 1 && directed.get(&(b, a)) == Some(&1))
    }

    /// Total surface area.
    pub fn area(&self) -> f32 {
        (0..self.triangles.len())
            .map(|i| {
                let [a, b, c] = self.triangle(i);
                (b - a).cross(c - a).length() * 0.5
            })
            .sum()
    }

    /// Mean vertex position.
    pub fn centroid(&self) -> Vec3 {
        if self.positions.is_empty() {
            return Vec3::ZERO;
        }
        self.positions.iter().copied().sum::<Vec3>() / self.positions.len() as f32
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Unit octahedron centred at the origin, outward winding.
    pub(crate) fn octahedron() -> TriMesh {
        let positions = vec![
            Vec3::X,
            Vec3::NEG_X,
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::Z,
            Vec3::NEG_Z,
        ];
        let triangles = vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        TriMesh::new(positions, triangles)
    }

    #[test]
    fn octahedron_topology() {
        let m = octahedron();
        assert!(m.is_closed());
        assert_eq!(m.edges().len(), 12);
        assert_eq!(m.neighbours()[4], vec![0, 1, 2, 3]);
        assert_relative_eq!(m.centroid().length(), 0.0);
    }

    #[test]
    fn normals_point_outward() {
        let m = octahedron();
        for (p, n) in m.positions.iter().zip(m.vertex_normals()) {
            assert_relative_eq!(p.dot(n), 1.0, epsilon = 1e-5);
        }
        assert!(m.face_normal(0).dot(Vec3::ONE) > 0.0);
    }

    #[test]
    fn open_surface_is_not_closed() {
        let mut m = octahedron();
        m.triangles.pop();
        assert!(!m.is_closed());
        assert!(!TriMesh::default().is_closed());
    }

    #[test]
    fn bounds_and_area() {
        let m = octahedron();
        let b = m.bounds();
        assert_eq!(b.min, Vec3::splat(-1.0));
        assert_eq!(b.max, Vec3::splat(1.0));
        // eight equilateral faces with side sqrt(2)
        assert_relative_eq!(m.area(), 8.0 * (3f32.sqrt() / 4.0) * 2.0, epsilon = 1e-5);
    }
}
