//! Software triangle rasterization.
//!
//! Triangles are projected through the camera, filled with edge functions
//! and depth-tested per pixel. The shaded style renders at twice the target
//! resolution and box-filters down; the flat style renders at 1x.

use glam::{Mat4, Vec2, Vec3};
use roimesh_core::Rgb;
use roimesh_mesh::TriMesh;
use tracing::trace;

use crate::camera::{Camera, Projection};
use crate::framebuffer::Framebuffer;
use crate::light::{Light, Material};
use crate::scene::{RenderOptions, Scene};

/// Supersampling factor used for the shaded style.
pub const SUPERSAMPLE: u32 = 2;

/// Color of the edge overlay.
pub const EDGE_COLOR: Rgb = Rgb::new(0x22, 0x22, 0x22);

const EDGE_DEPTH_BIAS: f32 = 2e-4;

// segments reaching far off screen are walked at a capped resolution
const MAX_LINE_STEPS: f32 = 16384.0;

const AXIS_COLORS: [Rgb; 3] = [
    Rgb::new(220, 50, 47),
    Rgb::new(40, 160, 60),
    Rgb::new(38, 110, 210),
];

/// Turns a scene into pixels.
pub trait Rasterizer {
    /// Draws `scene` as seen by `camera` into a new framebuffer of the
    /// size in `options`.
    fn rasterize(&self, scene: &Scene, camera: &Camera, options: &RenderOptions) -> Framebuffer;
}

/// CPU scanline rasterizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareRasterizer;

/// Sampling factor for a scene.
pub fn supersample_for(scene: &Scene) -> u32 {
    if scene.style.is_flat() { 1 } else { SUPERSAMPLE }
}

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(&self, scene: &Scene, camera: &Camera, options: &RenderOptions) -> Framebuffer {
        let ss = supersample_for(scene);
        let mut fb = Framebuffer::new(options.width * ss, options.height * ss, options.background);
        let view_proj = camera.projection_matrix(options.aspect()) * camera.view_matrix();
        let target = Target {
            view_proj,
            width: fb.width() as f32,
            height: fb.height() as f32,
        };
        let material = scene.material();

        for item in &scene.items {
            fill_mesh(&mut fb, &target, &item.mesh, item.color, &material, &scene.lights, camera);
        }
        if scene.edges_visible() {
            for item in &scene.items {
                draw_edges(&mut fb, &target, &item.mesh, ss);
            }
        }
        trace!(items = scene.items.len(), ss, "rasterized");

        let mut fb = fb.downsample(ss);
        if options.show_axes {
            draw_axes(&mut fb, camera);
        }
        fb
    }
}

/// Projection into one framebuffer.
struct Target {
    view_proj: Mat4,
    width: f32,
    height: f32,
}

impl Target {
    /// Screen position and depth, or `None` behind the eye.
    fn project(&self, p: Vec3) -> Option<Vec3> {
        let clip = self.view_proj * p.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec3::new(
            (ndc.x * 0.5 + 0.5) * self.width,
            (1.0 - (ndc.y * 0.5 + 0.5)) * self.height,
            ndc.z,
        ))
    }
}

fn to_eye(camera: &Camera, p: Vec3) -> Vec3 {
    match camera.projection {
        Projection::Parallel => -camera.direction(),
        Projection::Perspective => (camera.position - p).normalize_or(-camera.direction()),
    }
}

fn fill_mesh(
    fb: &mut Framebuffer,
    target: &Target,
    mesh: &TriMesh,
    color: Rgb,
    material: &Material,
    lights: &[Light],
    camera: &Camera,
) {
    let base = color.to_f32();
    let screen: Vec<Option<Vec3>> = mesh.positions.iter().map(|&p| target.project(p)).collect();

    // Gouraud: shade once per vertex, interpolate across faces
    let vertex_colors: Vec<[f32; 3]> = if material.lighting && material.smooth {
        mesh.vertex_normals()
            .iter()
            .zip(&mesh.positions)
            .map(|(&n, &p)| material.shade(base, n, to_eye(camera, p), lights))
            .collect()
    } else {
        Vec::new()
    };

    for (t, tri) in mesh.triangles.iter().enumerate() {
        let idx = tri.map(|i| i as usize);
        let (Some(a), Some(b), Some(c)) = (screen[idx[0]], screen[idx[1]], screen[idx[2]]) else {
            continue;
        };
        let colors = if !vertex_colors.is_empty() {
            idx.map(|i| vertex_colors[i])
        } else if material.lighting {
            let [p0, p1, p2] = mesh.triangle(t);
            let centroid = (p0 + p1 + p2) / 3.0;
            let c = material.shade(base, mesh.face_normal(t), to_eye(camera, centroid), lights);
            [c; 3]
        } else {
            [base; 3]
        };
        fill_triangle(fb, [a, b, c], colors);
    }
}

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Fills one screen-space triangle; both windings are drawn.
fn fill_triangle(fb: &mut Framebuffer, v: [Vec3; 3], colors: [[f32; 3]; 3]) {
    let [a, b, c] = v.map(|p| p.truncate());
    let area = edge(a, b, c);
    if area.abs() < 1e-12 {
        return;
    }
    let w = fb.width() as f32;
    let h = fb.height() as f32;
    let min = a.min(b).min(c).max(Vec2::ZERO);
    let max = a.max(b).max(c).min(Vec2::new(w - 1.0, h - 1.0));
    if min.x > max.x || min.y > max.y {
        return;
    }
    let inv_area = 1.0 / area;

    for y in min.y.floor() as u32..=max.y.ceil() as u32 {
        for x in min.x.floor() as u32..=max.x.ceil() as u32 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(b, c, p) * inv_area;
            let w1 = edge(c, a, p) * inv_area;
            let w2 = 1.0 - w0 - w1;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let z = w0 * v[0].z + w1 * v[1].z + w2 * v[2].z;
            if !(0.0..=1.0).contains(&z) {
                continue;
            }
            let mut rgb = [0.0; 3];
            for (k, out) in rgb.iter_mut().enumerate() {
                *out = w0 * colors[0][k] + w1 * colors[1][k] + w2 * colors[2][k];
            }
            fb.plot(x, y, z, Rgb::from_f32(rgb));
        }
    }
}

fn draw_edges(fb: &mut Framebuffer, target: &Target, mesh: &TriMesh, thickness: u32) {
    let screen: Vec<Option<Vec3>> = mesh.positions.iter().map(|&p| target.project(p)).collect();
    for [i, j] in mesh.edges() {
        if let (Some(a), Some(b)) = (screen[i as usize], screen[j as usize]) {
            draw_line(fb, a, b, thickness, |fb, x, y, z| {
                fb.plot(x, y, z - EDGE_DEPTH_BIAS, EDGE_COLOR);
            });
        }
    }
}

/// Walks the segment `a..b` in screen space, calling `put` for each
/// covered pixel of a `thickness`-wide pen.
fn draw_line<F>(fb: &mut Framebuffer, a: Vec3, b: Vec3, thickness: u32, mut put: F)
where
    F: FnMut(&mut Framebuffer, u32, u32, f32),
{
    let d = b - a;
    let steps = d.x.abs().max(d.y.abs()).ceil().clamp(1.0, MAX_LINE_STEPS) as u32;
    let half = (thickness / 2) as i64;
    for s in 0..=steps {
        let p = a + d * (s as f32 / steps as f32);
        if !(0.0..=1.0).contains(&p.z) {
            continue;
        }
        let (cx, cy) = (p.x.floor() as i64, p.y.floor() as i64);
        for oy in 0..thickness as i64 {
            for ox in 0..thickness as i64 {
                let (x, y) = (cx + ox - half, cy + oy - half);
                if x >= 0 && y >= 0 {
                    put(fb, x as u32, y as u32, p.z);
                }
            }
        }
    }
}

/// Orientation triad in the lower-left corner, drawn over the image.
fn draw_axes(fb: &mut Framebuffer, camera: &Camera) {
    let size = (fb.width().min(fb.height()) as f32 * 0.08).max(12.0);
    let margin = 8.0;
    let origin = Vec3::new(margin + size, fb.height() as f32 - margin - size, 0.0);
    let view = camera.view_matrix();

    let mut axes: Vec<(Vec3, Rgb)> = [Vec3::X, Vec3::Y, Vec3::Z]
        .into_iter()
        .zip(AXIS_COLORS)
        .map(|(axis, color)| (view.transform_vector3(axis), color))
        .collect();
    // axes pointing away from the viewer first
    axes.sort_by(|a, b| a.0.z.total_cmp(&b.0.z));

    for (dir, color) in axes {
        let end = origin + Vec3::new(dir.x, -dir.y, 0.0) * size;
        draw_line(fb, origin, end, 2, |fb, x, y, _| fb.overlay(x, y, color));
    }
}
