//! RGBA8 color buffer with a depth buffer.

use std::path::Path;

use roimesh_core::Rgb;
use roimesh_io::png;

use crate::RenderResult;

/// Rendered image plus per-pixel depth.
///
/// Rows run top to bottom. Depth is normalized device depth in `[0, 1]`,
/// smaller is nearer; cleared pixels hold `f32::INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl Framebuffer {
    /// Buffer filled with `background`.
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        let len = width as usize * height as usize;
        let mut fb = Self {
            width,
            height,
            color: vec![0; len * 4],
            depth: vec![f32::INFINITY; len],
        };
        fb.clear(background);
        fb
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved RGBA bytes.
    #[inline]
    pub fn rgba(&self) -> &[u8] {
        &self.color
    }

    /// Depth samples.
    #[inline]
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Resets every pixel to `background` and infinite depth.
    pub fn clear(&mut self, background: Rgb) {
        for px in self.color.chunks_exact_mut(4) {
            px.copy_from_slice(&[background.r, background.g, background.b, 255]);
        }
        self.depth.fill(f32::INFINITY);
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Color at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let i = self.offset(x, y) * 4;
        Rgb::new(self.color[i], self.color[i + 1], self.color[i + 2])
    }

    /// Depth at `(x, y)`.
    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[self.offset(x, y)]
    }

    /// Writes `color` when `depth` is nearer than what is stored.
    #[inline]
    pub fn plot(&mut self, x: u32, y: u32, depth: f32, color: Rgb) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let o = self.offset(x, y);
        if depth >= self.depth[o] {
            return false;
        }
        self.depth[o] = depth;
        self.color[o * 4..o * 4 + 3].copy_from_slice(&[color.r, color.g, color.b]);
        true
    }

    /// Writes `color` regardless of depth.
    #[inline]
    pub fn overlay(&mut self, x: u32, y: u32, color: Rgb) {
        if x < self.width && y < self.height {
            let o = self.offset(x, y) * 4;
            self.color[o..o + 3].copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    /// Box-filters `factor x factor` blocks into single pixels.
    ///
    /// Each output depth is the nearest depth of its block.
    pub fn downsample(&self, factor: u32) -> Self {
        if factor <= 1 {
            return self.clone();
        }
        let w = self.width / factor;
        let h = self.height / factor;
        let mut out = Self {
            width: w,
            height: h,
            color: vec![0; w as usize * h as usize * 4],
            depth: vec![f32::INFINITY; w as usize * h as usize],
        };
        let n = factor * factor;
        for y in 0..h {
            for x in 0..w {
                let mut sum = [0u32; 3];
                let mut depth = f32::INFINITY;
                for dy in 0..factor {
                    for dx in 0..factor {
                        let o = self.offset(x * factor + dx, y * factor + dy);
                        for c in 0..3 {
                            sum[c] += u32::from(self.color[o * 4 + c]);
                        }
                        depth = depth.min(self.depth[o]);
                    }
                }
                let o = out.offset(x, y);
                for c in 0..3 {
                    out.color[o * 4 + c] = ((sum[c] + n / 2) / n) as u8;
                }
                out.color[o * 4 + 3] = 255;
                out.depth[o] = depth;
            }
        }
        out
    }

    /// Interleaved RGB bytes without alpha.
    pub fn to_rgb(&self) -> Vec<u8> {
        self.color
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }

    /// Writes the image as an RGB PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        png::write(path, self.width, self.height, 3, &self.to_rgb())?;
        Ok(())
    }
}
