//! Lighting rig and surface materials.

use glam::Vec3;
use roimesh_core::Style;

/// White directional light shining from `position` toward the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Where the light sits; only its direction matters.
    pub position: Vec3,
    /// Scale applied to diffuse and specular terms.
    pub intensity: f32,
}

impl Light {
    /// Unit vector from a surface toward the light.
    #[inline]
    pub fn to_light(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

/// The fixed three-light rig: key, fill and a low back light.
pub const THREE_POINT: [Light; 3] = [
    Light {
        position: Vec3::new(1.0, 1.0, 1.0),
        intensity: 0.9,
    },
    Light {
        position: Vec3::new(-1.0, -0.5, 1.5),
        intensity: 0.7,
    },
    Light {
        position: Vec3::new(0.0, -1.5, -1.0),
        intensity: 0.5,
    },
];

/// Surface response to light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Ambient coefficient.
    pub ambient: f32,
    /// Diffuse coefficient.
    pub diffuse: f32,
    /// Specular coefficient.
    pub specular: f32,
    /// Specular exponent.
    pub specular_power: f32,
    /// Whether lights affect the surface at all.
    pub lighting: bool,
    /// Gouraud (true) or per-face (false) normals.
    pub smooth: bool,
}

impl Material {
    /// Lit, smooth-shaded surface.
    pub const SHADED: Self = Self {
        ambient: 0.25,
        diffuse: 0.6,
        specular: 0.15,
        specular_power: 5.0,
        lighting: true,
        smooth: true,
    };

    /// [`SHADED`](Self::SHADED) with a brighter ambient term, for batch
    /// screenshots and previews.
    pub const BATCH: Self = Self {
        ambient: 0.3,
        ..Self::SHADED
    };

    /// Unlit flat color.
    pub const FLAT: Self = Self {
        ambient: 1.0,
        diffuse: 0.1,
        specular: 0.0,
        specular_power: 5.0,
        lighting: false,
        smooth: false,
    };

    /// Material used for `style`.
    pub fn for_style(style: Style) -> Self {
        match style {
            Style::Shaded3d => Self::SHADED,
            Style::Flat2d => Self::FLAT,
        }
    }

    /// Linear RGB reflected at a point with unit `normal`, seen along
    /// `to_eye`. The normal is flipped toward the eye first, so both sides
    /// of a surface are lit alike.
    pub fn shade(&self, base: [f32; 3], normal: Vec3, to_eye: Vec3, lights: &[Light]) -> [f32; 3] {
        if !self.lighting {
            return base;
        }
        let n = if normal.dot(to_eye) < 0.0 { -normal } else { normal };
        let mut diffuse = 0.0;
        let mut specular = 0.0;
        for light in lights {
            let l = light.to_light();
            let ndotl = n.dot(l);
            if ndotl <= 0.0 {
                continue;
            }
            diffuse += light.intensity * ndotl;
            let h = (l + to_eye).normalize_or_zero();
            specular += light.intensity * n.dot(h).max(0.0).powf(self.specular_power);
        }
        let k = self.ambient + self.diffuse * diffuse;
        let s = self.specular * specular;
        [
            (base[0] * k + s).min(1.0),
            (base[1] * k + s).min(1.0),
            (base[2] * k + s).min(1.0),
        ]
    }
}
