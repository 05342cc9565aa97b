//! Named continuous colormaps.
//!
//! Every map is defined by a handful of color stops and expanded once into a
//! 256-entry lookup table, the same resolution the usual plotting libraries
//! use. Tables are built on first use and shared for the life of the process.
//!
//! # Example
//!
//! ```rust
//! use roimesh_color::Colormap;
//!
//! let viridis = Colormap::by_name("viridis")?;
//! assert_eq!(viridis.sample(0.0).to_hex(), "#440154");
//! assert_eq!(viridis.sample(1.0).to_hex(), "#FDE725");
//! # Ok::<(), roimesh_color::ColorError>(())
//! ```

use std::sync::OnceLock;

use roimesh_core::Rgb;

use crate::{ColorError, ColorResult};

/// Entries per lookup table.
pub const LUT_SIZE: usize = 256;

/// Name of the map used until another is chosen.
pub const DEFAULT_COLORMAP: &str = "viridis";

/// Broad family of a colormap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColormapKind {
    /// Perceptually uniform sequential maps.
    Perceptual,
    /// Single- and multi-hue sequential maps.
    Sequential,
    /// Maps with a neutral midpoint.
    Diverging,
    /// Simple RGB ramps.
    Classic,
}

/// Color stops of one map.
enum Stops {
    /// `0xRRGGBB` colors spaced evenly over `[0, 1]`.
    Even(&'static [u32]),
    /// `(position, [r, g, b])` pairs with increasing positions from 0 to 1.
    At(&'static [(f32, [f32; 3])]),
}

struct Definition {
    name: &'static str,
    kind: ColormapKind,
    stops: Stops,
}

use ColormapKind::*;

#[rustfmt::skip]
const DEFINITIONS: &[Definition] = &[
    Definition { name: "viridis", kind: Perceptual, stops: Stops::Even(&[
        0x440154, 0x472C7A, 0x3B518B, 0x2C718E, 0x21908D, 0x27AD81, 0x5CC863, 0xAADC32, 0xFDE725]) },
    Definition { name: "plasma", kind: Perceptual, stops: Stops::Even(&[
        0x0D0887, 0x4C02A1, 0x7E03A8, 0xA92395, 0xCC4778, 0xE56B5D, 0xF89441, 0xFDC328, 0xF0F921]) },
    Definition { name: "inferno", kind: Perceptual, stops: Stops::Even(&[
        0x000004, 0x1F0C48, 0x550F6D, 0x88226A, 0xBA3655, 0xE35933, 0xF98E09, 0xF8C932, 0xFCFFA4]) },
    Definition { name: "magma", kind: Perceptual, stops: Stops::Even(&[
        0x000004, 0x1C1044, 0x4F127B, 0x812581, 0xB5367A, 0xE55064, 0xFB8761, 0xFEC287, 0xFCFDBF]) },
    Definition { name: "cividis", kind: Perceptual, stops: Stops::Even(&[
        0x00224E, 0x22386C, 0x4A4D6D, 0x666370, 0x7F7C75, 0x9A9177, 0xB7AA6F, 0xD6C364, 0xFEE838]) },
    Definition { name: "Reds", kind: Sequential, stops: Stops::Even(&[
        0xFFF5F0, 0xFEE0D2, 0xFCBBA1, 0xFC9272, 0xFB6A4A, 0xEF3B2C, 0xCB181D, 0xA50F15, 0x67000D]) },
    Definition { name: "Blues", kind: Sequential, stops: Stops::Even(&[
        0xF7FBFF, 0xDEEBF7, 0xC6DBEF, 0x9ECAE1, 0x6BAED6, 0x4292C6, 0x2171B5, 0x08519C, 0x08306B]) },
    Definition { name: "Greens", kind: Sequential, stops: Stops::Even(&[
        0xF7FCF5, 0xE5F5E0, 0xC7E9C0, 0xA1D99B, 0x74C476, 0x41AB5D, 0x238B45, 0x006D2C, 0x00441B]) },
    Definition { name: "Oranges", kind: Sequential, stops: Stops::Even(&[
        0xFFF5EB, 0xFEE6CE, 0xFDD0A2, 0xFDAE6B, 0xFD8D3C, 0xF16913, 0xD94801, 0xA63603, 0x7F2704]) },
    Definition { name: "Purples", kind: Sequential, stops: Stops::Even(&[
        0xFCFBFD, 0xEFEDF5, 0xDADAEB, 0xBCBDDC, 0x9E9AC8, 0x807DBA, 0x6A51A3, 0x54278F, 0x3F007D]) },
    Definition { name: "RdBu", kind: Diverging, stops: Stops::Even(&[
        0x67001F, 0xB2182B, 0xD6604D, 0xF4A582, 0xFDDBC7, 0xF7F7F7, 0xD1E5F0, 0x92C5DE, 0x4393C3, 0x2166AC, 0x053061]) },
    Definition { name: "RdYlBu", kind: Diverging, stops: Stops::Even(&[
        0xA50026, 0xD73027, 0xF46D43, 0xFDAE61, 0xFEE090, 0xFFFFBF, 0xE0F3F8, 0xABD9E9, 0x74ADD1, 0x4575B4, 0x313695]) },
    Definition { name: "RdYlGn", kind: Diverging, stops: Stops::Even(&[
        0xA50026, 0xD73027, 0xF46D43, 0xFDAE61, 0xFEE08B, 0xFFFFBF, 0xD9EF8B, 0xA6D96A, 0x66BD63, 0x1A9850, 0x006837]) },
    Definition { name: "Spectral", kind: Diverging, stops: Stops::Even(&[
        0x9E0142, 0xD53E4F, 0xF46D43, 0xFDAE61, 0xFEE08B, 0xFFFFBF, 0xE6F598, 0xABDDA4, 0x66C2A5, 0x3288BD, 0x5E4FA2]) },
    Definition { name: "coolwarm", kind: Diverging, stops: Stops::Even(&[
        0x3B4CC0, 0x5A78E4, 0x7B9FF9, 0x9EBEFF, 0xC0D4F5, 0xDDDCDC, 0xF2CBB7, 0xF7AC8E, 0xEE8468, 0xD65244, 0xB40426]) },
    Definition { name: "hot", kind: Classic, stops: Stops::At(&[
        (0.0, [0.0416, 0.0, 0.0]), (0.365, [1.0, 0.0, 0.0]), (0.746, [1.0, 1.0, 0.0]), (1.0, [1.0, 1.0, 1.0])]) },
    Definition { name: "cool", kind: Classic, stops: Stops::At(&[(0.0, [0.0, 1.0, 1.0]), (1.0, [1.0, 0.0, 1.0])]) },
    Definition { name: "spring", kind: Classic, stops: Stops::At(&[(0.0, [1.0, 0.0, 1.0]), (1.0, [1.0, 1.0, 0.0])]) },
    Definition { name: "summer", kind: Classic, stops: Stops::At(&[(0.0, [0.0, 0.5, 0.4]), (1.0, [1.0, 1.0, 0.4])]) },
    Definition { name: "autumn", kind: Classic, stops: Stops::At(&[(0.0, [1.0, 0.0, 0.0]), (1.0, [1.0, 1.0, 0.0])]) },
    Definition { name: "winter", kind: Classic, stops: Stops::At(&[(0.0, [0.0, 0.0, 1.0]), (1.0, [0.0, 1.0, 0.5])]) },
    Definition { name: "YlOrRd", kind: Sequential, stops: Stops::Even(&[
        0xFFFFCC, 0xFFEDA0, 0xFED976, 0xFEB24C, 0xFD8D3C, 0xFC4E2A, 0xE31A1C, 0xBD0026, 0x800026]) },
    Definition { name: "YlGnBu", kind: Sequential, stops: Stops::Even(&[
        0xFFFFD9, 0xEDF8B1, 0xC7E9B4, 0x7FCDBB, 0x41B6C4, 0x1D91C0, 0x225EA8, 0x253494, 0x081D58]) },
    Definition { name: "PuBuGn", kind: Sequential, stops: Stops::Even(&[
        0xFFF7FB, 0xECE2F0, 0xD0D1E6, 0xA6BDDB, 0x67A9CF, 0x3690C0, 0x02818A, 0x016C59, 0x014636]) },
    Definition { name: "BuPu", kind: Sequential, stops: Stops::Even(&[
        0xF7FCFD, 0xE0ECF4, 0xBFD3E6, 0x9EBCDA, 0x8C96C6, 0x8C6BB1, 0x88419D, 0x810F7C, 0x4D004B]) },
    Definition { name: "GnBu", kind: Sequential, stops: Stops::Even(&[
        0xF7FCF0, 0xE0F3DB, 0xCCEBC5, 0xA8DDB5, 0x7BCCC4, 0x4EB3D3, 0x2B8CBE, 0x0868AC, 0x084081]) },
];

/// A sampled colormap.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: &'static str,
    kind: ColormapKind,
    lut: Vec<[f32; 3]>,
}

fn registry() -> &'static [Colormap] {
    static MAPS: OnceLock<Vec<Colormap>> = OnceLock::new();
    MAPS.get_or_init(|| DEFINITIONS.iter().map(Colormap::build).collect())
}

/// Names of all colormaps in display order.
pub fn colormap_names() -> impl Iterator<Item = &'static str> {
    DEFINITIONS.iter().map(|d| d.name)
}

fn unpack(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

impl Colormap {
    fn build(def: &Definition) -> Self {
        let stops: Vec<(f32, [f32; 3])> = match def.stops {
            Stops::Even(hex) => {
                let last = (hex.len() - 1) as f32;
                hex.iter()
                    .enumerate()
                    .map(|(i, &h)| (i as f32 / last, unpack(h)))
                    .collect()
            }
            Stops::At(stops) => stops.to_vec(),
        };

        let lut = (0..LUT_SIZE)
            .map(|i| {
                let x = i as f32 / (LUT_SIZE - 1) as f32;
                let k = stops
                    .windows(2)
                    .position(|w| x <= w[1].0)
                    .unwrap_or(stops.len() - 2);
                let (x0, c0) = stops[k];
                let (x1, c1) = stops[k + 1];
                let t = if x1 > x0 { ((x - x0) / (x1 - x0)).clamp(0.0, 1.0) } else { 0.0 };
                [
                    c0[0] + (c1[0] - c0[0]) * t,
                    c0[1] + (c1[1] - c0[1]) * t,
                    c0[2] + (c1[2] - c0[2]) * t,
                ]
            })
            .collect();

        Self {
            name: def.name,
            kind: def.kind,
            lut,
        }
    }

    /// Looks up a map by name. Exact matches win over case-insensitive ones.
    pub fn by_name(name: &str) -> ColorResult<&'static Colormap> {
        let maps = registry();
        maps.iter()
            .find(|m| m.name == name)
            .or_else(|| maps.iter().find(|m| m.name.eq_ignore_ascii_case(name)))
            .ok_or_else(|| ColorError::UnknownColormap {
                name: name.to_string(),
                supported: colormap_names().collect::<Vec<_>>().join(", "),
            })
    }

    /// The default map.
    pub fn default_map() -> &'static Colormap {
        // registry order follows DEFINITIONS, which starts with viridis
        &registry()[0]
    }

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Family of the map.
    pub fn kind(&self) -> ColormapKind {
        self.kind
    }

    /// Color at normalized position `t`, clamped to `[0, 1]`.
    ///
    /// Picks the table entry `floor(t * 256)`, with `t = 1` mapping to the last one.
    pub fn sample(&self, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let i = ((t * LUT_SIZE as f32) as usize).min(LUT_SIZE - 1);
        Rgb::from_f32(self.lut[i])
    }

    /// `width` evenly spaced samples from 0 to 1, for a colorbar strip.
    pub fn gradient(&self, width: usize) -> Vec<Rgb> {
        match width {
            0 => Vec::new(),
            1 => vec![self.sample(0.0)],
            _ => (0..width)
                .map(|i| self.sample(i as f32 / (width - 1) as f32))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_names_resolve() {
        let names: Vec<&str> = colormap_names().collect();
        assert_eq!(names.len(), 26);
        for name in names {
            let map = Colormap::by_name(name).unwrap();
            assert_eq!(map.name(), name);
            assert_eq!(map.lut.len(), LUT_SIZE);
        }
    }

    #[test]
    fn default_is_viridis() {
        assert_eq!(Colormap::default_map().name(), DEFAULT_COLORMAP);
    }

    #[test]
    fn endpoints_match_stops() {
        let reds = Colormap::by_name("Reds").unwrap();
        assert_eq!(reds.sample(0.0).to_hex(), "#FFF5F0");
        assert_eq!(reds.sample(1.0).to_hex(), "#67000D");
        let hot = Colormap::by_name("hot").unwrap();
        assert_eq!(hot.sample(1.0), Rgb::WHITE);
        let winter = Colormap::by_name("winter").unwrap();
        assert_eq!(winter.sample(0.0), Rgb::new(0, 0, 255));
    }

    #[test]
    fn diverging_midpoint_is_light() {
        let rdbu = Colormap::by_name("RdBu").unwrap();
        let mid = rdbu.sample(0.5);
        assert!(mid.r > 230 && mid.g > 230 && mid.b > 230);
    }

    #[test]
    fn out_of_range_clamps() {
        let map = Colormap::by_name("plasma").unwrap();
        assert_eq!(map.sample(-3.0), map.sample(0.0));
        assert_eq!(map.sample(7.0), map.sample(1.0));
        assert_eq!(map.sample(f32::NAN), map.sample(0.0));
    }

    #[test]
    fn case_insensitive_fallback() {
        assert_eq!(Colormap::by_name("reds").unwrap().name(), "Reds");
        assert_eq!(Colormap::by_name("VIRIDIS").unwrap().name(), "viridis");
    }

    #[test]
    fn unknown_name_lists_supported() {
        let err = Colormap::by_name("jet").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("jet"));
        assert!(msg.contains("viridis"));
        assert!(msg.contains("GnBu"));
    }

    #[test]
    fn gradient_strip() {
        let map = Colormap::by_name("magma").unwrap();
        assert!(map.gradient(0).is_empty());
        let g = map.gradient(64);
        assert_eq!(g.len(), 64);
        assert_eq!(g[0], map.sample(0.0));
        assert_eq!(g[63], map.sample(1.0));
    }
}
