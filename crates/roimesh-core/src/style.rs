//! Presentation choices: rendering style and camera view presets.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Surface rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Style {
    /// Lit, smooth-shaded perspective rendering.
    #[default]
    Shaded3d,
    /// Unlit flat-colored orthographic rendering.
    Flat2d,
}

impl Style {
    /// Every style, in menu order.
    pub const ALL: [Style; 2] = [Style::Shaded3d, Style::Flat2d];

    /// Menu caption.
    pub fn label(self) -> &'static str {
        match self {
            Style::Shaded3d => "3D shading",
            Style::Flat2d => "2D flat",
        }
    }

    /// Short name used on the command line and in scripts.
    pub fn name(self) -> &'static str {
        match self {
            Style::Shaded3d => "3d",
            Style::Flat2d => "2d",
        }
    }

    /// Whether this is the flat 2D style.
    #[inline]
    pub fn is_flat(self) -> bool {
        self == Style::Flat2d
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "3d" | "3d shading" | "shaded" => Ok(Style::Shaded3d),
            "2d" | "2d flat" | "flat" => Ok(Style::Flat2d),
            other => Err(Error::UnknownName {
                kind: "style",
                name: other.to_string(),
                expected: "3d, 2d".to_string(),
            }),
        }
    }
}

/// Named camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViewPreset {
    /// Camera on the -X side looking toward +X.
    Left,
    /// Camera on the +X side.
    Right,
    /// Camera above, on the +Z side.
    Top,
    /// Camera on the -Y side.
    Front,
    /// Isometric reset.
    #[default]
    Iso,
}

impl ViewPreset {
    /// Every preset, in menu order.
    pub const ALL: [ViewPreset; 5] = [
        ViewPreset::Left,
        ViewPreset::Right,
        ViewPreset::Top,
        ViewPreset::Front,
        ViewPreset::Iso,
    ];

    /// Lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            ViewPreset::Left => "left",
            ViewPreset::Right => "right",
            ViewPreset::Top => "top",
            ViewPreset::Front => "front",
            ViewPreset::Iso => "iso",
        }
    }

    /// Resolves a preset name, treating anything unrecognized as [`ViewPreset::Iso`].
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(ViewPreset::Iso)
    }
}

impl fmt::Display for ViewPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ViewPreset::ALL
            .into_iter()
            .find(|v| v.name() == lower)
            .ok_or_else(|| Error::UnknownName {
                kind: "view",
                name: lower,
                expected: "iso, left, right, top, front".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_names_round_trip() {
        for v in ViewPreset::ALL {
            assert_eq!(v.name().parse::<ViewPreset>().unwrap(), v);
        }
        assert!("back".parse::<ViewPreset>().is_err());
    }

    #[test]
    fn unknown_view_falls_back_to_iso() {
        assert_eq!(ViewPreset::from_name("diagonal"), ViewPreset::Iso);
        assert_eq!(ViewPreset::from_name("TOP"), ViewPreset::Top);
    }

    #[test]
    fn style_aliases() {
        assert_eq!("2D flat".parse::<Style>().unwrap(), Style::Flat2d);
        assert_eq!("3d".parse::<Style>().unwrap(), Style::Shaded3d);
        assert!("wire".parse::<Style>().is_err());
    }
}
