//! 8-bit display colors.
//!
//! Colors travel through the session as [`Rgb`] and are shown to the user in
//! upper-case `#RRGGBB` form.
//!
//! ```rust
//! use roimesh_core::Rgb;
//!
//! let c: Rgb = "#4c78a8".parse()?;
//! assert_eq!(c.to_hex(), "#4C78A8");
//! assert_eq!(Rgb::parse("white")?, Rgb::WHITE);
//! # Ok::<(), roimesh_core::Error>(())
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// sRGB color with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

const NAMED: &[(&str, Rgb)] = &[
    ("white", Rgb::WHITE),
    ("black", Rgb::BLACK),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("orange", Rgb::new(255, 165, 0)),
];

impl Rgb {
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Creates a color from channel bytes.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` or `#RGB`. The leading `#` is optional.
    pub fn from_hex(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor(s.to_string());
        let digits = s.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let byte = |i: usize, w: usize| u8::from_str_radix(&digits[i..i + w], 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self::new(byte(0, 2)?, byte(2, 2)?, byte(4, 2)?)),
            3 => {
                let (r, g, b) = (byte(0, 1)?, byte(1, 1)?, byte(2, 1)?);
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            _ => Err(invalid()),
        }
    }

    /// Parses a hex color or one of the basic CSS names.
    pub fn parse(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some((_, c)) = NAMED.iter().find(|(name, _)| *name == lower) {
            return Ok(*c);
        }
        Self::from_hex(&lower)
    }

    /// Upper-case `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Channels scaled to `0.0..=1.0`.
    #[inline]
    pub fn to_f32(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// Quantizes `0.0..=1.0` channels, clamping out-of-range input.
    #[inline]
    pub fn from_f32(c: [f32; 3]) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        Self::new(q(c[0]), q(c[1]), q(c[2]))
    }

    /// Per-channel linear blend; `t = 0` gives `self`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let a = self.to_f32();
        let b = other.to_f32();
        Self::from_f32([
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
        ])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        assert_eq!(Rgb::from_hex("#4C78A8").unwrap(), Rgb::new(0x4C, 0x78, 0xA8));
        assert_eq!(Rgb::from_hex("e45756").unwrap(), Rgb::new(0xE4, 0x57, 0x56));
        assert_eq!(Rgb::from_hex("#fff").unwrap(), Rgb::WHITE);
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#zzzzzz").is_err());
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn names_and_display() {
        assert_eq!(Rgb::parse("White").unwrap(), Rgb::WHITE);
        assert_eq!(Rgb::parse("grey").unwrap(), Rgb::parse("gray").unwrap());
        assert_eq!(Rgb::new(34, 34, 34).to_string(), "#222222");
    }

    #[test]
    fn lerp_endpoints() {
        let a = Rgb::BLACK;
        let b = Rgb::WHITE;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(128, 128, 128));
    }
}
