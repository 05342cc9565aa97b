//! Categorical palette.

use roimesh_core::Rgb;

/// Cyclic categorical palette, indexed by a label's ordinal position.
pub const PALETTE: [Rgb; 8] = [
    Rgb::new(0x4C, 0x78, 0xA8),
    Rgb::new(0xE4, 0x57, 0x56),
    Rgb::new(0x72, 0xB7, 0xB2),
    Rgb::new(0xF2, 0x8E, 0x2B),
    Rgb::new(0x59, 0xA1, 0x4F),
    Rgb::new(0xB2, 0x79, 0xA2),
    Rgb::new(0xFF, 0x9D, 0xA6),
    Rgb::new(0x9C, 0x75, 0x5F),
];

/// Color of labels that have no other source.
pub const NEUTRAL: Rgb = Rgb::new(0xCC, 0xCC, 0xCC);

/// Palette entry for ordinal `index`, wrapping around.
#[inline]
pub fn palette_color(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_values() {
        let hex: Vec<String> = PALETTE.iter().map(|c| c.to_hex()).collect();
        assert_eq!(
            hex,
            ["#4C78A8", "#E45756", "#72B7B2", "#F28E2B", "#59A14F", "#B279A2", "#FF9DA6", "#9C755F"]
        );
        assert_eq!(NEUTRAL.to_hex(), "#CCCCCC");
    }

    #[test]
    fn wraps() {
        assert_eq!(palette_color(0), PALETTE[0]);
        assert_eq!(palette_color(9), PALETTE[1]);
    }
}
