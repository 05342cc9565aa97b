//! Value ranges for colormap normalization.

use roimesh_core::ValueTable;

use crate::{ColorError, ColorResult};

/// `[min, max]` bounds that map values onto `[0, 1]` before colormap lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColormapRange {
    /// Value mapped to 0.
    pub min: f64,
    /// Value mapped to 1.
    pub max: f64,
}

impl Default for ColormapRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl ColormapRange {
    /// Validated range. `min == max` is allowed and maps everything to 0.
    pub fn new(min: f64, max: f64) -> ColorResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ColorError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Range covering all values in `table` plus a margin of 5% of their
    /// span on both sides, or 0.1 when every value is equal.
    ///
    /// `None` for an empty table.
    pub fn auto(table: &ValueTable) -> Option<Self> {
        let (lo, hi) = table.min_max()?;
        let margin = if hi > lo { (hi - lo) * 0.05 } else { 0.1 };
        Some(Self {
            min: lo - margin,
            max: hi + margin,
        })
    }

    /// Position of `value` in the range, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0) as f32
    }
}
