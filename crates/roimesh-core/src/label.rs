//! Region labels.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::Error;

/// Identifier of one labeled region: a distinct non-zero voxel value.
///
/// Holds the exact sample as stored in a [`crate::Volume`], so masks compare
/// with `==` and fractional atlases keep every region. Equality and hashing
/// follow the bit pattern; ordering is the IEEE total order.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Label(pub f32);

impl Label {
    /// Converts a sample or table value to a label.
    ///
    /// Returns `None` for zero (background) and non-finite values. The value
    /// is narrowed to `f32`, the voxel sample type.
    pub fn from_value(v: f64) -> Option<Self> {
        let sample = v as f32;
        if sample == 0.0 || !sample.is_finite() {
            return None;
        }
        Some(Self(sample))
    }

    /// Sample value.
    #[inline]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Value as stored in a voxel grid.
    #[inline]
    pub fn as_f32(self) -> f32 {
        self.0
    }

    /// Whether the label has no fractional part.
    pub fn is_integral(self) -> bool {
        self.0.fract() == 0.0
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Label {
    /// `3` for integral labels, `1.5` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Label {
    type Err = Error;

    /// Accepts `"3"`, `"3.0"` and fractional spellings such as `"1.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Self::from_value)
            .ok_or_else(|| Error::InvalidLabel(trimmed.to_string()))
    }
}
