//! Per-label color assignment.
//!
//! [`ColorResolver`] holds the current color of every label in one of two
//! modes:
//!
//! - **Palette**: label `i` in ordinal order gets `PALETTE[i % 8]`. Users may
//!   override single labels.
//! - **Colormap**: a label with a value gets the colormap color of its
//!   normalized value, every other label gets [`NEUTRAL`].
//!
//! Leaving colormap mode, clearing the values, or repopulating the labels
//! reassigns palette colors by ordinal position and drops user overrides.
//!
//! # Example
//!
//! ```rust
//! use roimesh_color::{ColorResolver, PALETTE};
//! use roimesh_core::{Label, ValueTable};
//!
//! let mut colors = ColorResolver::new();
//! colors.populate(&[Label(1.0), Label(2.0)]);
//! assert_eq!(colors.color(Label(2.0)), PALETTE[1]);
//!
//! let values: ValueTable = [(Label(1.0), 0.2), (Label(2.0), 0.8)].into_iter().collect();
//! colors.set_values(values);
//! colors.set_use_colormap(true)?;
//! assert_ne!(colors.color(Label(2.0)), PALETTE[1]);
//! # Ok::<(), roimesh_color::ColorError>(())
//! ```

use std::collections::HashMap;

use roimesh_core::{Label, Rgb, ValueTable};
use tracing::debug;

use crate::colormap::Colormap;
use crate::palette::{NEUTRAL, palette_color};
use crate::range::ColormapRange;
use crate::{ColorError, ColorResult};

/// Where label colors come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorMode {
    /// Ordinal palette with optional per-label overrides.
    #[default]
    Palette,
    /// Value table through a colormap.
    Colormap,
}

/// Label color state.
#[derive(Debug, Clone)]
pub struct ColorResolver {
    labels: Vec<Label>,
    colors: HashMap<Label, Rgb>,
    values: Option<ValueTable>,
    mode: ColorMode,
    colormap: &'static Colormap,
    range: ColormapRange,
}

impl Default for ColorResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorResolver {
    /// No labels, palette mode, default colormap and range.
    pub fn new() -> Self {
        Self {
            labels: Vec::new(),
            colors: HashMap::new(),
            values: None,
            mode: ColorMode::Palette,
            colormap: Colormap::default_map(),
            range: ColormapRange::default(),
        }
    }

    /// Replaces the label list. Their order defines the ordinal positions.
    pub fn populate(&mut self, labels: &[Label]) {
        self.labels = labels.to_vec();
        self.recolor();
    }

    /// Labels in ordinal order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Ordinal position of `label`.
    pub fn ordinal(&self, label: Label) -> Option<usize> {
        self.labels.iter().position(|&l| l == label)
    }

    /// Current color of `label`, neutral when it has none.
    pub fn color(&self, label: Label) -> Rgb {
        self.colors.get(&label).copied().unwrap_or(NEUTRAL)
    }

    /// One color per requested label, in the same order.
    pub fn resolve(&self, labels: &[Label]) -> Vec<(Label, Rgb)> {
        labels.iter().map(|&l| (l, self.color(l))).collect()
    }

    /// Overrides the color of known labels; returns how many were changed.
    pub fn set_color(&mut self, labels: &[Label], color: Rgb) -> usize {
        let mut changed = 0;
        for &label in labels {
            if self.labels.contains(&label) {
                self.colors.insert(label, color);
                changed += 1;
            }
        }
        debug!(color = %color, changed, "color override");
        changed
    }

    /// Active mode.
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Switches between palette and colormap coloring.
    ///
    /// Colormap mode needs a value table; without one this fails with
    /// [`ColorError::NoValues`] and nothing changes.
    pub fn set_use_colormap(&mut self, enabled: bool) -> ColorResult<()> {
        let mode = if enabled {
            if self.values.is_none() {
                return Err(ColorError::NoValues);
            }
            ColorMode::Colormap
        } else {
            ColorMode::Palette
        };
        self.mode = mode;
        self.recolor();
        Ok(())
    }

    /// Installs a value table and auto-ranges over it.
    ///
    /// An empty table changes nothing and returns `false`.
    pub fn set_values(&mut self, table: ValueTable) -> bool {
        let Some(range) = ColormapRange::auto(&table) else {
            return false;
        };
        debug!(entries = table.len(), min = range.min, max = range.max, "values installed");
        self.range = range;
        self.values = Some(table);
        if self.mode == ColorMode::Colormap {
            self.recolor();
        }
        true
    }

    /// Drops the value table and returns to palette coloring.
    pub fn clear_values(&mut self) {
        self.values = None;
        self.mode = ColorMode::Palette;
        self.recolor();
    }

    /// Loaded values, if any.
    pub fn values(&self) -> Option<&ValueTable> {
        self.values.as_ref()
    }

    /// Value of `label`, if loaded.
    pub fn value(&self, label: Label) -> Option<f64> {
        self.values.as_ref().and_then(|t| t.get(label))
    }

    /// List text for a label: `"3"`, or `"3 (0.250)"` when it has a value.
    pub fn display_text(&self, label: Label) -> String {
        match self.value(label) {
            Some(v) => format!("{label} ({v:.3})"),
            None => label.to_string(),
        }
    }

    /// Active colormap.
    pub fn colormap(&self) -> &'static Colormap {
        self.colormap
    }

    /// Selects a colormap by name.
    pub fn set_colormap(&mut self, name: &str) -> ColorResult<()> {
        self.colormap = Colormap::by_name(name)?;
        if self.mode == ColorMode::Colormap {
            self.recolor();
        }
        Ok(())
    }

    /// Active normalization range.
    pub fn range(&self) -> ColormapRange {
        self.range
    }

    /// Sets the normalization range explicitly.
    pub fn set_range(&mut self, range: ColormapRange) {
        self.range = range;
        if self.mode == ColorMode::Colormap {
            self.recolor();
        }
    }

    /// Re-derives the range from the loaded values, if any.
    pub fn auto_range(&mut self) -> Option<ColormapRange> {
        let range = ColormapRange::auto(self.values.as_ref()?)?;
        self.set_range(range);
        Some(range)
    }

    fn recolor(&mut self) {
        self.colors.clear();
        match (self.mode, &self.values) {
            (ColorMode::Colormap, Some(values)) => {
                for &label in &self.labels {
                    let color = match values.get(label) {
                        Some(v) => self.colormap.sample(self.range.normalize(v)),
                        None => NEUTRAL,
                    };
                    self.colors.insert(label, color);
                }
            }
            _ => {
                for (i, &label) in self.labels.iter().enumerate() {
                    self.colors.insert(label, palette_color(i));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE;

    fn labels(n: u8) -> Vec<Label> {
        (1..=n).map(|i| Label(f32::from(i))).collect()
    }

    fn values() -> ValueTable {
        [(Label(1.0), 0.2), (Label(2.0), 0.8)].into_iter().collect()
    }

    #[test]
    fn palette_by_ordinal_wraps() {
        let mut r = ColorResolver::new();
        r.populate(&labels(10));
        assert_eq!(r.color(Label(1.0)), PALETTE[0]);
        assert_eq!(r.color(Label(8.0)), PALETTE[7]);
        assert_eq!(r.color(Label(9.0)), PALETTE[0]);
        assert_eq!(r.color(Label(99.0)), NEUTRAL);
    }

    #[test]
    fn ordinal_follows_population_order() {
        let mut r = ColorResolver::new();
        r.populate(&[Label(7.0), Label(2.0)]);
        assert_eq!(r.color(Label(7.0)), PALETTE[0]);
        assert_eq!(r.color(Label(2.0)), PALETTE[1]);
        assert_eq!(r.ordinal(Label(2.0)), Some(1));
    }

    #[test]
    fn resolve_gives_one_color_per_label() {
        let mut r = ColorResolver::new();
        r.populate(&labels(3));
        let got = r.resolve(&[Label(3.0), Label(1.0)]);
        assert_eq!(got, vec![(Label(3.0), PALETTE[2]), (Label(1.0), PALETTE[0])]);
    }

    #[test]
    fn overrides_persist_until_repopulated() {
        let mut r = ColorResolver::new();
        r.populate(&labels(3));
        let red = Rgb::new(255, 0, 0);
        assert_eq!(r.set_color(&[Label(2.0), Label(42.0)], red), 1);
        assert_eq!(r.color(Label(2.0)), red);
        r.set_values(values());
        assert_eq!(r.color(Label(2.0)), red);
        r.populate(&labels(3));
        assert_eq!(r.color(Label(2.0)), PALETTE[1]);
    }

    #[test]
    fn colormap_requires_values() {
        let mut r = ColorResolver::new();
        r.populate(&labels(2));
        assert!(matches!(r.set_use_colormap(true), Err(ColorError::NoValues)));
        assert_eq!(r.mode(), ColorMode::Palette);
    }

    #[test]
    fn colormap_mode_colors_by_value() {
        let mut r = ColorResolver::new();
        r.populate(&labels(3));
        assert!(r.set_values(values()));
        r.set_use_colormap(true).unwrap();
        let map = Colormap::default_map();
        // auto range [0.17, 0.83]
        assert_eq!(r.color(Label(1.0)), map.sample(0.03 / 0.66));
        assert_eq!(r.color(Label(2.0)), map.sample(0.63 / 0.66));
        // no value, no palette fallback
        assert_eq!(r.color(Label(3.0)), NEUTRAL);
    }

    #[test]
    fn leaving_colormap_mode_drops_overrides() {
        let mut r = ColorResolver::new();
        r.populate(&labels(3));
        r.set_values(values());
        r.set_use_colormap(true).unwrap();
        r.set_color(&[Label(3.0)], Rgb::BLACK);
        r.set_use_colormap(false).unwrap();
        assert_eq!(r.resolve(&labels(3)).into_iter().map(|(_, c)| c).collect::<Vec<_>>(), PALETTE[..3]);
    }

    #[test]
    fn clearing_values_returns_to_palette() {
        let mut r = ColorResolver::new();
        r.populate(&labels(2));
        r.set_values(values());
        r.set_use_colormap(true).unwrap();
        r.clear_values();
        assert_eq!(r.mode(), ColorMode::Palette);
        assert!(r.values().is_none());
        assert_eq!(r.color(Label(2.0)), PALETTE[1]);
        assert!(r.set_use_colormap(true).is_err());
    }

    #[test]
    fn empty_table_is_ignored() {
        let mut r = ColorResolver::new();
        r.populate(&labels(2));
        r.set_values(values());
        assert!(!r.set_values(ValueTable::new()));
        assert_eq!(r.values(), Some(&values()));
    }

    #[test]
    fn colormap_and_range_changes_recolor() {
        let mut r = ColorResolver::new();
        r.populate(&labels(2));
        r.set_values(values());
        r.set_use_colormap(true).unwrap();
        let before = r.color(Label(2.0));
        r.set_colormap("Reds").unwrap();
        assert_ne!(r.color(Label(2.0)), before);
        assert!(r.set_colormap("nope").is_err());
        assert_eq!(r.colormap().name(), "Reds");

        r.set_range(ColormapRange::new(0.0, 0.2).unwrap());
        assert_eq!(r.color(Label(2.0)), r.colormap().sample(1.0));
        let auto = r.auto_range().unwrap();
        assert!((auto.min - 0.17).abs() < 1e-12);
    }

    #[test]
    fn display_text() {
        let mut r = ColorResolver::new();
        r.populate(&labels(3));
        r.set_values(values());
        assert_eq!(r.display_text(Label(1.0)), "1 (0.200)");
        assert_eq!(r.display_text(Label(3.0)), "3");
    }
}
