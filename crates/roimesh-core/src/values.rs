//! Per-label numeric values.
//!
//! A [`ValueTable`] maps labels to one scalar each (an overlap score, a
//! weight, a statistic). The color resolver uses it to drive colormap
//! coloring. Tables are usually loaded from CSV by `roimesh-io`.

use std::collections::BTreeMap;

use crate::label::Label;

/// Mapping Label -> value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    values: BTreeMap<Label, f64>,
}

impl ValueTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of `label`, replacing any previous entry.
    pub fn insert(&mut self, label: Label, value: f64) {
        self.values.insert(label, value);
    }

    /// Value of `label`, if present.
    pub fn get(&self, label: Label) -> Option<f64> {
        self.values.get(&label).copied()
    }

    /// Whether `label` has a value.
    pub fn contains(&self, label: Label) -> bool {
        self.values.contains_key(&label)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, f64)> + '_ {
        self.values.iter().map(|(&l, &v)| (l, v))
    }

    /// Smallest and largest value, or `None` when empty.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.values.values().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

impl FromIterator<(Label, f64)> for ValueTable {
    fn from_iter<I: IntoIterator<Item = (Label, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
