//! Per-entry breakeven pool-size thresholds.
//!
//! The ingestion layer reads these from the reference spreadsheet, where each
//! investor occupies a fixed column. Here they are keyed by entry index and
//! checked once at construction, so no lookup depends on a column offset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ThresholdError;

/// Validated `entryN -> ordered thresholds` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u32, Vec<f64>>", into = "BTreeMap<u32, Vec<f64>>")]
pub struct BreakevenThresholds {
    by_entry: BTreeMap<u32, Vec<f64>>,
}

impl BreakevenThresholds {
    /// Build from `(entryN, thresholds)` pairs. Later duplicates of an entry
    /// replace earlier ones.
    pub fn new<I>(entries: I) -> Result<Self, ThresholdError>
    where
        I: IntoIterator<Item = (u32, Vec<f64>)>,
    {
        let mut by_entry = BTreeMap::new();
        for (entry_n, thresholds) in entries {
            if entry_n == 0 {
                return Err(ThresholdError::ZeroEntry);
            }
            if thresholds.is_empty() {
                return Err(ThresholdError::Empty(entry_n));
            }
            if let Some(&value) = thresholds.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(ThresholdError::Invalid { entry_n, value });
            }
            by_entry.insert(entry_n, thresholds);
        }
        Ok(Self { by_entry })
    }

    /// All thresholds recorded for `entry_n`.
    pub fn get(&self, entry_n: u32) -> Option<&[f64]> {
        self.by_entry.get(&entry_n).map(Vec::as_slice)
    }

    /// The threshold that decides breakeven: the first one recorded.
    pub fn governing(&self, entry_n: u32) -> Option<f64> {
        self.get(entry_n).and_then(|t| t.first().copied())
    }

    /// Entries in ascending order.
    pub fn entries(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_entry.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entry.is_empty()
    }
}

impl TryFrom<BTreeMap<u32, Vec<f64>>> for BreakevenThresholds {
    type Error = ThresholdError;

    fn try_from(map: BTreeMap<u32, Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

impl From<BreakevenThresholds> for BTreeMap<u32, Vec<f64>> {
    fn from(table: BreakevenThresholds) -> Self {
        table.by_entry
    }
}
