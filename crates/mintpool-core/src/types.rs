//! Core records shared by the generator and the analysis engines.
//!
//! All derived records are plain values keyed by mint index (`n`) or entry
//! index (`entry_n`). None of them borrow from, or point into, the sequence
//! they were computed from, so a record stays valid after the sequence that
//! produced it is dropped.

use serde::{Deserialize, Serialize};

use crate::error::ArgumentError;

/// One mint step of the bonding-curve sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// Mint index, starting at 1.
    pub n: u32,
    /// Price paid for this mint.
    pub price: f64,
    /// Portion of the price retained in the shared pool.
    pub pool_contribution: f64,
    /// Portion of the price allocated to the cause.
    pub cause_contribution: f64,
    /// Running pool balance including this step's contribution.
    pub pool_size: f64,
    /// Informational per-step win probability; not used by the engines.
    pub win_probability: f64,
}

/// The step at which a hypothetical participant joins.
///
/// Zero is malformed; an index past the horizon is well-formed but simply
/// absent from the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct EntryPoint(u32);

impl EntryPoint {
    pub fn new(entry_n: u32) -> Result<Self, ArgumentError> {
        if entry_n == 0 {
            return Err(ArgumentError::MalformedEntry(entry_n));
        }
        Ok(Self(entry_n))
    }

    /// The mint index of this entry.
    pub fn n(self) -> u32 {
        self.0
    }

    /// Validate a batch of raw indices, failing on the first malformed one.
    pub fn batch(indices: &[u32]) -> Result<Vec<Self>, ArgumentError> {
        indices.iter().map(|&n| Self::new(n)).collect()
    }
}

impl TryFrom<u32> for EntryPoint {
    type Error = ArgumentError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntryPoint> for u32 {
    fn from(entry: EntryPoint) -> Self {
        entry.0
    }
}

/// Resolved breakeven for one entry; `breakeven_n` is `None` when the
/// horizon runs out first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakevenPoint {
    pub entry_n: u32,
    pub breakeven_n: Option<u32>,
}

impl BreakevenPoint {
    /// Steps between entry and breakeven, if resolved.
    pub fn wait(&self) -> Option<u32> {
        self.breakeven_n.map(|b| b - self.entry_n)
    }

    pub fn is_resolved(&self) -> bool {
        self.breakeven_n.is_some()
    }
}

/// Largest resolved breakeven across a batch.
pub fn max_breakeven(points: &[BreakevenPoint]) -> Option<u32> {
    points.iter().filter_map(|p| p.breakeven_n).max()
}

/// One cohort's share of cause funding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CauseFundingAttribution {
    pub entry_n: u32,
    pub breakeven_n: Option<u32>,
    pub cause_contribution: f64,
    /// Share of the report's denominator, in percent.
    pub percentage: f64,
}

/// Expected outcome for a single entry under the geometric win model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub entry_n: u32,
    pub pool_size_at_entry: f64,
    pub expected_steps_to_win: u64,
    pub expected_cost: f64,
    pub expected_profit: f64,
    pub percentile50_capital: f64,
    pub percentile90_capital: f64,
    pub percentile99_capital: f64,
    /// At least one sum above ran past the end of the sequence and was cut
    /// short. Entries near the horizon are biased downward when set.
    pub horizon_truncated: bool,
}

/// Gross capital needed to keep minting for enough steps to win with a
/// given confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalRequirement {
    pub confidence: f64,
    pub steps: u64,
    pub capital: f64,
    pub truncated: bool,
}

/// A point on an entrant's profit line: value of winning at `n`, net of
/// everything paid since entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitPoint {
    pub n: u32,
    pub profit: f64,
}

/// Cumulative probability of having won within `steps` mints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvePoint {
    pub steps: u32,
    pub cumulative_probability: f64,
}
