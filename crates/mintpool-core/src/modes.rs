//! Named analysis conventions.
//!
//! The historical datasets disagree on how a cohort's cost is measured, what
//! pool value it is measured against, and which total cause funding its share
//! is taken of. Each of those choices is a tagged variant here and must be
//! picked explicitly by the caller.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CAUSE_FEE_RATE, EXPECTED_VALUE_CEILING_MARGIN};
use crate::error::ArgumentError;
use crate::types::StepRecord;

/// How cause funding is measured per step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CauseBasis {
    /// A flat fee rate applied to the mint price.
    #[serde(rename_all = "camelCase")]
    FeeOnPrice { fee_rate: f64 },
    /// The precomputed `causeContribution` column.
    CauseField,
}

impl CauseBasis {
    pub fn fee_on_price(fee_rate: f64) -> Result<Self, ArgumentError> {
        check_fee_rate(fee_rate)?;
        Ok(Self::FeeOnPrice { fee_rate })
    }

    pub fn cause_of(&self, record: &StepRecord) -> f64 {
        match *self {
            Self::FeeOnPrice { fee_rate } => record.price * fee_rate,
            Self::CauseField => record.cause_contribution,
        }
    }

    pub fn validate(&self) -> Result<(), ArgumentError> {
        match *self {
            Self::FeeOnPrice { fee_rate } => check_fee_rate(fee_rate),
            Self::CauseField => Ok(()),
        }
    }
}

impl Default for CauseBasis {
    fn default() -> Self {
        Self::FeeOnPrice { fee_rate: DEFAULT_CAUSE_FEE_RATE }
    }
}

/// What an entrant is charged per step while waiting to win.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CostBasis {
    /// The full mint price.
    GrossPrice,
    /// Only the part of the price that leaves for the cause.
    Cause { basis: CauseBasis },
}

impl CostBasis {
    pub fn cost_of(&self, record: &StepRecord) -> f64 {
        match self {
            Self::GrossPrice => record.price,
            Self::Cause { basis } => basis.cause_of(record),
        }
    }

    pub fn validate(&self) -> Result<(), ArgumentError> {
        match self {
            Self::GrossPrice => Ok(()),
            Self::Cause { basis } => basis.validate(),
        }
    }
}

/// The pool value an entrant stands to win, fixed at entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolReference {
    /// `poolSize(entryN - 1)`: the pool balance already accumulated.
    PoolSizeBeforeEntry,
    /// Sum of `causeContribution` over `[1, entryN)`: the canonical
    /// dataset's "pool at entry".
    CauseFundedBeforeEntry,
}

/// Cost basis and pool reference used to resolve breakevens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakevenRule {
    pub cost: CostBasis,
    pub pool: PoolReference,
}

impl BreakevenRule {
    /// Net cause fee against pre-entry cause funding.
    pub fn canonical(fee_rate: f64) -> Result<Self, ArgumentError> {
        Ok(Self {
            cost: CostBasis::Cause { basis: CauseBasis::fee_on_price(fee_rate)? },
            pool: PoolReference::CauseFundedBeforeEntry,
        })
    }

    pub fn validate(&self) -> Result<(), ArgumentError> {
        self.cost.validate()
    }
}

impl Default for BreakevenRule {
    fn default() -> Self {
        Self {
            cost: CostBasis::Cause { basis: CauseBasis::default() },
            pool: PoolReference::CauseFundedBeforeEntry,
        }
    }
}

/// How long a cohort is assumed to keep paying into the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AttributionMode {
    /// The cohort exits exactly at its resolved breakeven.
    BreakevenExit,
    /// The cohort exits at its win step, weighted by the geometric pmf.
    /// `ceiling` caps the win steps considered; `None` uses the largest
    /// resolved breakeven plus a fixed margin.
    ExpectedValue { ceiling: Option<u32> },
}

impl AttributionMode {
    /// Effective win-step ceiling for an expected-value sum.
    pub fn ceiling(&self, max_breakeven: Option<u32>, n_max: u32) -> u32 {
        match *self {
            Self::BreakevenExit => n_max,
            Self::ExpectedValue { ceiling: Some(c) } => c.min(n_max),
            Self::ExpectedValue { ceiling: None } => max_breakeven
                .map(|b| b.saturating_add(EXPECTED_VALUE_CEILING_MARGIN))
                .unwrap_or(n_max)
                .min(n_max),
        }
    }
}

/// Total cause funding that cohort shares are expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Denominator {
    /// `causeContribution` summed over `[1, max resolved breakeven]`.
    ThroughMaxBreakeven,
    /// Only cohorts entering within `[start, end]` are reported, and the
    /// denominator is the sum of their own contributions.
    EntryWindow { start: u32, end: u32 },
    /// `causeContribution` summed over the whole sequence.
    FullSequence,
}

impl Denominator {
    pub fn validate(&self) -> Result<(), ArgumentError> {
        match *self {
            Self::EntryWindow { start, end } if start > end => {
                Err(ArgumentError::InvertedWindow { start, end })
            }
            _ => Ok(()),
        }
    }

    /// Whether a cohort entering at `entry_n` is part of the report.
    pub fn admits(&self, entry_n: u32) -> bool {
        match *self {
            Self::EntryWindow { start, end } => (start..=end).contains(&entry_n),
            _ => true,
        }
    }
}

/// Everything an attribution run fixes up front.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionRequest {
    pub mode: AttributionMode,
    pub basis: CauseBasis,
    pub denominator: Denominator,
}

impl AttributionRequest {
    pub fn validate(&self) -> Result<(), ArgumentError> {
        self.basis.validate()?;
        self.denominator.validate()
    }
}

fn check_fee_rate(fee_rate: f64) -> Result<(), ArgumentError> {
    if !(0.0..=1.0).contains(&fee_rate) {
        return Err(ArgumentError::FeeRateOutOfRange(fee_rate));
    }
    Ok(())
}
