//! The canonical step sequence.
//!
//! [`generate`] evaluates the discretised bonding curve for `n = 1..=n_max`.
//! The running state compounds unrounded; only emitted fields are rounded,
//! to the fixed precisions of the reference dataset:
//!
//! | field | decimals |
//! |---|---|
//! | `price` | 12 |
//! | `poolContribution`, `causeContribution`, `poolSize` | 6 |
//! | `winProbability` | 10 |
//!
//! A [`StepSequence`] is always contiguous from `n = 1`, which is what lets
//! lookups by `n` run in constant time.

use serde::Serialize;
use tracing::debug;

use crate::constants::{
    CONTRIBUTION_DECIMALS, POOL_RECURRENCE_TOLERANCE, POOL_SIZE_DECIMALS, PRICE_DECIMALS,
    PROBABILITY_DECIMALS,
};
use crate::error::{ArgumentError, MintpoolError, SequenceError};
use crate::params::{CurveParams, ModelParams};
use crate::types::StepRecord;

/// Validated, immutable step sequence, contiguous from `n = 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StepSequence {
    records: Vec<StepRecord>,
}

impl StepSequence {
    /// Validate an externally loaded dataset.
    ///
    /// Checks that `n` runs `1, 2, 3, …` with no gaps and every field is
    /// finite. Price and both contributions must be positive, the win
    /// probability must lie in `[0, 1]`, and the pool-size recurrence must
    /// hold within [`POOL_RECURRENCE_TOLERANCE`].
    pub fn from_records(records: Vec<StepRecord>) -> Result<Self, SequenceError> {
        if records.is_empty() {
            return Err(SequenceError::Empty);
        }

        let mut previous_pool = 0.0;
        for (position, r) in records.iter().enumerate() {
            let expected = position as u32 + 1;
            if r.n != expected {
                return Err(SequenceError::NonContiguous { position, expected, got: r.n });
            }
            for (field, value) in [
                ("price", r.price),
                ("poolContribution", r.pool_contribution),
                ("causeContribution", r.cause_contribution),
                ("poolSize", r.pool_size),
                ("winProbability", r.win_probability),
            ] {
                if !value.is_finite() {
                    return Err(SequenceError::NonFinite { n: r.n, field });
                }
            }
            for (field, value) in [
                ("price", r.price),
                ("poolContribution", r.pool_contribution),
                ("causeContribution", r.cause_contribution),
            ] {
                if value <= 0.0 {
                    return Err(SequenceError::NonPositive { n: r.n, field, value });
                }
            }
            if !(0.0..=1.0).contains(&r.win_probability) {
                return Err(SequenceError::ProbabilityOutOfRange { n: r.n, value: r.win_probability });
            }
            let expected_pool = previous_pool + r.pool_contribution;
            if (r.pool_size - expected_pool).abs() > POOL_RECURRENCE_TOLERANCE {
                return Err(SequenceError::PoolDrift { n: r.n, expected: expected_pool, got: r.pool_size });
            }
            previous_pool = r.pool_size;
        }

        Ok(Self { records })
    }

    /// Record at mint index `n`, if within the horizon.
    pub fn get(&self, n: u32) -> Option<&StepRecord> {
        let index = (n as usize).checked_sub(1)?;
        self.records.get(index)
    }

    pub fn contains(&self, n: u32) -> bool {
        n >= 1 && n <= self.n_max()
    }

    /// Last mint index.
    pub fn n_max(&self) -> u32 {
        self.records.len() as u32
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false: construction rejects empty sequences.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StepRecord> {
        self.records.iter()
    }

    /// Records with `n` in `[from, to]`, clipped to the horizon.
    pub fn range(&self, from: u32, to: u32) -> &[StepRecord] {
        let start = (from.max(1) as usize - 1).min(self.records.len());
        let end = (to.min(self.n_max()) as usize).max(start);
        &self.records[start..end]
    }

    /// `poolSize` before step `n` is minted; zero for `n <= 1`.
    pub fn pool_size_before(&self, n: u32) -> f64 {
        match n.checked_sub(1).and_then(|prev| self.get(prev)) {
            Some(r) => r.pool_size,
            None if n > self.n_max() => self.records.last().map_or(0.0, |r| r.pool_size),
            None => 0.0,
        }
    }
}

impl<'a> IntoIterator for &'a StepSequence {
    type Item = &'a StepRecord;
    type IntoIter = std::slice::Iter<'a, StepRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Where a sequence comes from.
#[derive(Debug, Clone)]
pub enum SequenceSource {
    /// Evaluate the bonding curve.
    Generated(ModelParams),
    /// Validate an externally loaded dataset.
    Ingested(Vec<StepRecord>),
}

impl SequenceSource {
    pub fn load(self) -> Result<StepSequence, MintpoolError> {
        match self {
            Self::Generated(params) => Ok(generate(&params)?),
            Self::Ingested(records) => Ok(StepSequence::from_records(records)?),
        }
    }
}

/// Round `value` to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Evaluate the bonding curve over `params.n_max` steps.
pub fn generate(params: &ModelParams) -> Result<StepSequence, ArgumentError> {
    params.validate()?;
    generate_curve(&params.curve, params.n_max)
}

/// Evaluate `curve` for `n = 1..=n_max`.
pub fn generate_curve(curve: &CurveParams, n_max: u32) -> Result<StepSequence, ArgumentError> {
    if n_max == 0 {
        return Err(ArgumentError::ZeroHorizon);
    }
    curve.validate()?;

    let mut records = Vec::with_capacity(n_max as usize);
    let mut price = curve.initial_price;
    let mut pool_contribution = curve.initial_pool_contribution;
    let mut cause_contribution = curve.initial_cause_contribution;
    let mut pool_size = curve.initial_pool_contribution;

    for n in 1..=n_max {
        let exponent = f64::from(n - 1) / curve.win_probability_doubling;
        let win_probability = (curve.win_probability_base * exponent.exp2()).min(1.0);

        records.push(StepRecord {
            n,
            price: round_to(price, PRICE_DECIMALS),
            pool_contribution: round_to(pool_contribution, CONTRIBUTION_DECIMALS),
            cause_contribution: round_to(cause_contribution, CONTRIBUTION_DECIMALS),
            pool_size: round_to(pool_size, POOL_SIZE_DECIMALS),
            win_probability: round_to(win_probability, PROBABILITY_DECIMALS),
        });

        price *= curve.price_growth;
        pool_contribution *= curve.pool_growth;
        cause_contribution *= curve.cause_growth;
        pool_size += pool_contribution;
    }

    debug!(n_max, final_pool = pool_size, "generated step sequence");
    Ok(StepSequence { records })
}

/// Downsample for display: every `ceil(len / max_points)`-th record, plus
/// the last record if the stride skipped it.
///
/// Financial computations always run on the full sequence.
pub fn sample(sequence: &StepSequence, max_points: usize) -> Result<Vec<StepRecord>, ArgumentError> {
    if max_points == 0 {
        return Err(ArgumentError::ZeroCount { name: "maxPoints" });
    }
    let records = sequence.records();
    if records.len() <= max_points {
        return Ok(records.to_vec());
    }

    let stride = records.len().div_ceil(max_points);
    let mut sampled: Vec<StepRecord> = records.iter().step_by(stride).copied().collect();
    if let Some(&last) = records.last() {
        if sampled.last().map(|r| r.n) != Some(last.n) {
            sampled.push(last);
        }
    }
    Ok(sampled)
}
