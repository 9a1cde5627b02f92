//! Risk and expectation engine.
//!
//! Prices an entry under a [`WinModel`]: how long the entrant should expect
//! to mint before winning, what that costs, and how much capital covers the
//! 50th, 90th and 99th percentile waits. Every sum is taken over the
//! recorded prices from the entry step onward and stops at the end of the
//! sequence; nothing is extrapolated past the horizon.

use std::collections::BTreeSet;

use mintpool_core::error::ArgumentError;
use mintpool_core::modes::CauseBasis;
use mintpool_core::traits::WinModel;
use mintpool_core::types::{CapitalRequirement, EntryPoint, RiskAnalysis};
use mintpool_core::StepSequence;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::prefix::PrefixSums;

/// Confidence levels reported on every [`RiskAnalysis`].
pub const REPORTED_CONFIDENCES: [f64; 3] = [0.5, 0.9, 0.99];

/// What minting until a confident win costs and returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceOutcome {
    pub entry_n: u32,
    pub confidence: f64,
    pub steps: u64,
    /// Sum of gross prices over the steps.
    pub gross_capital: f64,
    /// The cause's share of the gross outlay.
    pub net_cost: f64,
    /// Pool at entry minus the net cost.
    pub profit: f64,
    /// `profit / net_cost` in percent; zero when nothing was paid.
    pub roi_percent: f64,
    pub truncated: bool,
}

/// Risk analysis over one sequence with one win model.
#[derive(Debug, Clone)]
pub struct RiskEngine<'a, M: WinModel> {
    sequence: &'a StepSequence,
    model: &'a M,
    fee_rate: f64,
    gross: PrefixSums,
}

impl<'a, M: WinModel> RiskEngine<'a, M> {
    pub fn new(sequence: &'a StepSequence, model: &'a M, fee_rate: f64) -> Result<Self, ArgumentError> {
        CauseBasis::fee_on_price(fee_rate)?;
        Ok(Self {
            sequence,
            model,
            fee_rate,
            gross: PrefixSums::new(sequence, |r| r.price),
        })
    }

    /// Gross price over `steps` mints starting at `entry_n`, and whether the
    /// window ran past the horizon.
    fn gross_over(&self, entry_n: u32, steps: u64) -> (f64, bool) {
        if steps == 0 {
            return (0.0, false);
        }
        let last = u64::from(entry_n).saturating_add(steps - 1);
        let n_max = u64::from(self.sequence.n_max());
        let to = last.min(n_max) as u32;
        (self.gross.range(entry_n, to), last > n_max)
    }

    /// Capital needed to keep minting from `entry_n` until a win is reached
    /// with probability `confidence`. `None` if the entry is not in the
    /// sequence.
    pub fn capital_requirement(
        &self,
        entry: EntryPoint,
        confidence: f64,
    ) -> Result<Option<CapitalRequirement>, ArgumentError> {
        let steps = self.model.steps_for_confidence(confidence)?;
        let entry_n = entry.n();
        if !self.sequence.contains(entry_n) {
            return Ok(None);
        }
        let (capital, truncated) = self.gross_over(entry_n, steps);
        Ok(Some(CapitalRequirement { confidence, steps, capital, truncated }))
    }

    /// Full risk profile for one entry; `None` if it is not in the sequence.
    pub fn analyze_entry(&self, entry: EntryPoint) -> Result<Option<RiskAnalysis>, ArgumentError> {
        let entry_n = entry.n();
        let Some(record) = self.sequence.get(entry_n) else {
            return Ok(None);
        };

        let expected_steps = self.model.expected_steps();
        let (expected_gross, mut truncated) = self.gross_over(entry_n, expected_steps);
        let expected_cost = self.fee_rate * expected_gross;

        let mut capital = [0.0; REPORTED_CONFIDENCES.len()];
        for (slot, &confidence) in capital.iter_mut().zip(REPORTED_CONFIDENCES.iter()) {
            let steps = self.model.steps_for_confidence(confidence)?;
            let (value, cut) = self.gross_over(entry_n, steps);
            *slot = value;
            truncated |= cut;
        }

        trace!(entry_n, expected_cost, truncated, "analyzed entry");
        Ok(Some(RiskAnalysis {
            entry_n,
            pool_size_at_entry: record.pool_size,
            expected_steps_to_win: expected_steps,
            expected_cost,
            expected_profit: record.pool_size - expected_cost,
            percentile50_capital: capital[0],
            percentile90_capital: capital[1],
            percentile99_capital: capital[2],
            horizon_truncated: truncated,
        }))
    }

    /// Risk profiles for a batch, ascending by entry with duplicates
    /// collapsed. Entries outside the sequence are omitted.
    pub fn analyze(&self, entries: &[EntryPoint]) -> Result<Vec<RiskAnalysis>, ArgumentError> {
        let unique: BTreeSet<EntryPoint> = entries.iter().copied().collect();
        let mut out = Vec::with_capacity(unique.len());
        for entry in unique {
            if let Some(analysis) = self.analyze_entry(entry)? {
                out.push(analysis);
            }
        }
        let truncated = out.iter().filter(|a| a.horizon_truncated).count();
        if truncated > 0 {
            warn!(truncated, n_max = self.sequence.n_max(), "risk sums cut short at the horizon");
        }
        debug!(requested = entries.len(), reported = out.len(), "analyzed risk");
        Ok(out)
    }

    /// Outcome of minting from `entry_n` until a win at `confidence`.
    pub fn confidence_outcome(
        &self,
        entry: EntryPoint,
        confidence: f64,
    ) -> Result<Option<ConfidenceOutcome>, ArgumentError> {
        let Some(requirement) = self.capital_requirement(entry, confidence)? else {
            return Ok(None);
        };
        let entry_n = entry.n();
        let pool = self.sequence.get(entry_n).map_or(0.0, |r| r.pool_size);
        let net_cost = self.fee_rate * requirement.capital;
        let profit = pool - net_cost;
        let roi_percent = if net_cost > 0.0 { profit / net_cost * 100.0 } else { 0.0 };
        Ok(Some(ConfidenceOutcome {
            entry_n,
            confidence,
            steps: requirement.steps,
            gross_capital: requirement.capital,
            net_cost,
            profit,
            roi_percent,
            truncated: requirement.truncated,
        }))
    }
}

/// Risk profiles for a batch of entries.
pub fn analyze<M: WinModel>(
    sequence: &StepSequence,
    entries: &[EntryPoint],
    model: &M,
    fee_rate: f64,
) -> Result<Vec<RiskAnalysis>, ArgumentError> {
    RiskEngine::new(sequence, model, fee_rate)?.analyze(entries)
}

/// Outcome of minting from `entry` until a win at `confidence`.
pub fn confidence_outcome<M: WinModel>(
    sequence: &StepSequence,
    entry: EntryPoint,
    confidence: f64,
    model: &M,
    fee_rate: f64,
) -> Result<Option<ConfidenceOutcome>, ArgumentError> {
    RiskEngine::new(sequence, model, fee_rate)?.confidence_outcome(entry, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometric::GeometricModel;
    use mintpool_core::generate;
    use mintpool_core::params::ModelParams;
    use proptest::prelude::*;

    fn canonical() -> (StepSequence, GeometricModel) {
        let seq = generate(&ModelParams::default()).unwrap();
        (seq, GeometricModel::new(1.0 / 256.0).unwrap())
    }

    fn entry(n: u32) -> EntryPoint {
        EntryPoint::new(n).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn first_investor_expects_256_steps() {
        let (seq, model) = canonical();
        let out = analyze(&seq, &[entry(11)], &model, 0.2).unwrap();
        assert_eq!(out.len(), 1);
        let a = &out[0];
        assert_eq!(a.expected_steps_to_win, 256);
        assert_eq!(a.pool_size_at_entry, seq.get(11).unwrap().pool_size);
        assert!(approx(a.expected_cost, 0.1320378491186));
        assert!(approx(a.expected_profit, 0.02211 - 0.1320378491186));
        assert!(approx(a.percentile50_capital, 0.452389798592));
        assert!(approx(a.percentile90_capital, 1.577836196205));
        // 11 + 1177 runs past step 999.
        assert!(a.horizon_truncated);
    }

    #[test]
    fn expected_cost_matches_direct_sum() {
        let (seq, model) = canonical();
        let a = analyze(&seq, &[entry(131)], &model, 0.2).unwrap()[0];
        let direct: f64 = seq.range(131, 386).iter().map(|r| r.price).sum::<f64>() * 0.2;
        assert!(approx(a.expected_cost, direct));
        assert!(a.expected_profit > 0.0);
    }

    #[test]
    fn last_step_is_truncated() {
        let (seq, model) = canonical();
        let a = analyze(&seq, &[entry(999)], &model, 0.2).unwrap()[0];
        let price = seq.get(999).unwrap().price;
        assert!(a.horizon_truncated);
        assert!(approx(a.expected_cost, 0.2 * price));
        assert!(approx(a.percentile50_capital, price));
        assert!(approx(a.percentile99_capital, price));
    }

    #[test]
    fn tiny_win_probability_saturates_to_horizon() {
        let (seq, _) = canonical();
        let model = GeometricModel::new(1e-20).unwrap();
        let a = analyze(&seq, &[entry(11)], &model, 0.2).unwrap()[0];
        let rest: f64 = seq.range(11, 999).iter().map(|r| r.price).sum();
        assert!(a.horizon_truncated);
        assert!(approx(a.expected_cost, 0.2 * rest));
        assert!(approx(a.percentile99_capital, rest));

        let req = RiskEngine::new(&seq, &model, 0.2)
            .unwrap()
            .capital_requirement(entry(11), 0.5)
            .unwrap()
            .unwrap();
        assert!(req.truncated);
        assert!(approx(req.capital, rest));
    }

    #[test]
    fn capital_nondecreasing_in_confidence() {
        let (seq, model) = canonical();
        for a in analyze(&seq, &EntryPoint::batch(&[1, 11, 200, 700]).unwrap(), &model, 0.2).unwrap() {
            assert!(a.percentile50_capital <= a.percentile90_capital);
            assert!(a.percentile90_capital <= a.percentile99_capital);
        }
    }

    #[test]
    fn absent_entries_omitted() {
        let (seq, model) = canonical();
        let out = analyze(&seq, &EntryPoint::batch(&[1000, 11, 11]).unwrap(), &model, 0.2).unwrap();
        assert_eq!(out.iter().map(|a| a.entry_n).collect::<Vec<_>>(), vec![11]);
    }

    #[test]
    fn rejects_bad_fee_rate() {
        let (seq, model) = canonical();
        assert_eq!(
            analyze(&seq, &[entry(11)], &model, 1.5),
            Err(ArgumentError::FeeRateOutOfRange(1.5))
        );
    }

    #[test]
    fn capital_requirement_arbitrary_confidence() {
        let (seq, model) = canonical();
        let engine = RiskEngine::new(&seq, &model, 0.2).unwrap();
        let req = engine.capital_requirement(entry(11), 0.25).unwrap().unwrap();
        assert_eq!(req.steps, 74);
        assert!(!req.truncated);
        let direct: f64 = seq.range(11, 84).iter().map(|r| r.price).sum();
        assert!(approx(req.capital, direct));

        assert!(engine.capital_requirement(entry(11), 1.0).is_err());
        assert_eq!(engine.capital_requirement(entry(4000), 0.5).unwrap(), None);
    }

    #[test]
    fn confidence_outcome_fields() {
        let (seq, model) = canonical();
        let out = confidence_outcome(&seq, entry(131), 0.5, &model, 0.2).unwrap().unwrap();
        assert_eq!(out.steps, 177);
        assert!(approx(out.gross_capital, 0.464763725897));
        assert!(approx(out.net_cost, 0.2 * out.gross_capital));
        assert!(approx(out.profit, 0.279797 - out.net_cost));
        assert!(approx(out.roi_percent, out.profit / out.net_cost * 100.0));
        assert!(!out.truncated);
    }

    #[test]
    fn zero_fee_gives_zero_roi() {
        let (seq, model) = canonical();
        let out = confidence_outcome(&seq, entry(50), 0.9, &model, 0.0).unwrap().unwrap();
        assert_eq!(out.net_cost, 0.0);
        assert_eq!(out.roi_percent, 0.0);
    }

    // --- proptest ---

    proptest! {
        #[test]
        fn truncation_flag_tracks_horizon(entry_n in 1u32..999) {
            let (seq, model) = canonical();
            let a = analyze(&seq, &[entry(entry_n)], &model, 0.2).unwrap()[0];
            prop_assert_eq!(a.horizon_truncated, entry_n + 1177 - 1 > 999);
        }

        #[test]
        fn profit_is_pool_minus_cost(entry_n in 1u32..=999, fee in 0.0f64..=1.0) {
            let (seq, model) = canonical();
            let a = analyze(&seq, &[entry(entry_n)], &model, fee).unwrap()[0];
            prop_assert!(approx(a.expected_profit, a.pool_size_at_entry - a.expected_cost));
        }
    }
}
