//! Cause-funding attribution across entry cohorts.
//!
//! Each cohort pays into the cause from its entry step until it leaves.
//! Under [`AttributionMode::BreakevenExit`] it leaves exactly at its resolved
//! breakeven. Under [`AttributionMode::ExpectedValue`] it leaves at its win
//! step, and the contribution is the pmf-weighted average over win steps.
//! Shares are reported against a [`Denominator`] fixed by the request.

use mintpool_core::constants::NEGLIGIBLE_TERM_PROBABILITY;
use mintpool_core::error::ArgumentError;
use mintpool_core::modes::{AttributionMode, AttributionRequest, CauseBasis, Denominator};
use mintpool_core::traits::WinModel;
use mintpool_core::types::{max_breakeven, BreakevenPoint, CauseFundingAttribution};
use mintpool_core::StepSequence;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::prefix::PrefixSums;

/// Attribution for a set of cohorts, together with the request and the
/// denominator it was computed against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionReport {
    pub request: AttributionRequest,
    /// Total the percentages are taken of.
    pub denominator_value: f64,
    /// `causeContribution` summed over the whole sequence.
    pub total_cause_funding: f64,
    /// The denominator was zero and every percentage was reported as 0.
    pub degenerate_denominator: bool,
    /// At least one expected-value sum hit the ceiling before its terms
    /// became negligible.
    pub expected_value_truncated: bool,
    pub entries: Vec<CauseFundingAttribution>,
}

/// Expected-value sum for one entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedContribution {
    pub value: f64,
    /// Last win step included.
    pub last_step: u32,
    /// Stopped at the ceiling rather than on a negligible term.
    pub truncated: bool,
}

struct CausePrefix {
    sums: PrefixSums,
}

impl CausePrefix {
    fn new(sequence: &StepSequence, basis: CauseBasis) -> Self {
        Self { sums: PrefixSums::new(sequence, |r| basis.cause_of(r)) }
    }

    fn expected(&self, entry_n: u32, ceiling: u32, model: &impl WinModel) -> ExpectedContribution {
        let mut value = 0.0;
        let mut last_step = entry_n;
        let mut k = entry_n;
        while k < ceiling {
            k += 1;
            let prob = model.prob_win_at(u64::from(k - entry_n));
            value += prob * self.sums.range(entry_n, k);
            last_step = k;
            if prob < NEGLIGIBLE_TERM_PROBABILITY {
                return ExpectedContribution { value, last_step, truncated: false };
            }
        }
        ExpectedContribution { value, last_step, truncated: k > entry_n }
    }
}

/// `Σ_{k > entryN} P(win at k - entryN) · causePaid(entryN, k)`, for win
/// steps up to `min(ceiling, n_max)`.
///
/// The sum stops after the first term whose win probability falls below
/// [`NEGLIGIBLE_TERM_PROBABILITY`].
pub fn expected_cause_contribution(
    sequence: &StepSequence,
    entry_n: u32,
    basis: CauseBasis,
    ceiling: u32,
    model: &impl WinModel,
) -> Result<ExpectedContribution, ArgumentError> {
    basis.validate()?;
    let ceiling = ceiling.min(sequence.n_max());
    Ok(CausePrefix::new(sequence, basis).expected(entry_n, ceiling, model))
}

/// Share of cause funding contributed by each entry cohort.
///
/// `breakevens` may be in any order; the report is ascending by entry with
/// duplicates collapsed, and entries outside the sequence are dropped.
pub fn attribute_by_entry(
    sequence: &StepSequence,
    breakevens: &[BreakevenPoint],
    request: &AttributionRequest,
    model: &impl WinModel,
) -> Result<AttributionReport, ArgumentError> {
    request.validate()?;

    let mut cohorts: Vec<BreakevenPoint> = breakevens
        .iter()
        .copied()
        .filter(|p| sequence.contains(p.entry_n) && request.denominator.admits(p.entry_n))
        .collect();
    cohorts.sort_by_key(|p| p.entry_n);
    cohorts.dedup_by_key(|p| p.entry_n);

    let paid = CausePrefix::new(sequence, request.basis);
    let cause_field = PrefixSums::new(sequence, |r| r.cause_contribution);
    let max_b = max_breakeven(breakevens);
    let ceiling = request.mode.ceiling(max_b, sequence.n_max());

    let mut expected_value_truncated = false;
    let contributions: Vec<f64> = cohorts
        .iter()
        .map(|p| match request.mode {
            AttributionMode::BreakevenExit => {
                p.breakeven_n.map_or(0.0, |b| paid.sums.range(p.entry_n, b))
            }
            AttributionMode::ExpectedValue { .. } => {
                let ev = paid.expected(p.entry_n, ceiling, model);
                trace!(entry_n = p.entry_n, value = ev.value, last_step = ev.last_step, "expected contribution");
                expected_value_truncated |= ev.truncated;
                ev.value
            }
        })
        .collect();

    let denominator_value = match request.denominator {
        Denominator::ThroughMaxBreakeven => max_b.map_or(0.0, |b| cause_field.range(1, b)),
        Denominator::EntryWindow { .. } => contributions.iter().sum(),
        Denominator::FullSequence => cause_field.total(),
    };
    let degenerate_denominator = denominator_value <= 0.0;
    if degenerate_denominator {
        warn!(denominator = ?request.denominator, "cause funding denominator is zero; reporting 0%");
    }
    if expected_value_truncated {
        warn!(ceiling, "expected-value attribution truncated at ceiling");
    }

    let entries: Vec<CauseFundingAttribution> = cohorts
        .iter()
        .zip(contributions)
        .map(|(p, cause_contribution)| CauseFundingAttribution {
            entry_n: p.entry_n,
            breakeven_n: p.breakeven_n,
            cause_contribution,
            percentage: if degenerate_denominator {
                0.0
            } else {
                100.0 * cause_contribution / denominator_value
            },
        })
        .collect();

    debug!(
        requested = breakevens.len(),
        reported = entries.len(),
        denominator_value,
        "attributed cause funding"
    );
    Ok(AttributionReport {
        request: *request,
        denominator_value,
        total_cause_funding: cause_field.total(),
        degenerate_denominator,
        expected_value_truncated,
        entries,
    })
}
