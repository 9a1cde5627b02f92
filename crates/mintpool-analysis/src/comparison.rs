//! Investor vs non-investor comparison.
//!
//! Splits cause funding at the first investor entry: everything recorded
//! before it is the non-investor bucket, and everything the investors pay
//! from entry through a breakeven step is the investor bucket. At a cohort's
//! own breakeven under the canonical rule the two buckets are equal up to
//! the overshoot of the final step, which is the dashboard's 50/50 proof.

use mintpool_core::error::ArgumentError;
use mintpool_core::modes::CauseBasis;
use mintpool_core::traits::WinModel;
use mintpool_core::types::{max_breakeven, BreakevenPoint, StepRecord};
use mintpool_core::StepSequence;
use serde::Serialize;
use tracing::{debug, warn};

/// One side of the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    /// First step of the period.
    pub from_n: u32,
    /// Last step of the period; below `from_n` when the period is empty.
    pub to_n: u32,
    pub cause_contribution: f64,
    pub percentage: f64,
    pub average_price: f64,
    /// Number of mints in the period.
    pub volume: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub first_entry_n: u32,
    /// Step the investor period runs through, after clamping to the horizon.
    pub breakeven_n: u32,
    pub non_investor: PeriodSummary,
    pub investor: PeriodSummary,
    pub total_cause_funding: f64,
    /// Investor volume over non-investor volume; 0 when there were no
    /// non-investor mints.
    pub volume_ratio: f64,
    /// The requested breakeven lay past the end of the sequence.
    pub truncated: bool,
}

/// Named breakeven assumptions for the scenario sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scenario {
    #[serde(rename = "25th")]
    Percentile25,
    #[serde(rename = "50th")]
    Median,
    #[serde(rename = "expected")]
    Expected,
    #[serde(rename = "75th")]
    Percentile75,
    #[serde(rename = "90th")]
    Percentile90,
    #[serde(rename = "observed-max")]
    ObservedMax,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Percentile25,
        Scenario::Median,
        Scenario::Expected,
        Scenario::Percentile75,
        Scenario::Percentile90,
        Scenario::ObservedMax,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Percentile25 => "25th",
            Self::Median => "50th",
            Self::Expected => "expected",
            Self::Percentile75 => "75th",
            Self::Percentile90 => "90th",
            Self::ObservedMax => "observed-max",
        }
    }

    /// Steps past entry this scenario assumes, or `None` for
    /// [`Scenario::ObservedMax`], which reads the breakeven directly.
    pub fn steps(self, model: &impl WinModel) -> Result<Option<u64>, ArgumentError> {
        let confidence = match self {
            Self::Percentile25 => 0.25,
            Self::Median => 0.5,
            Self::Percentile75 => 0.75,
            Self::Percentile90 => 0.9,
            Self::Expected => return Ok(Some(model.expected_steps())),
            Self::ObservedMax => return Ok(None),
        };
        model.steps_for_confidence(confidence).map(Some)
    }
}

impl std::str::FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sc| sc.label() == s)
            .ok_or_else(|| format!("unknown scenario '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub scenario: Scenario,
    /// Steps past entry assumed by the scenario, when it is step based.
    pub steps: Option<u64>,
    pub comparison: ComparisonResult,
}

fn summarize(
    sequence: &StepSequence,
    from_n: u32,
    to_n: u32,
    cause_of: impl Fn(&StepRecord) -> f64,
) -> PeriodSummary {
    let records = sequence.range(from_n, to_n);
    let cause_contribution = records.iter().map(&cause_of).sum();
    let volume = records.len() as u32;
    let average_price = if volume > 0 {
        records.iter().map(|r| r.price).sum::<f64>() / f64::from(volume)
    } else {
        0.0
    };
    PeriodSummary { from_n, to_n, cause_contribution, percentage: 0.0, average_price, volume }
}

/// Compare `[1, first)` against `[first, breakeven_n]`, clamping the
/// breakeven to the horizon.
fn compare_through(
    sequence: &StepSequence,
    first_entry_n: u32,
    breakeven_n: u64,
    basis: CauseBasis,
) -> ComparisonResult {
    let n_max = sequence.n_max();
    let truncated = breakeven_n > u64::from(n_max);
    let breakeven_n = breakeven_n.min(u64::from(n_max)) as u32;

    let mut non_investor = summarize(sequence, 1, first_entry_n - 1, |r| r.cause_contribution);
    let mut investor = summarize(sequence, first_entry_n, breakeven_n, |r| basis.cause_of(r));

    let total = non_investor.cause_contribution + investor.cause_contribution;
    if total > 0.0 {
        non_investor.percentage = 100.0 * non_investor.cause_contribution / total;
        investor.percentage = 100.0 * investor.cause_contribution / total;
    }
    let volume_ratio = if non_investor.volume > 0 {
        f64::from(investor.volume) / f64::from(non_investor.volume)
    } else {
        0.0
    };

    ComparisonResult {
        first_entry_n,
        breakeven_n,
        non_investor,
        investor,
        total_cause_funding: total,
        volume_ratio,
        truncated,
    }
}

fn check_entry(first_entry_n: u32, basis: CauseBasis) -> Result<(), ArgumentError> {
    if first_entry_n == 0 {
        return Err(ArgumentError::MalformedEntry(0));
    }
    basis.validate()
}

/// Compare the non-investor period before `first_entry_n` against the
/// investor period through the largest resolved breakeven.
///
/// `None` when nothing resolved or the entry is outside the sequence.
pub fn compare_investor_vs_non_investor(
    sequence: &StepSequence,
    breakevens: &[BreakevenPoint],
    first_entry_n: u32,
    basis: CauseBasis,
) -> Result<Option<ComparisonResult>, ArgumentError> {
    check_entry(first_entry_n, basis)?;
    if !sequence.contains(first_entry_n) {
        return Ok(None);
    }
    let Some(max_b) = max_breakeven(breakevens) else {
        return Ok(None);
    };
    let result = compare_through(sequence, first_entry_n, u64::from(max_b), basis);
    debug!(
        first_entry_n,
        breakeven_n = result.breakeven_n,
        investor_percentage = result.investor.percentage,
        "compared investor periods"
    );
    Ok(Some(result))
}

/// Rerun the comparison once per scenario with
/// `breakevenN = first_entry_n + steps(scenario)`.
///
/// [`Scenario::ObservedMax`] uses the largest resolved breakeven and is
/// skipped when none resolved. An entry outside the sequence yields no
/// results.
pub fn generate_scenarios(
    sequence: &StepSequence,
    breakevens: &[BreakevenPoint],
    first_entry_n: u32,
    scenarios: &[Scenario],
    model: &impl WinModel,
    basis: CauseBasis,
) -> Result<Vec<ScenarioResult>, ArgumentError> {
    check_entry(first_entry_n, basis)?;
    if !sequence.contains(first_entry_n) {
        return Ok(Vec::new());
    }
    let observed = max_breakeven(breakevens);

    let mut out = Vec::with_capacity(scenarios.len());
    for &scenario in scenarios {
        let steps = scenario.steps(model)?;
        let breakeven_n = match (steps, observed) {
            (Some(steps), _) => u64::from(first_entry_n).saturating_add(steps),
            (None, Some(max_b)) => u64::from(max_b),
            (None, None) => continue,
        };
        let comparison = compare_through(sequence, first_entry_n, breakeven_n, basis);
        if comparison.truncated {
            warn!(scenario = scenario.label(), breakeven_n, "scenario clamped to horizon");
        }
        out.push(ScenarioResult { scenario, steps, comparison });
    }
    debug!(scenarios = out.len(), first_entry_n, "generated scenarios");
    Ok(out)
}

/// The first cohort with a resolved breakeven, compared against its own
/// breakeven.
pub fn analyze_first_cohort(
    sequence: &StepSequence,
    breakevens: &[BreakevenPoint],
    basis: CauseBasis,
) -> Result<Option<ComparisonResult>, ArgumentError> {
    basis.validate()?;
    let first = breakevens
        .iter()
        .filter(|p| sequence.contains(p.entry_n))
        .filter_map(|p| p.breakeven_n.map(|b| (p.entry_n, b)))
        .min_by_key(|&(entry_n, _)| entry_n);
    Ok(first.map(|(entry_n, b)| compare_through(sequence, entry_n, u64::from(b), basis)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakeven::resolve_breakevens;
    use crate::geometric::GeometricModel;
    use mintpool_core::generate;
    use mintpool_core::modes::BreakevenRule;
    use mintpool_core::params::ModelParams;
    use mintpool_core::types::EntryPoint;
    use proptest::prelude::*;

    fn canonical() -> StepSequence {
        generate(&ModelParams::default()).unwrap()
    }

    fn own_breakeven(seq: &StepSequence, entry_n: u32) -> Vec<BreakevenPoint> {
        resolve_breakevens(seq, &EntryPoint::batch(&[entry_n]).unwrap(), BreakevenRule::default()).unwrap()
    }

    #[test]
    fn first_entry_zero_rejected() {
        let seq = canonical();
        assert_eq!(
            compare_investor_vs_non_investor(&seq, &[], 0, CauseBasis::default()),
            Err(ArgumentError::MalformedEntry(0))
        );
    }

    #[test]
    fn none_without_resolved_breakeven() {
        let seq = canonical();
        let points = [BreakevenPoint { entry_n: 900, breakeven_n: None }];
        assert_eq!(compare_investor_vs_non_investor(&seq, &points, 900, CauseBasis::default()).unwrap(), None);
        assert_eq!(compare_investor_vs_non_investor(&seq, &own_breakeven(&seq, 131), 2000, CauseBasis::default()).unwrap(), None);
    }

    #[test]
    fn entry_131_splits_evenly() {
        let seq = canonical();
        let points = own_breakeven(&seq, 131);
        let r = compare_investor_vs_non_investor(&seq, &points, 131, CauseBasis::default()).unwrap().unwrap();
        assert_eq!(r.breakeven_n, 263);
        assert_eq!(r.non_investor.volume, 130);
        assert_eq!(r.investor.volume, 133);
        assert!((r.investor.percentage - 50.0).abs() < 0.5);
        assert!((r.investor.percentage + r.non_investor.percentage - 100.0).abs() < 1e-9);
        assert!((r.volume_ratio - 133.0 / 130.0).abs() < 1e-12);
        assert!(!r.truncated);
    }

    #[test]
    fn average_price_is_mean_over_period() {
        let seq = canonical();
        let r = compare_investor_vs_non_investor(&seq, &own_breakeven(&seq, 51), 51, CauseBasis::default())
            .unwrap()
            .unwrap();
        let direct: f64 = seq.range(51, 101).iter().map(|r| r.price).sum::<f64>() / 51.0;
        assert!((r.investor.average_price - direct).abs() < 1e-15);
    }

    #[test]
    fn first_step_entry_has_empty_non_investor_bucket() {
        let seq = canonical();
        let points = [BreakevenPoint { entry_n: 11, breakeven_n: Some(21) }];
        let r = compare_investor_vs_non_investor(&seq, &points, 1, CauseBasis::default()).unwrap().unwrap();
        assert_eq!(r.non_investor.volume, 0);
        assert_eq!(r.non_investor.average_price, 0.0);
        assert_eq!(r.volume_ratio, 0.0);
        assert!((r.investor.percentage - 100.0).abs() < 1e-12);
    }

    #[test]
    fn scenarios_at_named_percentiles() {
        let seq = canonical();
        let model = GeometricModel::new(1.0 / 256.0).unwrap();
        let entries = ModelParams::default().schedule().entry_points(999).unwrap();
        let points = resolve_breakevens(&seq, &entries, BreakevenRule::default()).unwrap();
        let out = generate_scenarios(&seq, &points, 11, &Scenario::ALL, &model, CauseBasis::default()).unwrap();
        let got: Vec<(&str, u32)> = out.iter().map(|s| (s.scenario.label(), s.comparison.breakeven_n)).collect();
        assert_eq!(
            got,
            vec![
                ("25th", 85),
                ("50th", 188),
                ("expected", 267),
                ("75th", 365),
                ("90th", 600),
                ("observed-max", max_breakeven(&points).unwrap()),
            ]
        );
        assert!(out.iter().all(|s| !s.comparison.truncated));
    }

    #[test]
    fn scenarios_clamped_to_horizon() {
        let seq = canonical();
        let model = GeometricModel::new(1.0 / 256.0).unwrap();
        let out = generate_scenarios(&seq, &[], 700, &[Scenario::Percentile90, Scenario::ObservedMax], &model, CauseBasis::default())
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].comparison.breakeven_n, 999);
        assert!(out[0].comparison.truncated);
    }

    #[test]
    fn tiny_win_probability_scenarios_hit_horizon() {
        let seq = canonical();
        let model = GeometricModel::new(1e-20).unwrap();
        let out = generate_scenarios(&seq, &[], 11, &[Scenario::Expected, Scenario::Median], &model, CauseBasis::default())
            .unwrap();
        assert_eq!(out.len(), 2);
        for r in &out {
            assert_eq!(r.comparison.breakeven_n, 999);
            assert!(r.comparison.truncated);
        }
    }

    #[test]
    fn scenario_labels_round_trip() {
        for sc in Scenario::ALL {
            assert_eq!(sc.label().parse::<Scenario>().unwrap(), sc);
            assert_eq!(serde_json::to_string(&sc).unwrap(), format!("\"{}\"", sc.label()));
        }
        assert!("60th".parse::<Scenario>().is_err());
    }

    #[test]
    fn first_cohort_uses_earliest_resolved() {
        let seq = canonical();
        let points = [
            BreakevenPoint { entry_n: 131, breakeven_n: Some(263) },
            BreakevenPoint { entry_n: 51, breakeven_n: Some(101) },
            BreakevenPoint { entry_n: 31, breakeven_n: None },
        ];
        let r = analyze_first_cohort(&seq, &points, CauseBasis::default()).unwrap().unwrap();
        assert_eq!((r.first_entry_n, r.breakeven_n), (51, 101));
        assert!(analyze_first_cohort(&seq, &[], CauseBasis::default()).unwrap().is_none());
    }

    // --- proptest ---

    proptest! {
        #[test]
        fn own_breakeven_splits_evenly(entry_n in 50u32..=480) {
            let seq = canonical();
            let points = own_breakeven(&seq, entry_n);
            let r = compare_investor_vs_non_investor(&seq, &points, entry_n, CauseBasis::default())
                .unwrap()
                .unwrap();
            prop_assert!((r.investor.percentage - 50.0).abs() < 0.5);
            prop_assert!((r.non_investor.percentage - 50.0).abs() < 0.5);
            prop_assert!((r.investor.percentage + r.non_investor.percentage - 100.0).abs() < 1e-9);
            // Investors overshoot the pre-entry bucket by less than one step.
            let last = seq.get(r.breakeven_n).unwrap().price * 0.2;
            prop_assert!(r.investor.cause_contribution >= r.non_investor.cause_contribution);
            prop_assert!(r.investor.cause_contribution - r.non_investor.cause_contribution < last);
        }
    }
}
