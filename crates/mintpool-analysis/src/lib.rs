//! # mintpool-analysis: Statistics engines over a step sequence.
//!
//! Every engine takes the [`StepSequence`](mintpool_core::StepSequence) by
//! reference and returns plain serde records:
//! - **Breakeven resolution**: first step at which an entrant's cumulative
//!   cost reaches the pool value they stand to win, by prefix sums and
//!   bisection.
//! - **Risk**: expected steps, cost and profit under a geometric win model,
//!   plus percentile capital requirements truncated at the horizon.
//! - **Attribution**: per-cohort share of cause funding, exiting at breakeven
//!   or weighted over the win-step distribution.
//! - **Comparison**: non-investor vs investor funding buckets and the named
//!   scenario sweep.

pub mod attribution;
pub mod breakeven;
pub mod comparison;
pub mod geometric;
pub mod prefix;
pub mod risk;

pub use attribution::{attribute_by_entry, expected_cause_contribution, AttributionReport};
pub use breakeven::{resolve_breakevens, resolve_from_thresholds, BreakevenResolver};
pub use comparison::{
    analyze_first_cohort, compare_investor_vs_non_investor, generate_scenarios, ComparisonResult,
    Scenario, ScenarioResult,
};
pub use geometric::{GeometricModel, ProbabilityCurve};
pub use risk::{analyze, confidence_outcome, ConfidenceOutcome, RiskEngine};
