//! Geometric win model implementing the [`WinModel`] trait.
//!
//! Each mint wins independently with probability `p`, so steps-to-win is
//! geometric: `P(win at k) = p(1-p)^(k-1)`, `P(win within k) = 1 - (1-p)^k`.

use mintpool_core::constants::{DEFAULT_CURVE_MAX_STEPS, DEFAULT_CURVE_STRIDE};
use mintpool_core::error::ArgumentError;
use mintpool_core::traits::WinModel;
use mintpool_core::types::CurvePoint;

/// The production win model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricModel {
    p: f64,
}

impl GeometricModel {
    pub fn new(win_probability: f64) -> Result<Self, ArgumentError> {
        if !(win_probability > 0.0 && win_probability <= 1.0) {
            return Err(ArgumentError::ProbabilityOutOfRange(win_probability));
        }
        Ok(Self { p: win_probability })
    }

    /// Cumulative-probability curve with the given bounds.
    pub fn curve(&self, max_steps: u32, stride: u32) -> Result<ProbabilityCurve, ArgumentError> {
        ProbabilityCurve::new(self.p, max_steps, stride)
    }
}

impl WinModel for GeometricModel {
    fn win_probability(&self) -> f64 {
        self.p
    }

    fn prob_win_at(&self, steps: u64) -> f64 {
        if steps == 0 {
            return 0.0;
        }
        self.p * (1.0 - self.p).powf((steps - 1) as f64)
    }

    fn cumulative(&self, steps: u64) -> f64 {
        1.0 - (1.0 - self.p).powf(steps as f64)
    }
}

/// `(k, 1 - (1-p)^k)` for `k = 1, 1 + stride, …` up to `max_steps`.
///
/// Holds only its bounds; every call to [`iter`](Self::iter) starts over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityCurve {
    p: f64,
    max_steps: u32,
    stride: u32,
}

impl ProbabilityCurve {
    pub fn new(p: f64, max_steps: u32, stride: u32) -> Result<Self, ArgumentError> {
        if !(p > 0.0 && p <= 1.0) {
            return Err(ArgumentError::ProbabilityOutOfRange(p));
        }
        if stride == 0 {
            return Err(ArgumentError::ZeroCount { name: "stride" });
        }
        Ok(Self { p, max_steps, stride })
    }

    /// The dashboard's default: up to 1500 steps, every 5th.
    pub fn with_defaults(p: f64) -> Result<Self, ArgumentError> {
        Self::new(p, DEFAULT_CURVE_MAX_STEPS, DEFAULT_CURVE_STRIDE)
    }

    pub fn iter(&self) -> impl Iterator<Item = CurvePoint> + use<> {
        let survival = 1.0 - self.p;
        (1..=self.max_steps)
            .step_by(self.stride as usize)
            .map(move |steps| CurvePoint {
                steps,
                cumulative_probability: 1.0 - survival.powf(f64::from(steps)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn canonical() -> GeometricModel {
        GeometricModel::new(1.0 / 256.0).unwrap()
    }

    #[test]
    fn rejects_bad_probability() {
        assert!(GeometricModel::new(0.0).is_err());
        assert!(GeometricModel::new(1.5).is_err());
        assert!(GeometricModel::new(f64::NAN).is_err());
        assert!(GeometricModel::new(1.0).is_ok());
    }

    #[test]
    fn expected_steps_is_reciprocal() {
        assert_eq!(canonical().expected_steps(), 256);
        assert_eq!(GeometricModel::new(0.3).unwrap().expected_steps(), 3);
    }

    #[test]
    fn reference_percentile_steps() {
        let m = canonical();
        assert_eq!(m.steps_for_confidence(0.5).unwrap(), 177);
        assert_eq!(m.steps_for_confidence(0.9).unwrap(), 589);
        assert_eq!(m.steps_for_confidence(0.99).unwrap(), 1177);
    }

    #[test]
    fn other_named_percentiles() {
        let m = canonical();
        assert_eq!(m.steps_for_confidence(0.25).unwrap(), 74);
        assert_eq!(m.steps_for_confidence(0.75).unwrap(), 354);
    }

    #[test]
    fn confidence_out_of_range() {
        let m = canonical();
        for c in [0.0, 1.0, -0.2, 1.2, f64::NAN] {
            assert!(m.steps_for_confidence(c).is_err(), "accepted c={c}");
        }
    }

    #[test]
    fn certain_win_takes_one_step() {
        let m = GeometricModel::new(1.0).unwrap();
        assert_eq!(m.steps_for_confidence(0.99).unwrap(), 1);
        assert_eq!(m.prob_win_at(1), 1.0);
        assert_eq!(m.prob_win_at(2), 0.0);
    }

    #[test]
    fn pmf_first_terms() {
        let m = canonical();
        assert_eq!(m.prob_win_at(0), 0.0);
        assert_eq!(m.prob_win_at(1), 1.0 / 256.0);
        assert!((m.prob_win_at(2) - (1.0 / 256.0) * (255.0 / 256.0)).abs() < 1e-18);
    }

    #[test]
    fn curve_defaults() {
        let curve = ProbabilityCurve::with_defaults(1.0 / 256.0).unwrap();
        let points: Vec<_> = curve.iter().collect();
        assert_eq!(points.len(), 300);
        assert_eq!(points[0].steps, 1);
        assert_eq!(points[1].steps, 6);
        assert_eq!(points.last().unwrap().steps, 1496);
        assert!((points[0].cumulative_probability - 1.0 / 256.0).abs() < 1e-15);
    }

    #[test]
    fn curve_is_restartable() {
        let curve = canonical().curve(100, 7).unwrap();
        let first: Vec<_> = curve.iter().collect();
        let second: Vec<_> = curve.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn curve_rejects_zero_stride() {
        assert_eq!(
            canonical().curve(100, 0),
            Err(ArgumentError::ZeroCount { name: "stride" })
        );
    }

    #[test]
    fn model_is_object_safe() {
        let m = canonical();
        let dyn_m: &dyn WinModel = &m;
        assert_eq!(dyn_m.expected_steps(), 256);
    }

    // --- proptest ---

    proptest! {
        #[test]
        fn pmf_sums_to_cdf(p in 0.001f64..0.5, k in 1u64..2000) {
            let m = GeometricModel::new(p).unwrap();
            let summed: f64 = (1..=k).map(|i| m.prob_win_at(i)).sum();
            prop_assert!((summed - m.cumulative(k)).abs() < 1e-9);
        }

        #[test]
        fn confidence_steps_reach_target_within_tolerance(p in 0.0005f64..0.5, c in 0.01f64..0.999) {
            let m = GeometricModel::new(p).unwrap();
            let k = m.steps_for_confidence(c).unwrap();
            let survival = (1.0 - p).powf(k as f64);
            prop_assert!(survival <= (1.0 - c) * (1.0 + 1e-3) + 1e-12);
        }

        #[test]
        fn confidence_steps_monotone(p in 0.001f64..0.5, a in 0.01f64..0.99, b in 0.01f64..0.99) {
            let m = GeometricModel::new(p).unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(m.steps_for_confidence(lo).unwrap() <= m.steps_for_confidence(hi).unwrap());
        }

        #[test]
        fn curve_monotone(stride in 1u32..50) {
            let curve = ProbabilityCurve::new(1.0 / 256.0, 1500, stride).unwrap();
            let probs: Vec<f64> = curve.iter().map(|pt| pt.cumulative_probability).collect();
            prop_assert!(probs.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(probs.iter().all(|&x| (0.0..=1.0).contains(&x)));
        }
    }
}
