//! Trait interfaces between the core and the analysis engines.
//!
//! - [`WinModel`]: per-step win distribution (mintpool-analysis implements)

use crate::constants::SURVIVAL_TOLERANCE;
use crate::error::ArgumentError;

/// Distribution of the number of mints until a participant wins.
///
/// Win events are independent per mint with a fixed probability, so the
/// model is memoryless: every quantity depends only on steps since entry.
pub trait WinModel: Send + Sync {
    /// Per-mint win probability `p`, in `(0, 1]`.
    fn win_probability(&self) -> f64;

    /// Probability that the first win lands exactly `steps` mints after entry
    /// (`steps >= 1`).
    fn prob_win_at(&self, steps: u64) -> f64;

    /// Probability of having won within `steps` mints.
    fn cumulative(&self, steps: u64) -> f64;

    /// Expected mints until the first win, rounded to a whole step.
    fn expected_steps(&self) -> u64 {
        (1.0 / self.win_probability()).round() as u64
    }

    /// Mints needed to have won with probability `confidence`.
    ///
    /// Solves `confidence = 1 - (1-p)^K` for the smallest whole `K` whose
    /// survival probability `(1-p)^K` is within [`SURVIVAL_TOLERANCE`]
    /// (relative) of `1 - confidence`. Never returns less than one step.
    fn steps_for_confidence(&self, confidence: f64) -> Result<u64, ArgumentError> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(ArgumentError::ConfidenceOutOfRange(confidence));
        }
        let log_survival = (-self.win_probability()).ln_1p();
        let exact = (1.0 - confidence).ln() / log_survival;
        let slack = SURVIVAL_TOLERANCE.ln_1p() / -log_survival;
        Ok((exact - slack).ceil().max(1.0) as u64)
    }
}
