//! Model parameters.
//!
//! Different dataset variants use different constants, so every engine takes
//! its parameters explicitly. [`ModelParams`] is also the shape of the CLI's
//! layered configuration file; every field has a canonical default, so a
//! partial file overrides only what it names. Multi-word fields also accept
//! their snake_case spelling, which is how TOML files and environment
//! variables name them.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ArgumentError;
use crate::types::EntryPoint;

/// Seeds and growth factors of the discretised bonding curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurveParams {
    #[serde(alias = "initial_price")]
    pub initial_price: f64,
    #[serde(alias = "initial_pool_contribution")]
    pub initial_pool_contribution: f64,
    #[serde(alias = "initial_cause_contribution")]
    pub initial_cause_contribution: f64,
    #[serde(alias = "price_growth")]
    pub price_growth: f64,
    #[serde(alias = "pool_growth")]
    pub pool_growth: f64,
    #[serde(alias = "cause_growth")]
    pub cause_growth: f64,
    #[serde(alias = "win_probability_base")]
    pub win_probability_base: f64,
    #[serde(alias = "win_probability_doubling")]
    pub win_probability_doubling: f64,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            initial_price: INITIAL_PRICE,
            initial_pool_contribution: INITIAL_POOL_CONTRIBUTION,
            initial_cause_contribution: INITIAL_CAUSE_CONTRIBUTION,
            price_growth: PRICE_GROWTH,
            pool_growth: POOL_GROWTH,
            cause_growth: CAUSE_GROWTH,
            win_probability_base: WIN_PROBABILITY_BASE,
            win_probability_doubling: WIN_PROBABILITY_DOUBLING,
        }
    }
}

impl CurveParams {
    /// A curve whose pool and cause shares stay a fixed fraction of price.
    ///
    /// All three quantities share one growth factor, so
    /// `poolContribution + causeContribution == price` at every step.
    pub fn fixed_split(initial_price: f64, cause_fraction: f64, growth: f64) -> Self {
        Self {
            initial_price,
            initial_pool_contribution: initial_price * (1.0 - cause_fraction),
            initial_cause_contribution: initial_price * cause_fraction,
            price_growth: growth,
            pool_growth: growth,
            cause_growth: growth,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ArgumentError> {
        positive("initialPrice", self.initial_price)?;
        positive("initialPoolContribution", self.initial_pool_contribution)?;
        positive("initialCauseContribution", self.initial_cause_contribution)?;
        positive("priceGrowth", self.price_growth)?;
        positive("poolGrowth", self.pool_growth)?;
        positive("causeGrowth", self.cause_growth)?;
        positive("winProbabilityBase", self.win_probability_base)?;
        positive("winProbabilityDoubling", self.win_probability_doubling)?;
        Ok(())
    }
}

/// Full parameter set for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelParams {
    /// Geometric-model win probability per mint.
    #[serde(alias = "win_probability")]
    pub win_probability: f64,
    /// Fraction of each price routed to the cause.
    #[serde(alias = "cause_fee_rate")]
    pub cause_fee_rate: f64,
    /// Sequence horizon.
    #[serde(alias = "n_max")]
    pub n_max: u32,
    #[serde(alias = "first_investor_entry")]
    pub first_investor_entry: u32,
    #[serde(alias = "investor_entry_interval")]
    pub investor_entry_interval: u32,
    #[serde(alias = "investor_count")]
    pub investor_count: u32,
    pub curve: CurveParams,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            win_probability: DEFAULT_WIN_PROBABILITY,
            cause_fee_rate: DEFAULT_CAUSE_FEE_RATE,
            n_max: DEFAULT_N_MAX,
            first_investor_entry: DEFAULT_FIRST_INVESTOR_ENTRY,
            investor_entry_interval: DEFAULT_INVESTOR_ENTRY_INTERVAL,
            investor_count: DEFAULT_INVESTOR_COUNT,
            curve: CurveParams::default(),
        }
    }
}

impl ModelParams {
    pub fn validate(&self) -> Result<(), ArgumentError> {
        if self.n_max == 0 {
            return Err(ArgumentError::ZeroHorizon);
        }
        if !(self.win_probability > 0.0 && self.win_probability <= 1.0) {
            return Err(ArgumentError::ProbabilityOutOfRange(self.win_probability));
        }
        if !(0.0..=1.0).contains(&self.cause_fee_rate) {
            return Err(ArgumentError::FeeRateOutOfRange(self.cause_fee_rate));
        }
        self.schedule().validate()?;
        self.curve.validate()
    }

    /// The investor entry schedule described by these parameters.
    pub fn schedule(&self) -> InvestorSchedule {
        InvestorSchedule {
            first_entry: self.first_investor_entry,
            interval: self.investor_entry_interval,
            count: self.investor_count,
        }
    }
}

/// Evenly spaced investor entries: `first_entry + i * interval` for
/// `i in 0..count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorSchedule {
    pub first_entry: u32,
    pub interval: u32,
    pub count: u32,
}

impl Default for InvestorSchedule {
    fn default() -> Self {
        ModelParams::default().schedule()
    }
}

impl InvestorSchedule {
    pub fn validate(&self) -> Result<(), ArgumentError> {
        if self.first_entry == 0 {
            return Err(ArgumentError::MalformedEntry(0));
        }
        if self.interval == 0 {
            return Err(ArgumentError::ZeroCount { name: "investorEntryInterval" });
        }
        if self.count == 0 {
            return Err(ArgumentError::ZeroCount { name: "investorCount" });
        }
        Ok(())
    }

    /// Entry points within `[1, n_max]`, ascending.
    pub fn entry_points(&self, n_max: u32) -> Result<Vec<EntryPoint>, ArgumentError> {
        self.validate()?;
        (0..self.count)
            .map_while(|i| {
                let n = i
                    .checked_mul(self.interval)
                    .and_then(|offset| offset.checked_add(self.first_entry))?;
                (n <= n_max).then_some(n)
            })
            .map(EntryPoint::new)
            .collect()
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ArgumentError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ArgumentError::NonPositive { name, value });
    }
    Ok(())
}
