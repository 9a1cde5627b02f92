//! Canonical model constants.
//!
//! These are the defaults behind [`ModelParams`](crate::params::ModelParams)
//! and [`CurveParams`](crate::params::CurveParams). Every analysis takes its
//! parameters explicitly; nothing in the engines reads these directly except
//! through a params struct.

/// Default sequence horizon (last mint index).
pub const DEFAULT_N_MAX: u32 = 999;

/// Per-step probability that a mint wins the pool (1 in 256).
pub const DEFAULT_WIN_PROBABILITY: f64 = 1.0 / 256.0;

/// Fraction of every mint price routed to the cause.
pub const DEFAULT_CAUSE_FEE_RATE: f64 = 0.2;

/// Mint index at which the first modelled investor joins.
pub const DEFAULT_FIRST_INVESTOR_ENTRY: u32 = 11;

/// Steps between consecutive investor entries.
pub const DEFAULT_INVESTOR_ENTRY_INTERVAL: u32 = 20;

/// Number of investor cohorts in the canonical dataset.
pub const DEFAULT_INVESTOR_COUNT: u32 = 21;

// --- bonding curve seeds ---

pub const INITIAL_PRICE: f64 = 0.0025;
pub const INITIAL_POOL_CONTRIBUTION: f64 = 0.002;
pub const INITIAL_CAUSE_CONTRIBUTION: f64 = 0.0005;

/// Per-step multiplicative growth of the mint price.
pub const PRICE_GROWTH: f64 = 1.000_224_9;

/// Per-step multiplicative growth of the pool contribution.
pub const POOL_GROWTH: f64 = 1.001_000_6;

/// Per-step multiplicative growth of the cause contribution.
pub const CAUSE_GROWTH: f64 = 1.001;

/// Base of the informational per-step win probability curve.
pub const WIN_PROBABILITY_BASE: f64 = 0.003_906_25;

/// Steps over which the informational win probability doubles.
pub const WIN_PROBABILITY_DOUBLING: f64 = 256.0;

// --- emitted precision ---

/// Decimal places kept on emitted prices.
pub const PRICE_DECIMALS: u32 = 12;

/// Decimal places kept on emitted pool and cause contributions.
pub const CONTRIBUTION_DECIMALS: u32 = 6;

/// Decimal places kept on emitted pool sizes.
pub const POOL_SIZE_DECIMALS: u32 = 6;

/// Decimal places kept on emitted win probabilities.
pub const PROBABILITY_DECIMALS: u32 = 10;

/// Tolerance for the pool-size recurrence on rounded records.
///
/// Three independently rounded 6-decimal values take part in
/// `poolSize(n) - poolSize(n-1) - poolContribution(n)`, so the residual is
/// bounded by three half-units of the sixth decimal.
pub const POOL_RECURRENCE_TOLERANCE: f64 = 1.5e-6;

// --- geometric model ---

/// Expected-value sums stop once a single win-at-k probability drops below this.
pub const NEGLIGIBLE_TERM_PROBABILITY: f64 = 1e-10;

/// Relative slack on the survival probability `(1-p)^K` when converting a
/// confidence level into a step count.
///
/// Reproduces the reference model's 177 / 589 / 1177 steps for the
/// 50th / 90th / 99th percentiles at `p = 1/256`.
pub const SURVIVAL_TOLERANCE: f64 = 1e-3;

/// Default stride of the cumulative probability curve.
pub const DEFAULT_CURVE_STRIDE: u32 = 5;

/// Default upper bound of the cumulative probability curve.
pub const DEFAULT_CURVE_MAX_STEPS: u32 = 1500;

/// Default number of records kept by display downsampling.
pub const DEFAULT_SAMPLE_POINTS: usize = 200;

/// Steps past the largest breakeven that expected-value sums may reach.
pub const EXPECTED_VALUE_CEILING_MARGIN: u32 = 500;

/// Entry window used by the canonical windowed attribution (entries 110-200).
pub const CANONICAL_WINDOW_START: u32 = 110;
pub const CANONICAL_WINDOW_END: u32 = 200;
