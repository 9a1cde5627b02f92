//! Error types for Mintpool.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("sequence horizon must be positive")] ZeroHorizon,
    #[error("malformed entry index: {0}")] MalformedEntry(u32),
    #[error("win probability must be in (0, 1]: {0}")] ProbabilityOutOfRange(f64),
    #[error("confidence must be in (0, 1): {0}")] ConfidenceOutOfRange(f64),
    #[error("fee rate must be in [0, 1]: {0}")] FeeRateOutOfRange(f64),
    #[error("{name} must be positive and finite: {value}")] NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be at least 1")] ZeroCount { name: &'static str },
    #[error("entry window inverted: {start} > {end}")] InvertedWindow { start: u32, end: u32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    #[error("empty sequence")] Empty,
    #[error("non-contiguous step at position {position}: expected n={expected}, got n={got}")] NonContiguous { position: usize, expected: u32, got: u32 },
    #[error("non-finite {field} at n={n}")] NonFinite { n: u32, field: &'static str },
    #[error("non-positive {field} at n={n}: {value}")] NonPositive { n: u32, field: &'static str, value: f64 },
    #[error("win probability out of [0, 1] at n={n}: {value}")] ProbabilityOutOfRange { n: u32, value: f64 },
    #[error("pool size drift at n={n}: expected {expected}, got {got}")] PoolDrift { n: u32, expected: f64, got: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("threshold keyed by malformed entry index 0")] ZeroEntry,
    #[error("no thresholds for entry {0}")] Empty(u32),
    #[error("invalid threshold for entry {entry_n}: {value}")] Invalid { entry_n: u32, value: f64 },
}

#[derive(Error, Debug)]
pub enum MintpoolError {
    #[error(transparent)] Argument(#[from] ArgumentError),
    #[error(transparent)] Sequence(#[from] SequenceError),
    #[error(transparent)] Threshold(#[from] ThresholdError),
}
