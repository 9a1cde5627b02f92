//! # mintpool-core
//! Foundation types, parameters and the bonding-curve step generator.
//!
//! Everything here is pure: no I/O, no global state. A [`StepSequence`] is
//! built once (generated, or validated from an ingested dataset) and passed
//! by reference into every analysis.

pub mod constants;
pub mod error;
pub mod modes;
pub mod params;
pub mod sequence;
pub mod thresholds;
pub mod traits;
pub mod types;

pub use sequence::{generate, generate_curve, sample, SequenceSource, StepSequence};
