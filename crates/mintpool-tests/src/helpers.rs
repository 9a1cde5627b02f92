//! Shared fixtures for the integration tests.

use mintpool_analysis::{resolve_breakevens, GeometricModel};
use mintpool_core::modes::BreakevenRule;
use mintpool_core::params::ModelParams;
use mintpool_core::types::{BreakevenPoint, EntryPoint};
use mintpool_core::{generate, StepSequence};

/// The canonical 999-step sequence.
pub fn canonical_sequence() -> StepSequence {
    generate(&ModelParams::default()).unwrap()
}

/// The canonical investor entries: 11, 31, …, 411.
pub fn investor_entries() -> Vec<EntryPoint> {
    ModelParams::default().schedule().entry_points(999).unwrap()
}

/// The canonical win model, `p = 1/256`.
pub fn canonical_model() -> GeometricModel {
    GeometricModel::new(ModelParams::default().win_probability).unwrap()
}

/// Breakevens for the canonical investor entries under the canonical rule.
pub fn investor_breakevens(seq: &StepSequence) -> Vec<BreakevenPoint> {
    resolve_breakevens(seq, &investor_entries(), BreakevenRule::default()).unwrap()
}

/// Entry points from raw indices.
pub fn entries(ns: &[u32]) -> Vec<EntryPoint> {
    EntryPoint::batch(ns).unwrap()
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual} (tolerance {tolerance})"
    );
}
