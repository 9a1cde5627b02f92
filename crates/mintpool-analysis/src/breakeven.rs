//! Breakeven resolution.
//!
//! An entrant joining at `entryN` keeps paying a per-step cost (gross price,
//! or only the part that leaves for the cause) while waiting to win. The pool
//! value they stand to win is fixed at entry by a [`PoolReference`].
//! Breakeven is the first step `k >= entryN` at which
//! `cumulativeCost(entryN, k)` reaches that pool value: from `k` on, a win no
//! longer covers what was paid. There is no interpolation between steps.
//!
//! Cumulative costs come from prefix sums and the crossing is found by
//! bisection, so a batch costs `O(n_max + entries · log n_max)`.

use std::collections::BTreeSet;

use mintpool_core::error::ArgumentError;
use mintpool_core::modes::{BreakevenRule, PoolReference};
use mintpool_core::thresholds::BreakevenThresholds;
use mintpool_core::types::{BreakevenPoint, EntryPoint, ProfitPoint};
use mintpool_core::StepSequence;
use tracing::{debug, trace};

use crate::prefix::PrefixSums;

/// Resolves breakevens for one sequence under one rule.
#[derive(Debug, Clone)]
pub struct BreakevenResolver<'a> {
    sequence: &'a StepSequence,
    rule: BreakevenRule,
    cost: PrefixSums,
    cause_field: PrefixSums,
}

impl<'a> BreakevenResolver<'a> {
    pub fn new(sequence: &'a StepSequence, rule: BreakevenRule) -> Result<Self, ArgumentError> {
        rule.validate()?;
        let cost_basis = rule.cost;
        Ok(Self {
            sequence,
            rule,
            cost: PrefixSums::new(sequence, |r| cost_basis.cost_of(r)),
            cause_field: PrefixSums::new(sequence, |r| r.cause_contribution),
        })
    }

    pub fn rule(&self) -> &BreakevenRule {
        &self.rule
    }

    /// Pool value an entrant at `entry_n` stands to win.
    pub fn pool_reference(&self, entry_n: u32) -> f64 {
        match self.rule.pool {
            PoolReference::PoolSizeBeforeEntry => self.sequence.pool_size_before(entry_n),
            PoolReference::CauseFundedBeforeEntry => self.cause_field.before(entry_n),
        }
    }

    /// Cost paid over `[entry_n, k]` under the rule's cost basis.
    pub fn cumulative_cost(&self, entry_n: u32, k: u32) -> f64 {
        self.cost.range(entry_n, k)
    }

    /// Breakeven for a single entry; `None` if the entry is not in the
    /// sequence.
    pub fn resolve(&self, entry: EntryPoint) -> Option<BreakevenPoint> {
        let entry_n = entry.n();
        if !self.sequence.contains(entry_n) {
            return None;
        }
        let target = self.pool_reference(entry_n);
        let breakeven_n = self.cost.first_reaching(entry_n, target);
        trace!(entry_n, target, ?breakeven_n, "resolved entry");
        Some(BreakevenPoint { entry_n, breakeven_n })
    }

    /// Breakevens for a batch, ascending by entry with duplicates collapsed.
    /// Entries outside the sequence are omitted.
    pub fn resolve_all(&self, entries: &[EntryPoint]) -> Vec<BreakevenPoint> {
        let unique: BTreeSet<EntryPoint> = entries.iter().copied().collect();
        let points: Vec<BreakevenPoint> = unique.into_iter().filter_map(|e| self.resolve(e)).collect();
        debug!(
            requested = entries.len(),
            reported = points.len(),
            resolved = points.iter().filter(|p| p.is_resolved()).count(),
            "resolved breakevens"
        );
        points
    }

    /// `(n, poolReference - cumulativeCost(entry_n, n))` for every step from
    /// entry to the horizon. Empty if the entry is not in the sequence.
    ///
    /// The breakeven step is the first point whose profit is zero or below.
    pub fn profit_line(&self, entry: EntryPoint) -> Vec<ProfitPoint> {
        let entry_n = entry.n();
        if !self.sequence.contains(entry_n) {
            return Vec::new();
        }
        let target = self.pool_reference(entry_n);
        (entry_n..=self.sequence.n_max())
            .map(|n| ProfitPoint { n, profit: target - self.cost.range(entry_n, n) })
            .collect()
    }
}

/// Resolve breakevens for a batch of entries under `rule`.
pub fn resolve_breakevens(
    sequence: &StepSequence,
    entries: &[EntryPoint],
    rule: BreakevenRule,
) -> Result<Vec<BreakevenPoint>, ArgumentError> {
    Ok(BreakevenResolver::new(sequence, rule)?.resolve_all(entries))
}

/// Resolve breakevens from an ingested threshold table: for each entry in
/// the sequence, the first step `n >= entryN` whose `poolSize` reaches the
/// entry's governing threshold.
pub fn resolve_from_thresholds(
    sequence: &StepSequence,
    table: &BreakevenThresholds,
) -> Vec<BreakevenPoint> {
    let points: Vec<BreakevenPoint> = table
        .entries()
        .filter(|&entry_n| sequence.contains(entry_n))
        .filter_map(|entry_n| {
            let threshold = table.governing(entry_n)?;
            let breakeven_n = sequence
                .range(entry_n, sequence.n_max())
                .iter()
                .find(|r| r.pool_size >= threshold)
                .map(|r| r.n);
            Some(BreakevenPoint { entry_n, breakeven_n })
        })
        .collect();
    debug!(table_entries = table.len(), reported = points.len(), "resolved breakevens from thresholds");
    points
}
