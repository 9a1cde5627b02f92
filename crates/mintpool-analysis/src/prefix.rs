//! Prefix sums over a per-step quantity.
//!
//! Every engine needs "sum of X over steps `a..=b`" for many `(a, b)` pairs.
//! One O(n) pass makes each of those O(1).

use mintpool_core::types::StepRecord;
use mintpool_core::StepSequence;

/// `totals[i]` is the sum of the quantity over steps `1..=i`; `totals[0] = 0`.
#[derive(Debug, Clone)]
pub struct PrefixSums {
    totals: Vec<f64>,
}

impl PrefixSums {
    pub fn new<F>(sequence: &StepSequence, value: F) -> Self
    where
        F: Fn(&StepRecord) -> f64,
    {
        let mut totals = Vec::with_capacity(sequence.len() + 1);
        let mut running = 0.0;
        totals.push(running);
        for record in sequence {
            running += value(record);
            totals.push(running);
        }
        Self { totals }
    }

    /// Last step covered.
    pub fn n_max(&self) -> u32 {
        (self.totals.len() - 1) as u32
    }

    /// Sum over steps `from..=to`, clipped to `[1, n_max]`; zero when empty.
    pub fn range(&self, from: u32, to: u32) -> f64 {
        let from = from.max(1);
        let to = to.min(self.n_max());
        if from > to {
            return 0.0;
        }
        self.totals[to as usize] - self.totals[from as usize - 1]
    }

    /// Sum over steps `1..n` (exclusive of `n`).
    pub fn before(&self, n: u32) -> f64 {
        self.totals[(n.saturating_sub(1) as usize).min(self.totals.len() - 1)]
    }

    /// Sum over the whole sequence.
    pub fn total(&self) -> f64 {
        self.totals[self.totals.len() - 1]
    }

    /// Smallest `k` in `[from, n_max]` with `range(from, k) >= target`.
    ///
    /// The quantity is non-negative, so `range(from, k)` is monotone in `k`
    /// and the first crossing can be found by bisection.
    pub fn first_reaching(&self, from: u32, target: f64) -> Option<u32> {
        if from == 0 || from > self.n_max() {
            return None;
        }
        let base = self.totals[from as usize - 1];
        let candidates = &self.totals[from as usize..];
        let offset = candidates.partition_point(|&t| t - base < target);
        (offset < candidates.len()).then(|| from + offset as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mintpool_core::params::CurveParams;
    use mintpool_core::generate_curve;

    fn ones(n: u32) -> PrefixSums {
        let seq = generate_curve(&CurveParams::default(), n).unwrap();
        PrefixSums::new(&seq, |_| 1.0)
    }

    #[test]
    fn range_counts_steps() {
        let p = ones(10);
        assert_eq!(p.range(1, 10), 10.0);
        assert_eq!(p.range(3, 5), 3.0);
        assert_eq!(p.range(5, 5), 1.0);
        assert_eq!(p.range(6, 5), 0.0);
        assert_eq!(p.range(8, 40), 3.0);
        assert_eq!(p.range(0, 2), 2.0);
    }

    #[test]
    fn before_is_exclusive() {
        let p = ones(10);
        assert_eq!(p.before(1), 0.0);
        assert_eq!(p.before(4), 3.0);
        assert_eq!(p.before(50), 10.0);
        assert_eq!(p.total(), 10.0);
    }

    #[test]
    fn first_reaching_finds_crossing() {
        let p = ones(10);
        assert_eq!(p.first_reaching(3, 0.0), Some(3));
        assert_eq!(p.first_reaching(3, 2.5), Some(5));
        assert_eq!(p.first_reaching(3, 8.0), Some(10));
        assert_eq!(p.first_reaching(3, 8.5), None);
        assert_eq!(p.first_reaching(11, 0.0), None);
        assert_eq!(p.first_reaching(0, 0.0), None);
    }

    #[test]
    fn matches_direct_summation() {
        let seq = generate_curve(&CurveParams::default(), 300).unwrap();
        let p = PrefixSums::new(&seq, |r| r.price);
        let direct: f64 = seq.range(40, 260).iter().map(|r| r.price).sum();
        assert!((p.range(40, 260) - direct).abs() < 1e-12);
    }
}
