//! Symmetric selector-pair sample matrix.
//!
//! Relative distances are collected per pair of selectors. The matrix is
//! symmetric by construction: every insert and lookup goes through one
//! canonical-key normalization, so `(a, b)` and `(b, a)` always address the
//! same sample list. Canonical key: two real criteria are stored in ascending
//! rank order; the GTR sentinel always takes the second slot, overriding the
//! rank order, so baseline comparisons read as `(criterion, extra)`.

use std::collections::BTreeMap;

use crate::selector::Selector;

/// Canonical storage key for an unordered selector pair.
pub fn canonical_pair(a: Selector, b: Selector) -> (Selector, Selector) {
    if a.is_sentinel() {
        (b, a)
    } else if b.is_sentinel() || a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Per-pair sample lists, keyed canonically, ordered for stable iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairMatrix {
    samples: BTreeMap<(Selector, Selector), Vec<f64>>,
}

impl PairMatrix {
    pub fn new() -> Self {
        PairMatrix::default()
    }

    /// Record one relative-distance sample for the pair `(a, b)`.
    pub fn insert(&mut self, a: Selector, b: Selector, relative: f64) {
        self.samples
            .entry(canonical_pair(a, b))
            .or_default()
            .push(relative);
    }

    /// Samples for `(a, b)`; symmetric, so `samples(a, b)` and
    /// `samples(b, a)` return the same slice.
    pub fn samples(&self, a: Selector, b: Selector) -> Option<&[f64]> {
        self.samples
            .get(&canonical_pair(a, b))
            .map(Vec::as_slice)
    }

    /// Fold another matrix in by per-key concatenation. `other`'s samples
    /// keep their relative order behind the existing ones, so merging is
    /// associative and order-insensitive up to per-key multiset equality.
    pub fn merge(&mut self, other: PairMatrix) {
        for (key, mut values) in other.samples {
            self.samples.entry(key).or_default().append(&mut values);
        }
    }

    /// Canonical keys with their sample lists, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&(Selector, Selector), &Vec<f64>)> {
        self.samples.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Selector::*;

    #[test]
    fn non_sentinel_pairs_store_in_rank_order() {
        assert_eq!(canonical_pair(BicS, Aic), (Aic, BicS));
        assert_eq!(canonical_pair(Aic, BicS), (Aic, BicS));
        assert_eq!(canonical_pair(AiccM, AiccM), (AiccM, AiccM));
    }

    #[test]
    fn sentinel_always_takes_second_position() {
        for s in [Aic, AiccS, AiccM, BicS, BicM] {
            assert_eq!(canonical_pair(Gtr, s), (s, Gtr));
            assert_eq!(canonical_pair(s, Gtr), (s, Gtr));
        }
        assert_eq!(canonical_pair(Gtr, Gtr), (Gtr, Gtr));
    }

    #[test]
    fn lookups_are_symmetric() {
        let mut m = PairMatrix::new();
        m.insert(BicM, Aic, 0.4);
        m.insert(Aic, BicM, 0.1);
        assert_eq!(m.samples(Aic, BicM), Some(&[0.4, 0.1][..]));
        assert_eq!(m.samples(BicM, Aic), Some(&[0.4, 0.1][..]));
        assert_eq!(m.samples(Aic, Aic), None);
    }

    #[test]
    fn sentinel_insertions_land_in_one_key() {
        let mut m = PairMatrix::new();
        m.insert(Gtr, Aic, 0.3);
        m.insert(Aic, Gtr, 0.5);
        let keys: Vec<_> = m.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![(Aic, Gtr)]);
        assert_eq!(m.samples(Gtr, Aic), Some(&[0.3, 0.5][..]));
    }

    #[test]
    fn merge_is_order_insensitive_up_to_multisets() {
        let mut a = PairMatrix::new();
        a.insert(Aic, BicS, 0.1);
        a.insert(Aic, Gtr, 0.2);
        let mut b = PairMatrix::new();
        b.insert(BicS, Aic, 0.3);
        b.insert(AiccS, AiccS, 0.0);

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b;
        ba.merge(a);

        let sorted = |m: &PairMatrix, x, y| {
            let mut v = m.samples(x, y).unwrap().to_vec();
            v.sort_by(f64::total_cmp);
            v
        };
        for (x, y) in [(Aic, BicS), (Aic, Gtr), (AiccS, AiccS)] {
            assert_eq!(sorted(&ab, x, y), sorted(&ba, x, y));
        }
    }
}
