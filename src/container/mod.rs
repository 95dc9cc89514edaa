//! Bulk containers whose sort operations are benchmarked.
//!
//! Both containers keep erased slots as holes instead of compacting, so a
//! container that was filled and then partially erased has the fragmented
//! layout the sweep is meant to exercise.

mod element;
mod hive;
mod hub;

pub use element::{Element, Keyed};
pub use hive::Hive;
pub use hub::{Hub, BUCKET_SLOTS};

use crate::config::SortStability;
use crate::error::{try_reserve, Result};

/// Capability set the harness needs from a container under test.
pub trait BulkContainer: Sized {
    /// Stored element type.
    type Item: Keyed;

    /// Create an empty container.
    fn new() -> Self;

    /// Insert one element, reporting allocation failure.
    fn insert(&mut self, item: Self::Item) -> Result<()>;

    /// Number of live elements.
    fn len(&self) -> usize;

    /// Whether the container holds no live elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Erase every element for which `keep` returns false, leaving holes.
    ///
    /// `keep` is called once per live element in iteration order. Returns
    /// the number of erased elements.
    fn retain<F: FnMut(&Self::Item) -> bool>(&mut self, keep: F) -> Result<usize>;

    /// Keys of the live elements in iteration order.
    fn keys(&self) -> Vec<i32>;
}

/// Room for the `(key, index)` pairs a stable [`sort_run`] over up to
/// `run_len` elements needs. Empty for unstable sorts.
pub(crate) fn sort_order(stability: SortStability, run_len: usize) -> Result<Vec<(i32, usize)>> {
    let mut order = Vec::new();
    if stability == SortStability::Stable {
        try_reserve(&mut order, run_len, "reserving the stable sort order")?;
    }
    Ok(order)
}

/// Sort a contiguous run by key.
///
/// The stable path sorts `(key, index)` pairs in `order` and then permutes
/// `run` in place, so the only allocation is the fallible one for `order`.
/// `slice::sort_by_key` would allocate its merge buffer infallibly.
pub(crate) fn sort_run<T: Keyed>(
    run: &mut [T],
    stability: SortStability,
    order: &mut Vec<(i32, usize)>,
) -> Result<()> {
    if stability == SortStability::Unstable {
        run.sort_unstable_by_key(|e| e.key());
        return Ok(());
    }

    order.clear();
    try_reserve(order, run.len(), "ordering a stable sort")?;
    order.extend(run.iter().enumerate().map(|(i, e)| (e.key(), i)));
    // Indices are unique, so ties keep their input order.
    order.sort_unstable();

    // order[j].1 is the index the element for slot j currently comes from.
    // Visited slots are marked by pointing them at themselves.
    for start in 0..run.len() {
        let mut dst = start;
        loop {
            let src = order[dst].1;
            order[dst].1 = dst;
            if src == start {
                break;
            }
            run.swap(dst, src);
            dst = src;
        }
    }
    Ok(())
}

/// Iterator over the set bit positions of a mask, lowest first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bits(pub u64);

impl Iterator for Bits {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_iterates_set_positions() {
        let bits: Vec<usize> = Bits(0b1010_0001).collect();
        assert_eq!(bits, vec![0, 5, 7]);
        assert_eq!(Bits(0).count(), 0);
        assert_eq!(Bits(u64::MAX).count(), 64);
    }

    #[test]
    fn test_sort_run_stable_keeps_order() {
        type E = Element<4>;
        let mut run: Vec<E> = (0..8).map(|i| E::with_payload(i % 2, [i as u8; 4])).collect();
        let mut order = sort_order(SortStability::Stable, run.len()).unwrap();
        sort_run(&mut run, SortStability::Stable, &mut order).unwrap();
        let tags: Vec<u8> = run.iter().map(|e| e.payload()[0]).collect();
        assert_eq!(tags, vec![0, 2, 4, 6, 1, 3, 5, 7]);
    }

    #[test]
    fn test_stable_permutation_follows_every_cycle() {
        type E = Element<4>;
        // Keys chosen so the permutation has a 5-cycle, a swap and a fixed point.
        let keys = [2, 0, 1, 4, 3, 5, 1, 0];
        let mut run: Vec<E> = keys
            .iter()
            .enumerate()
            .map(|(i, &k)| E::with_payload(k, [i as u8; 4]))
            .collect();
        let mut order = Vec::new();
        sort_run(&mut run, SortStability::Stable, &mut order).unwrap();

        let got: Vec<(i32, u8)> = run.iter().map(|e| (e.key(), e.payload()[0])).collect();
        let mut want: Vec<(i32, u8)> = keys.iter().enumerate().map(|(i, &k)| (k, i as u8)).collect();
        want.sort_by_key(|&(k, _)| k);
        assert_eq!(got, want);
    }

    #[test]
    fn test_sort_run_reuses_order_buffer() {
        type E = Element<4>;
        let mut order = sort_order(SortStability::Stable, 16).unwrap();
        assert!(order.capacity() >= 16);
        for round in 0..3 {
            let mut run: Vec<E> = (0..16).rev().map(|k| E::from_key(k + round)).collect();
            sort_run(&mut run, SortStability::Stable, &mut order).unwrap();
            let keys: Vec<i32> = run.iter().map(|e| e.key()).collect();
            assert_eq!(keys, (round..16 + round).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_unstable_sort_needs_no_order_buffer() {
        let order = sort_order(SortStability::Unstable, 1 << 20).unwrap();
        assert_eq!(order.capacity(), 0);
    }

    #[test]
    fn test_unaffordable_stable_order_is_out_of_memory() {
        let err = sort_order(SortStability::Stable, usize::MAX / 4).unwrap_err();
        assert!(err.is_out_of_memory(), "{}", err);
    }
}
