//! Bucketed container with 64-slot buckets and a `u64` occupancy mask.
//!
//! Inserts fill the lowest free slot of the most recently opened bucket
//! with room. Erasing clears mask bits and leaves the bucket in place, so a
//! heavily erased hub is sparse until [`Hub::compact`] closes the holes.
//!
//! Four competing sorts:
//! 1. [`Hub::sort_gather`]: move out, sort, write back into occupied slots
//! 2. [`Hub::sort_indirect`]: sort `(key, position)` pairs, then permute
//! 3. [`Hub::sort_compact`]: close holes first, then gather-sort
//! 4. [`Hub::sort_block_merge`]: sort per-bucket runs, then k-way merge

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::{sort_order, sort_run, Bits, BulkContainer, Keyed};
use crate::config::SortStability;
use crate::error::{try_reserve, BenchError, Result};

/// Slots per bucket.
pub const BUCKET_SLOTS: usize = 64;

#[derive(Debug)]
struct Bucket<T> {
    slots: Vec<Option<T>>,
    mask: u64,
}

/// Competing bulk container.
#[derive(Debug)]
pub struct Hub<T> {
    buckets: Vec<Bucket<T>>,
    /// Buckets with a free slot; the top is filled first.
    open: Vec<usize>,
    len: usize,
}

impl<T: Keyed> Hub<T> {
    /// Number of buckets, including empty ones.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Live elements divided by total slots (1.0 when dense).
    pub fn density(&self) -> f64 {
        let slots = self.buckets.len() * BUCKET_SLOTS;
        if slots == 0 {
            1.0
        } else {
            self.len as f64 / slots as f64
        }
    }

    /// Live elements in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets
            .iter()
            .flat_map(|b| Bits(b.mask).filter_map(move |s| b.slots[s].as_ref()))
    }

    fn add_bucket(&mut self) -> Result<usize> {
        try_reserve(&mut self.buckets, 1, "growing the hub bucket list")?;
        try_reserve(&mut self.open, 1, "tracking open hub buckets")?;
        let mut slots = Vec::new();
        try_reserve(&mut slots, BUCKET_SLOTS, "allocating a hub bucket")?;
        slots.resize_with(BUCKET_SLOTS, || None);

        let idx = self.buckets.len();
        self.buckets.push(Bucket { slots, mask: 0 });
        self.open.push(idx);
        Ok(idx)
    }

    fn rebuild_open(&mut self) -> Result<()> {
        self.open.clear();
        let count = self.buckets.iter().filter(|b| b.mask != u64::MAX).count();
        try_reserve(&mut self.open, count, "tracking open hub buckets")?;
        // Lowest index ends on top.
        for (idx, bucket) in self.buckets.iter().enumerate().rev() {
            if bucket.mask != u64::MAX {
                self.open.push(idx);
            }
        }
        Ok(())
    }

    #[inline]
    fn take_at(&mut self, pos: usize) -> Option<T> {
        let bucket = &mut self.buckets[pos / BUCKET_SLOTS];
        bucket.mask &= !(1 << (pos % BUCKET_SLOTS));
        bucket.slots[pos % BUCKET_SLOTS].take()
    }

    #[inline]
    fn put_at(&mut self, pos: usize, item: T) {
        let bucket = &mut self.buckets[pos / BUCKET_SLOTS];
        bucket.mask |= 1 << (pos % BUCKET_SLOTS);
        bucket.slots[pos % BUCKET_SLOTS] = Some(item);
    }

    /// Move every live element out in iteration order. Masks are left
    /// untouched so [`Hub::refill`] can write back into the same slots.
    fn drain_live(&mut self) -> Result<Vec<T>> {
        let mut buf = Vec::new();
        try_reserve(&mut buf, self.len, "gathering hub elements")?;
        for bucket in &mut self.buckets {
            for s in Bits(bucket.mask) {
                if let Some(item) = bucket.slots[s].take() {
                    buf.push(item);
                }
            }
        }
        Ok(buf)
    }

    /// Write `items` into the occupied slots in iteration order.
    fn refill<I: IntoIterator<Item = T>>(&mut self, items: I) {
        let mut items = items.into_iter();
        for bucket in &mut self.buckets {
            for s in Bits(bucket.mask) {
                bucket.slots[s] = items.next();
            }
        }
    }

    /// Slide every live element down into the lowest free slot, keeping
    /// iteration order, then release the emptied buckets.
    pub fn compact(&mut self) -> Result<()> {
        let mut write = 0;
        for b in 0..self.buckets.len() {
            for s in Bits(self.buckets[b].mask) {
                let pos = b * BUCKET_SLOTS + s;
                if pos != write {
                    if let Some(item) = self.take_at(pos) {
                        self.put_at(write, item);
                    }
                }
                write += 1;
            }
        }

        self.buckets.truncate(self.len.div_ceil(BUCKET_SLOTS));
        self.rebuild_open()
    }

    /// Gather the live elements, sort them, and write them back into the
    /// same slots.
    pub fn sort_gather(&mut self, stability: SortStability) -> Result<()> {
        let mut order = sort_order(stability, self.len)?;
        let mut buf = self.drain_live()?;
        sort_run(&mut buf, stability, &mut order)?;
        self.refill(buf);
        Ok(())
    }

    /// Sort `(key, position)` pairs and move elements in that order.
    ///
    /// Positions are unique, so ties resolve in iteration order and the
    /// result is stable whatever `SortStability` says.
    pub fn sort_indirect(&mut self) -> Result<()> {
        let mut order: Vec<(i32, usize)> = Vec::new();
        try_reserve(&mut order, self.len, "building the hub sort index")?;
        for (b, bucket) in self.buckets.iter().enumerate() {
            for s in Bits(bucket.mask) {
                if let Some(item) = &bucket.slots[s] {
                    order.push((item.key(), b * BUCKET_SLOTS + s));
                }
            }
        }
        order.sort_unstable();

        let mut sorted = Vec::new();
        try_reserve(&mut sorted, order.len(), "permuting hub elements")?;
        for &(_, pos) in &order {
            if let Some(item) = self.buckets[pos / BUCKET_SLOTS].slots[pos % BUCKET_SLOTS].take() {
                sorted.push(item);
            }
        }
        self.refill(sorted);
        Ok(())
    }

    /// Close every hole, then gather-sort the dense prefix.
    pub fn sort_compact(&mut self, stability: SortStability) -> Result<()> {
        self.compact()?;
        self.sort_gather(stability)
    }

    /// Sort each bucket's elements as a run, then merge the runs.
    ///
    /// Ties across runs go to the lower bucket, so the merge is stable when
    /// the runs are sorted stably.
    pub fn sort_block_merge(&mut self, stability: SortStability) -> Result<()> {
        let mut run_order = sort_order(stability, BUCKET_SLOTS)?;
        let mut buf = self.drain_live()?;

        let mut bounds = Vec::new();
        try_reserve(&mut bounds, self.buckets.len() + 1, "splitting hub runs")?;
        bounds.push(0);
        let mut end = 0;
        for bucket in &self.buckets {
            let count = bucket.mask.count_ones() as usize;
            if count > 0 {
                end += count;
                bounds.push(end);
            }
        }
        for w in bounds.windows(2) {
            sort_run(&mut buf[w[0]..w[1]], stability, &mut run_order)?;
        }

        let runs = bounds.len() - 1;
        let mut cursor = Vec::new();
        try_reserve(&mut cursor, runs, "merging hub runs")?;
        cursor.extend_from_slice(&bounds[..runs]);

        let mut heap = BinaryHeap::new();
        heap.try_reserve(runs)
            .map_err(|source| BenchError::out_of_memory("merging hub runs", runs, source))?;
        for (r, &start) in cursor.iter().enumerate() {
            heap.push(Reverse((buf[start].key(), r)));
        }

        let mut order = Vec::new();
        try_reserve(&mut order, buf.len(), "merging hub runs")?;
        while let Some(Reverse((_, r))) = heap.pop() {
            let i = cursor[r];
            order.push(i);
            cursor[r] += 1;
            if cursor[r] < bounds[r + 1] {
                heap.push(Reverse((buf[cursor[r]].key(), r)));
            }
        }

        let mut pool = Vec::new();
        try_reserve(&mut pool, buf.len(), "merging hub runs")?;
        pool.extend(buf.into_iter().map(Some));
        self.refill(order.into_iter().filter_map(|i| pool[i].take()));
        Ok(())
    }
}

impl<T: Keyed> BulkContainer for Hub<T> {
    type Item = T;

    fn new() -> Self {
        Self {
            buckets: Vec::new(),
            open: Vec::new(),
            len: 0,
        }
    }

    fn insert(&mut self, item: T) -> Result<()> {
        let b = match self.open.last() {
            Some(&b) => b,
            None => self.add_bucket()?,
        };
        let bucket = &mut self.buckets[b];
        let s = (!bucket.mask).trailing_zeros() as usize;
        bucket.slots[s] = Some(item);
        bucket.mask |= 1 << s;
        if bucket.mask == u64::MAX {
            self.open.pop();
        }
        self.len += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.len
    }

    fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) -> Result<usize> {
        let mut removed = 0;
        for bucket in &mut self.buckets {
            for s in Bits(bucket.mask) {
                let erase = bucket.slots[s].as_ref().is_some_and(|item| !keep(item));
                if erase {
                    bucket.slots[s] = None;
                    bucket.mask &= !(1 << s);
                    removed += 1;
                }
            }
        }
        self.len -= removed;
        self.rebuild_open()?;
        Ok(removed)
    }

    fn keys(&self) -> Vec<i32> {
        self.iter().map(|e| e.key()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Element;

    type E = Element<4>;

    fn filled(keys: impl IntoIterator<Item = i32>) -> Hub<E> {
        let mut hub = Hub::new();
        for k in keys {
            hub.insert(E::from_key(k)).unwrap();
        }
        hub
    }

    fn sparse() -> Hub<E> {
        let mut hub = filled((0..300).rev());
        hub.retain(|e| e.key() % 3 != 0).unwrap();
        hub
    }

    fn is_sorted(keys: &[i32]) -> bool {
        keys.windows(2).all(|w| w[0] <= w[1])
    }

    #[test]
    fn test_insert_fills_buckets_in_order() {
        let hub = filled(0..130);
        assert_eq!(hub.bucket_count(), 3);
        assert_eq!(hub.len(), 130);
        assert_eq!(hub.keys(), (0..130).collect::<Vec<_>>());
    }

    #[test]
    fn test_retain_keeps_buckets() {
        let hub = sparse();
        assert_eq!(hub.len(), 200);
        assert_eq!(hub.bucket_count(), 5);
        assert!(hub.density() < 0.7);
    }

    #[test]
    fn test_insert_after_retain_reuses_lowest_bucket() {
        let mut hub = sparse();
        hub.insert(E::from_key(-1)).unwrap();
        assert_eq!(hub.bucket_count(), 5);
        // Keys 299 and 298 survive; 297 left the first hole.
        assert_eq!(&hub.keys()[..3], &[299, 298, -1]);
    }

    #[test]
    fn test_every_sort_orders_keys() {
        for which in 0..4 {
            let mut hub = sparse();
            match which {
                0 => hub.sort_gather(SortStability::Unstable).unwrap(),
                1 => hub.sort_indirect().unwrap(),
                2 => hub.sort_compact(SortStability::Unstable).unwrap(),
                _ => hub.sort_block_merge(SortStability::Unstable).unwrap(),
            }
            let keys = hub.keys();
            assert_eq!(keys.len(), 200, "sort {} lost elements", which);
            assert!(is_sorted(&keys), "sort {} left keys unsorted", which);
        }
    }

    #[test]
    fn test_compact_releases_buckets() {
        let mut hub = sparse();
        hub.compact().unwrap();
        assert_eq!(hub.len(), 200);
        assert_eq!(hub.bucket_count(), 4);
        let mut expected: Vec<i32> = (0..300).rev().filter(|k| k % 3 != 0).collect();
        let mut keys = hub.keys();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_sort_empty_hub() {
        let mut hub: Hub<E> = Hub::new();
        hub.sort_gather(SortStability::Stable).unwrap();
        hub.sort_indirect().unwrap();
        hub.sort_compact(SortStability::Stable).unwrap();
        hub.sort_block_merge(SortStability::Stable).unwrap();
        assert!(hub.is_empty());
    }
}
