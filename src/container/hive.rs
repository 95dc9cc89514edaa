//! Block list with growing block capacities and a free list of erased slots.
//!
//! Used as the baseline container. Erasing leaves a hole that a later insert
//! may reuse; the blocks themselves are never compacted.

use super::{sort_order, sort_run, BulkContainer, Keyed};
use crate::config::SortStability;
use crate::error::{try_reserve, Result};

/// Capacity of the first block.
const MIN_BLOCK_CAPACITY: usize = 8;

/// Blocks stop doubling at this capacity.
const MAX_BLOCK_CAPACITY: usize = 8192;

#[derive(Debug)]
struct Block<T> {
    slots: Vec<Option<T>>,
    capacity: usize,
}

/// Baseline bulk container.
#[derive(Debug)]
pub struct Hive<T> {
    blocks: Vec<Block<T>>,
    free: Vec<(usize, usize)>,
    len: usize,
}

impl<T: Keyed> Hive<T> {
    /// Total slots in use or erased.
    pub fn slot_count(&self) -> usize {
        self.blocks.iter().map(|b| b.slots.len()).sum()
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Live elements in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.blocks.iter().flat_map(|b| b.slots.iter().flatten())
    }

    fn add_block(&mut self) -> Result<()> {
        let capacity = self
            .blocks
            .last()
            .map_or(MIN_BLOCK_CAPACITY, |b| (b.capacity * 2).min(MAX_BLOCK_CAPACITY));

        try_reserve(&mut self.blocks, 1, "growing the hive block list")?;
        let mut slots = Vec::new();
        try_reserve(&mut slots, capacity, "allocating a hive block")?;
        self.blocks.push(Block { slots, capacity });
        Ok(())
    }

    /// Sort the live elements by key in place.
    ///
    /// Live elements are moved out in iteration order, sorted, and written
    /// back into the same slots, so the hole pattern is unchanged.
    pub fn sort(&mut self, stability: SortStability) -> Result<()> {
        let slot_count = self.slot_count();
        let mut live: Vec<u64> = Vec::new();
        try_reserve(&mut live, slot_count.div_ceil(64), "marking hive slots")?;
        live.resize(slot_count.div_ceil(64), 0);

        let mut values = Vec::new();
        try_reserve(&mut values, self.len, "gathering hive elements")?;
        let mut order = sort_order(stability, self.len)?;

        let mut idx = 0;
        for block in &mut self.blocks {
            for slot in &mut block.slots {
                if let Some(item) = slot.take() {
                    live[idx / 64] |= 1 << (idx % 64);
                    values.push(item);
                }
                idx += 1;
            }
        }

        sort_run(&mut values, stability, &mut order)?;

        let mut sorted = values.into_iter();
        let mut idx = 0;
        for block in &mut self.blocks {
            for slot in &mut block.slots {
                if live[idx / 64] & (1 << (idx % 64)) != 0 {
                    *slot = sorted.next();
                }
                idx += 1;
            }
        }
        Ok(())
    }
}

impl<T: Keyed> BulkContainer for Hive<T> {
    type Item = T;

    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    fn insert(&mut self, item: T) -> Result<()> {
        if let Some((b, s)) = self.free.pop() {
            self.blocks[b].slots[s] = Some(item);
            self.len += 1;
            return Ok(());
        }

        let full = self
            .blocks
            .last()
            .map_or(true, |b| b.slots.len() == b.capacity);
        if full {
            self.add_block()?;
        }
        if let Some(block) = self.blocks.last_mut() {
            block.slots.push(Some(item));
            self.len += 1;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.len
    }

    fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) -> Result<usize> {
        let mut removed = 0;
        for (b, block) in self.blocks.iter_mut().enumerate() {
            for (s, slot) in block.slots.iter_mut().enumerate() {
                let erase = slot.as_ref().is_some_and(|item| !keep(item));
                if erase {
                    try_reserve(&mut self.free, 1, "recording erased hive slots")?;
                    *slot = None;
                    self.free.push((b, s));
                    removed += 1;
                    self.len -= 1;
                }
            }
        }
        Ok(removed)
    }

    fn keys(&self) -> Vec<i32> {
        self.iter().map(|e| e.key()).collect()
    }
}
