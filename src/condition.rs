//! Test-instance generation for one sweep cell.
//!
//! A condition asks for `n` live elements after erasing a fraction `r` of
//! the population. The generator inserts `m = round(n / (1 - r))` random
//! keys, then erases each element independently with probability `r`, so
//! the live elements sit among the holes a real workload would leave.

use rand::{RngCore, SeedableRng};
use rand_xoshiro::SplitMix64;
use tracing::trace;

use crate::container::{BulkContainer, Keyed};
use crate::error::{BenchError, Result};

/// 2^64 as a float, the scale of one 64-bit uniform draw.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Target live size and erasure rate of one generated instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    size: usize,
    erasure_rate: f64,
}

impl Condition {
    /// Create a condition. The rate must lie in `[0, 1)`.
    pub fn new(size: usize, erasure_rate: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&erasure_rate) {
            return Err(BenchError::InvalidErasureRate(erasure_rate));
        }
        Ok(Self { size, erasure_rate })
    }

    /// Expected live elements after erasure.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fraction of the population erased.
    pub fn erasure_rate(&self) -> f64 {
        self.erasure_rate
    }

    /// Elements inserted before erasing: `round(n / (1 - r))`.
    pub fn physical_count(&self) -> usize {
        (self.size as f64 / (1.0 - self.erasure_rate)).round() as usize
    }

    /// Draws below this value erase their element: `round(r * 2^64)`.
    ///
    /// Zero when the rate is zero, so nothing is erased.
    pub fn erasure_cut(&self) -> u64 {
        // Float-to-int `as` saturates at u64::MAX.
        (self.erasure_rate * TWO_POW_64).round() as u64
    }

    /// Estimated peak footprint of an instance with `element_size`-byte
    /// elements.
    pub fn footprint_bytes(&self, element_size: usize) -> f64 {
        self.size as f64 * element_size as f64 / (1.0 - self.erasure_rate)
    }
}

/// Builds a populated and partially erased container for a condition.
pub trait Populate {
    /// Build one fresh instance.
    fn populate<K: BulkContainer>(&mut self, condition: &Condition) -> Result<K>;
}

/// Default [`Populate`] implementation driven by SplitMix64.
///
/// Every call starts a new generator from the same seed, so all variants
/// measured for one cell sort the same keys with the same holes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionGenerator {
    seed: u64,
}

impl ConditionGenerator {
    /// Create a generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Populate for ConditionGenerator {
    fn populate<K: BulkContainer>(&mut self, condition: &Condition) -> Result<K> {
        let mut rng = SplitMix64::seed_from_u64(self.seed);
        let total = condition.physical_count();
        let cut = condition.erasure_cut();

        let mut container = K::new();
        for _ in 0..total {
            container.insert(K::Item::from_key(rng.next_u64() as i32))?;
        }
        let erased = if cut == 0 {
            0
        } else {
            container.retain(|_| rng.next_u64() >= cut)?
        };

        trace!(total, erased, live = container.len(), "generated instance");
        Ok(container)
    }
}
