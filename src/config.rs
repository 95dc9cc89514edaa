//! Configuration for a benchmark sweep.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::{BenchError, Result};
use crate::measurement::{DEFAULT_MIN_TRIAL_DURATION, DEFAULT_TRIALS};
use crate::variant::Variant;

/// Memory ceiling on 32-bit address spaces (800 MiB).
pub const MEMORY_CEILING_32: u64 = 800 * 1024 * 1024;

/// Memory ceiling on 64-bit address spaces (2 GiB).
pub const MEMORY_CEILING_64: u64 = 2048 * 1024 * 1024;

/// Ceiling for the current target's pointer width.
pub const fn platform_memory_ceiling() -> u64 {
    if std::mem::size_of::<usize>() == 4 {
        MEMORY_CEILING_32
    } else {
        MEMORY_CEILING_64
    }
}

/// Size of the benchmarked element in bytes (a 4-byte key plus payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementSize {
    /// Key only.
    B4,
    /// 4-byte payload.
    B8,
    /// 12-byte payload.
    B16,
    /// 28-byte payload.
    B32,
    /// 60-byte payload.
    B64,
    /// 124-byte payload.
    B128,
}

impl ElementSize {
    /// Size in bytes.
    pub fn bytes(self) -> usize {
        match self {
            ElementSize::B4 => 4,
            ElementSize::B8 => 8,
            ElementSize::B16 => 16,
            ElementSize::B32 => 32,
            ElementSize::B64 => 64,
            ElementSize::B128 => 128,
        }
    }

    /// Parse a byte count.
    pub fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            4 => Some(ElementSize::B4),
            8 => Some(ElementSize::B8),
            16 => Some(ElementSize::B16),
            32 => Some(ElementSize::B32),
            64 => Some(ElementSize::B64),
            128 => Some(ElementSize::B128),
            _ => None,
        }
    }
}

/// Whether equal keys must keep their relative order when sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortStability {
    /// Equal keys may be reordered.
    #[default]
    Unstable,
    /// Equal keys keep their iteration order.
    Stable,
}

/// Which clock times the trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSpec {
    /// `std::time::Instant`.
    #[default]
    Monotonic,
    /// Serialized CPU cycle counter, calibrated against the wall clock.
    Cycles,
}

/// Configuration options for a sweep.
#[derive(Debug, Clone)]
pub struct Config {
    /// Trials per measurement (default: 10).
    pub trials: usize,

    /// Minimum timed duration of one trial (default: 200ms).
    pub min_trial_duration: Duration,

    /// Erasure rates, one report row each (default: 0.0, 0.1, ..., 0.9).
    pub erasure_rates: Vec<f64>,

    /// Size exponents, one report column each; a cell holds `10^k` live
    /// elements (default: 3..=7).
    pub size_exponents: Vec<u32>,

    /// Cells whose estimated footprint exceeds this many bytes are skipped
    /// (default: 800 MiB on 32-bit targets, 2 GiB on 64-bit).
    pub memory_ceiling_bytes: u64,

    /// Element size (default: 16 bytes).
    pub element_size: ElementSize,

    /// Seed for test-data generation (default: 0).
    pub seed: u64,

    /// Stability requirement for every sort (default: unstable).
    pub stability: SortStability,

    /// Competitors to run, in display order (default: all four hub sorts).
    ///
    /// Variants the element size does not support are dropped at runtime.
    pub competitors: Vec<Variant>,

    /// Clock used for trials (default: monotonic).
    pub clock: ClockSpec,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            min_trial_duration: DEFAULT_MIN_TRIAL_DURATION,
            erasure_rates: (0..10).map(|i| i as f64 / 10.0).collect(),
            size_exponents: (3..=7).collect(),
            memory_ceiling_bytes: platform_memory_ceiling(),
            element_size: ElementSize::B16,
            seed: 0,
            stability: SortStability::Unstable,
            competitors: Variant::COMPETITORS.to_vec(),
            clock: ClockSpec::Monotonic,
        }
    }
}

impl Config {
    /// Set trials per measurement.
    pub fn trials(mut self, n: usize) -> Self {
        self.trials = n;
        self
    }

    /// Set the per-trial duration floor.
    pub fn min_trial_duration(mut self, d: Duration) -> Self {
        self.min_trial_duration = d;
        self
    }

    /// Set the erasure-rate rows.
    pub fn erasure_rates(mut self, rates: impl Into<Vec<f64>>) -> Self {
        self.erasure_rates = rates.into();
        self
    }

    /// Set the size-exponent columns.
    pub fn size_exponents(mut self, exponents: impl Into<Vec<u32>>) -> Self {
        self.size_exponents = exponents.into();
        self
    }

    /// Set the memory ceiling in bytes.
    pub fn memory_ceiling_bytes(mut self, bytes: u64) -> Self {
        self.memory_ceiling_bytes = bytes;
        self
    }

    /// Set the element size.
    pub fn element_size(mut self, size: ElementSize) -> Self {
        self.element_size = size;
        self
    }

    /// Set the data seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the sort stability requirement.
    pub fn stability(mut self, stability: SortStability) -> Self {
        self.stability = stability;
        self
    }

    /// Set the competitor list.
    pub fn competitors(mut self, competitors: impl Into<Vec<Variant>>) -> Self {
        self.competitors = competitors.into();
        self
    }

    /// Set the clock.
    pub fn clock(mut self, clock: ClockSpec) -> Self {
        self.clock = clock;
        self
    }

    /// Competitors that support the configured element size.
    pub fn enabled_competitors(&self) -> Vec<Variant> {
        self.competitors_supporting(self.element_size.bytes())
    }

    /// Configured competitors that support `element_size`-byte elements, in
    /// display order.
    pub fn competitors_supporting(&self, element_size: usize) -> Vec<Variant> {
        self.competitors
            .iter()
            .copied()
            .filter(|v| v.supports(element_size))
            .collect()
    }

    /// Merge overrides from `FRAGSORT_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env(mut self) -> Self {
        if let Some(n) = parse_env::<usize>("FRAGSORT_TRIALS") {
            self = self.trials(n);
        }
        if let Some(ms) = parse_env::<u64>("FRAGSORT_MIN_TRIAL_MS") {
            self = self.min_trial_duration(Duration::from_millis(ms));
        }
        if let Some(bytes) = parse_env::<usize>("FRAGSORT_ELEMENT_SIZE") {
            match ElementSize::from_bytes(bytes) {
                Some(size) => self = self.element_size(size),
                None => warn!(bytes, "FRAGSORT_ELEMENT_SIZE must be 4, 8, 16, 32, 64 or 128; ignoring"),
            }
        }
        if let Some(mb) = parse_env::<u64>("FRAGSORT_MEMORY_CEILING_MB") {
            self = self.memory_ceiling_bytes(mb.saturating_mul(1024 * 1024));
        }
        if let Some(seed) = parse_env::<u64>("FRAGSORT_SEED") {
            self = self.seed(seed);
        }
        if let Ok(val) = env::var("FRAGSORT_STABLE") {
            if val == "1" || val.eq_ignore_ascii_case("true") {
                self = self.stability(SortStability::Stable);
            }
        }
        if let Ok(raw) = env::var("FRAGSORT_VARIANTS") {
            match parse_variants(&raw) {
                Some(list) => self = self.competitors(list),
                None => warn!(value = %raw, "unrecognized FRAGSORT_VARIANTS; ignoring"),
            }
        }
        if let Ok(raw) = env::var("FRAGSORT_CLOCK") {
            match raw.to_ascii_lowercase().as_str() {
                "monotonic" => self = self.clock(ClockSpec::Monotonic),
                "cycles" => self = self.clock(ClockSpec::Cycles),
                _ => warn!(value = %raw, "FRAGSORT_CLOCK must be monotonic or cycles; ignoring"),
            }
        }
        if let Some(max) = parse_env::<u32>("FRAGSORT_MAX_EXPONENT") {
            self.size_exponents.retain(|&k| k <= max);
        }
        self
    }

    /// Check that the configuration can drive a sweep.
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(BenchError::InvalidConfig("trials must be at least 1".into()));
        }
        if self.erasure_rates.is_empty() {
            return Err(BenchError::InvalidConfig("no erasure rates to sweep".into()));
        }
        if self.size_exponents.is_empty() {
            return Err(BenchError::InvalidConfig("no size exponents to sweep".into()));
        }
        if let Some(&rate) = self
            .erasure_rates
            .iter()
            .find(|r| !(0.0..1.0).contains(*r))
        {
            return Err(BenchError::InvalidErasureRate(rate));
        }
        if let Some(&k) = self.size_exponents.iter().find(|&&k| k > 18) {
            return Err(BenchError::InvalidConfig(format!(
                "size exponent {} overflows the element count",
                k
            )));
        }
        if self.competitors.iter().any(|v| *v == Variant::BASELINE) {
            return Err(BenchError::InvalidConfig(format!(
                "{} is the baseline and cannot compete",
                Variant::BASELINE.name()
            )));
        }
        if self.enabled_competitors().is_empty() {
            return Err(BenchError::InvalidConfig(format!(
                "no competitor supports {}-byte elements",
                self.element_size.bytes()
            )));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(val) => Some(val),
        Err(_) => {
            warn!(key, value = %raw, "unparseable environment override; ignoring");
            None
        }
    }
}

fn parse_variants(raw: &str) -> Option<Vec<Variant>> {
    let list: Option<Vec<Variant>> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Variant::from_name)
        .collect();
    list.filter(|l| !l.is_empty())
}
