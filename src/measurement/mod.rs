//! Measurement infrastructure.
//!
//! This module provides:
//! - Clock sources (wall clock, serialized cycle counter, manual test clock)
//! - A stopwatch whose window can be paused to exclude setup work
//! - The adaptive trial runner built on both
//!
//! # Clock Selection
//!
//! The default clock is `std::time::Instant`. The cycle counter reads:
//! - **x86_64**: `rdtsc` instruction (~1ns resolution)
//! - **aarch64**: `cntvct_el0` virtual timer (resolution varies by SoC)
//!
//! Trials last at least 200ms by default, so either clock's resolution is
//! far below the noise floor; the cycle counter mainly helps on platforms
//! where `Instant` is slow to read.

mod stopwatch;
mod timer;
mod trial;

pub use stopwatch::Stopwatch;
pub use timer::{black_box, AnyClock, Clock, CycleClock, ManualClock, MonotonicClock};
pub use trial::{TrialRunner, TrialSample, DEFAULT_MIN_TRIAL_DURATION, DEFAULT_TRIALS};
