//! Clock resolution check.
//!
//! A trial only stops once its window reaches the duration floor, so a clock
//! that ticks coarsely relative to that floor quantizes every per-run value.
//! On aarch64 the virtual counter ticks at ~24 MHz (~41ns); a coarse
//! fallback clock can be far worse.

use std::fmt;
use std::time::Duration;

use crate::measurement::Clock;

/// Readings taken when estimating the tick.
const TICK_READINGS: usize = 1000;

/// The floor should span at least this many ticks.
const MIN_TICKS_PER_TRIAL: f64 = 10_000.0;

/// The clock is too coarse for the configured trial floor.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionWarning {
    /// Smallest observed non-zero step between readings.
    pub tick: Duration,
    /// Configured per-trial floor.
    pub min_trial_duration: Duration,
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "clock ticks every ~{:?}, only {:.0} ticks per {:?} trial; raise FRAGSORT_MIN_TRIAL_MS",
            self.tick,
            self.min_trial_duration.as_secs_f64() / self.tick.as_secs_f64(),
            self.min_trial_duration
        )
    }
}

/// Smallest non-zero difference between consecutive readings of `clock`.
///
/// Returns `None` if the clock never advanced across those readings.
pub fn estimate_tick<C: Clock>(clock: &C) -> Option<Duration> {
    let mut last = clock.now();
    let mut tick: Option<Duration> = None;
    for _ in 0..TICK_READINGS {
        let now = clock.now();
        let step = now.saturating_sub(last);
        if !step.is_zero() {
            tick = Some(tick.map_or(step, |t| t.min(step)));
        }
        last = now;
    }
    tick
}

/// Warn when `min_trial_duration` spans too few ticks of `tick`.
pub fn resolution_check(tick: Duration, min_trial_duration: Duration) -> Option<ResolutionWarning> {
    if tick.is_zero() {
        return None;
    }
    let ticks = min_trial_duration.as_secs_f64() / tick.as_secs_f64();
    (ticks < MIN_TICKS_PER_TRIAL).then_some(ResolutionWarning {
        tick,
        min_trial_duration,
    })
}
