//! Timed-region stopwatch with pause/resume.
//!
//! The trial runner stamps the window start before each trial; the
//! operation under measurement brackets work it wants excluded (building
//! test data) with [`Stopwatch::pause`] and [`Stopwatch::resume`]. Resuming
//! shifts the window start forward by the paused interval, so
//! [`Stopwatch::elapsed_since_start`] never counts excluded time.
//!
//! Pairing is the caller's job. One pause may be active at a time and every
//! resume must follow a pause; debug builds assert this.

use std::time::Duration;

use super::timer::Clock;

/// Measurement window over a [`Clock`].
#[derive(Debug)]
pub struct Stopwatch<C> {
    clock: C,
    start: Duration,
    pause_mark: Option<Duration>,
}

impl<C: Clock> Stopwatch<C> {
    /// Create a stopwatch whose window starts now.
    pub fn new(clock: C) -> Self {
        let start = clock.now();
        Self {
            clock,
            start,
            pause_mark: None,
        }
    }

    /// The underlying clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current clock reading.
    #[inline]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Begin a new measurement window at the current instant.
    #[inline]
    pub fn mark_start(&mut self) {
        self.pause_mark = None;
        self.start = self.clock.now();
    }

    /// Start excluding time from the window.
    #[inline]
    pub fn pause(&mut self) {
        debug_assert!(self.pause_mark.is_none(), "pause() while already paused");
        self.pause_mark = Some(self.clock.now());
    }

    /// Stop excluding time; the paused interval is erased from the window.
    #[inline]
    pub fn resume(&mut self) {
        debug_assert!(self.pause_mark.is_some(), "resume() without pause()");
        if let Some(mark) = self.pause_mark.take() {
            self.start += self.clock.now().saturating_sub(mark);
        }
    }

    /// Whether a pause is active.
    pub fn is_paused(&self) -> bool {
        self.pause_mark.is_some()
    }

    /// Window length up to `now`, excluding paused intervals.
    #[inline]
    pub fn elapsed_since_start(&self, now: Duration) -> Duration {
        now.saturating_sub(self.start)
    }

    /// Window length up to the current instant.
    pub fn elapsed(&self) -> Duration {
        self.elapsed_since_start(self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::timer::{ManualClock, MonotonicClock};

    #[test]
    fn test_paused_interval_is_excluded() {
        let mut sw = Stopwatch::new(ManualClock::new());
        sw.mark_start();
        sw.clock().advance(Duration::from_millis(10));
        sw.pause();
        sw.clock().advance(Duration::from_millis(500));
        sw.resume();
        sw.clock().advance(Duration::from_millis(5));
        assert_eq!(sw.elapsed(), Duration::from_millis(15));
    }

    #[test]
    fn test_multiple_pauses_accumulate() {
        let mut sw = Stopwatch::new(ManualClock::new());
        sw.mark_start();
        for _ in 0..3 {
            sw.pause();
            sw.clock().advance(Duration::from_secs(1));
            sw.resume();
            sw.clock().advance(Duration::from_millis(2));
        }
        assert_eq!(sw.elapsed(), Duration::from_millis(6));
        assert!(!sw.is_paused());
    }

    #[test]
    fn test_mark_start_resets_window() {
        let mut sw = Stopwatch::new(ManualClock::new());
        sw.clock().advance(Duration::from_millis(40));
        assert_eq!(sw.elapsed(), Duration::from_millis(40));
        sw.mark_start();
        assert_eq!(sw.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_real_clock_excludes_sleep() {
        let mut sw = Stopwatch::new(MonotonicClock::new());
        sw.mark_start();
        sw.pause();
        std::thread::sleep(Duration::from_millis(100));
        sw.resume();
        let elapsed = sw.elapsed();
        assert!(elapsed < Duration::from_millis(50), "elapsed = {:?}", elapsed);
    }
}
