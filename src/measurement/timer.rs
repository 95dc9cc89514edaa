//! Clock sources for the timed region.
//!
//! Provides:
//! - [`MonotonicClock`]: `std::time::Instant` (default)
//! - [`CycleClock`]: serialized CPU counter converted to nanoseconds
//! - [`ManualClock`]: explicitly advanced, for tests
//! - [`AnyClock`]: runtime selection from [`ClockSpec`]

use std::cell::Cell;
use std::hint::black_box as std_black_box;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::ClockSpec;

/// Wrapper around `std::hint::black_box` for preventing compiler optimizations.
///
/// The trial runner passes every result of the measured operation through
/// this so the call cannot be proven dead and elided.
#[inline]
pub fn black_box<T>(x: T) -> T {
    std_black_box(x)
}

/// A monotonic time source.
pub trait Clock {
    /// Time elapsed since this clock's origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Current value of the CPU counter, ordered after every earlier load.
#[inline]
fn read_counter() -> u64 {
    #[cfg(target_arch = "x86_64")]
    {
        use std::arch::x86_64::{_mm_lfence, _rdtsc};
        // SAFETY: `lfence` and `rdtsc` are baseline x86_64 instructions.
        unsafe {
            _mm_lfence();
            _rdtsc()
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        let ticks: u64;
        // SAFETY: reads the virtual count register, which EL0 may access.
        unsafe {
            std::arch::asm!("isb", "mrs {}, cntvct_el0", out(reg) ticks, options(nostack, nomem));
        }
        ticks
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        static ORIGIN: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        ORIGIN.get_or_init(Instant::now).elapsed().as_nanos() as u64
    }
}

/// Counter ticks per nanosecond, from busy-waiting a few short windows and
/// keeping the median.
fn calibrate() -> f64 {
    const WINDOW: Duration = Duration::from_millis(2);
    let mut ratios = [0.0; 5];
    for ratio in &mut ratios {
        let (ticks, wall) = (read_counter(), Instant::now());
        while wall.elapsed() < WINDOW {
            std::hint::spin_loop();
        }
        let ns = wall.elapsed().as_nanos() as f64;
        *ratio = read_counter().saturating_sub(ticks) as f64 / ns;
    }
    ratios.sort_by(f64::total_cmp);
    ratios[ratios.len() / 2]
}

/// Clock reading the CPU cycle counter (`lfence; rdtsc` on x86_64,
/// `cntvct_el0` on aarch64, `Instant` elsewhere).
///
/// Readings are converted to nanoseconds with a ratio calibrated once at
/// construction.
#[derive(Debug, Clone, Copy)]
pub struct CycleClock {
    origin: u64,
    ticks_per_ns: f64,
}

impl CycleClock {
    /// Create a clock, calibrating it against `Instant`.
    pub fn new() -> Self {
        let ticks_per_ns = calibrate();
        debug!(ticks_per_ns, "calibrated cycle counter");
        Self::with_ticks_per_ns(ticks_per_ns)
    }

    /// Create a clock with a known ratio.
    pub fn with_ticks_per_ns(ticks_per_ns: f64) -> Self {
        Self {
            origin: read_counter(),
            ticks_per_ns,
        }
    }

    /// The calibrated ratio.
    pub fn ticks_per_ns(&self) -> f64 {
        self.ticks_per_ns
    }
}

impl Default for CycleClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for CycleClock {
    #[inline]
    fn now(&self) -> Duration {
        let ticks = read_counter().saturating_sub(self.origin);
        Duration::from_nanos((ticks as f64 / self.ticks_per_ns) as u64)
    }
}

/// A clock that only moves when told to.
///
/// Operations under test can advance it through the stopwatch they are
/// handed, which makes trial calibration fully deterministic.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Clock selected at runtime from a [`ClockSpec`].
#[derive(Debug, Clone, Copy)]
pub enum AnyClock {
    /// `Instant`-based wall clock.
    Monotonic(MonotonicClock),
    /// Cycle counter.
    Cycles(CycleClock),
}

impl AnyClock {
    /// Build the clock a spec asks for. Cycle clocks calibrate here.
    pub fn from_spec(spec: ClockSpec) -> Self {
        match spec {
            ClockSpec::Monotonic => AnyClock::Monotonic(MonotonicClock::new()),
            ClockSpec::Cycles => AnyClock::Cycles(CycleClock::new()),
        }
    }

    /// Short name for logs and the report header.
    pub fn name(&self) -> &'static str {
        match self {
            AnyClock::Monotonic(_) => "monotonic",
            AnyClock::Cycles(_) => "cycles",
        }
    }
}

impl Clock for AnyClock {
    #[inline]
    fn now(&self) -> Duration {
        match self {
            AnyClock::Monotonic(clock) => clock.now(),
            AnyClock::Cycles(clock) => clock.now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_does_not_run_backwards() {
        let a = read_counter();
        let b = read_counter();
        // A thread migration may see a slightly skewed counter.
        assert!(a.saturating_sub(b) < 1000, "a={}, b={}", a, b);
    }

    #[test]
    fn test_calibrated_ratio_is_plausible() {
        // ARM virtual timers tick at tens of MHz, x86 TSCs at a few GHz.
        let ratio = calibrate();
        assert!(ratio > 0.001 && ratio < 10.0, "ticks_per_ns = {}", ratio);
    }

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.now();
        assert!(b > a, "a={:?}, b={:?}", a, b);
    }

    #[test]
    fn test_cycle_clock_tracks_wall_time() {
        let clock = CycleClock::new();
        let a = clock.now();
        std::thread::sleep(Duration::from_millis(20));
        let b = clock.now();
        let elapsed = b.saturating_sub(a);
        assert!(
            elapsed >= Duration::from_millis(10) && elapsed < Duration::from_secs(2),
            "elapsed = {:?}",
            elapsed
        );
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        clock.advance(Duration::from_millis(5));
        clock.advance(Duration::from_millis(7));
        assert_eq!(clock.now(), Duration::from_millis(12));
    }

    #[test]
    fn test_any_clock_names() {
        assert_eq!(AnyClock::from_spec(ClockSpec::Monotonic).name(), "monotonic");
        let cycles = AnyClock::Cycles(CycleClock::with_ticks_per_ns(3.0));
        assert_eq!(cycles.name(), "cycles");
        assert_eq!(CycleClock::with_ticks_per_ns(3.0).ticks_per_ns(), 3.0);
    }
}
