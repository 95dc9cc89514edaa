//! Trial calibration and the pause/resume window.

use std::convert::Infallible;
use std::time::Duration;

use fragsort_bench::measurement::{ManualClock, MonotonicClock, Stopwatch, TrialRunner};

// ============================================================================
// Stopwatch
// ============================================================================

#[test]
fn paused_time_is_not_counted() {
    let mut sw = Stopwatch::new(ManualClock::new());
    sw.mark_start();
    sw.clock().advance(Duration::from_millis(3));
    sw.pause();
    sw.clock().advance(Duration::from_millis(100));
    sw.resume();
    sw.clock().advance(Duration::from_millis(4));
    assert_eq!(sw.elapsed(), Duration::from_millis(7));
}

#[test]
fn immediate_pause_resume_changes_nothing() {
    let mut sw = Stopwatch::new(ManualClock::new());
    sw.mark_start();
    sw.clock().advance(Duration::from_millis(5));
    let before = sw.elapsed();
    sw.pause();
    sw.resume();
    assert_eq!(sw.elapsed(), before);
}

// ============================================================================
// Trial runner
// ============================================================================

#[test]
fn setup_inside_pause_is_excluded_from_the_result() {
    let mut runner = TrialRunner::new(ManualClock::new(), 10, Duration::from_millis(200));
    let secs = runner
        .measure(|sw| {
            sw.pause();
            sw.clock().advance(Duration::from_millis(50));
            sw.resume();
            sw.clock().advance(Duration::from_millis(4));
            Ok::<_, Infallible>(42u64)
        })
        .unwrap();
    assert!((secs - 0.004).abs() < 1e-12, "secs = {}", secs);
}

#[test]
fn each_trial_has_at_least_one_run() {
    let mut runner = TrialRunner::new(ManualClock::new(), 10, Duration::from_millis(200));
    let sample = runner
        .sample(|sw| {
            sw.clock().advance(Duration::from_millis(750));
            Ok::<_, Infallible>(())
        })
        .unwrap();
    assert_eq!(sample.len(), 10);
    assert!(sample.runs().iter().all(|&r| r == 1), "runs = {:?}", sample.runs());
    assert!(sample.seconds_per_run().iter().all(|&s| (s - 0.75).abs() < 1e-12));
}

#[test]
fn uneven_run_times_are_averaged_per_trial() {
    // Alternating 30ms/10ms runs: 10 runs reach exactly 200ms.
    let mut runner = TrialRunner::new(ManualClock::new(), 4, Duration::from_millis(200));
    let mut odd = false;
    let sample = runner
        .sample(|sw| {
            odd = !odd;
            let step = if odd { 30 } else { 10 };
            sw.clock().advance(Duration::from_millis(step));
            Ok::<_, Infallible>(())
        })
        .unwrap();
    assert!(sample.runs().iter().all(|&r| r == 10), "runs = {:?}", sample.runs());
    assert!((sample.robust_average() - 0.020).abs() < 1e-12);
}

#[test]
fn real_clock_floor_is_respected() {
    let floor = Duration::from_millis(5);
    let mut runner = TrialRunner::new(MonotonicClock::new(), 3, floor);
    let sample = runner
        .sample(|_| Ok::<_, Infallible>((0..1000u64).sum::<u64>()))
        .unwrap();
    for (&secs, &runs) in sample.seconds_per_run().iter().zip(sample.runs()) {
        assert!(runs >= 1);
        assert!(
            secs * runs as f64 >= floor.as_secs_f64() * (1.0 - 1e-9),
            "trial of {} runs at {}s/run is shorter than the floor",
            runs,
            secs
        );
    }
}
