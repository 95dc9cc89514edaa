//! Adaptive trial runner.
//!
//! One trial repeats the operation until the timed window reaches a minimum
//! duration, then records the window length divided by the run count. Each
//! trial recalibrates its own run count, so run-to-run system noise (cache
//! state, frequency scaling, scheduling) shows up as spread across trials,
//! where the trimmed mean discards it.
//!
//! The repetition loop busy-polls the clock. It never sleeps or yields.

use std::time::Duration;

use tracing::trace;

use super::stopwatch::Stopwatch;
use super::timer::{black_box, Clock};
use crate::config::Config;
use crate::statistics::trimmed_mean;

/// Default number of trials per measurement.
pub const DEFAULT_TRIALS: usize = 10;

/// Default minimum timed duration of one trial.
pub const DEFAULT_MIN_TRIAL_DURATION: Duration = Duration::from_millis(200);

/// Per-trial results of one measurement.
#[derive(Debug, Clone)]
pub struct TrialSample {
    seconds_per_run: Vec<f64>,
    runs: Vec<u64>,
}

impl TrialSample {
    /// Average seconds per run, one value per trial, in trial order.
    pub fn seconds_per_run(&self) -> &[f64] {
        &self.seconds_per_run
    }

    /// Number of runs each trial needed to reach the duration floor.
    pub fn runs(&self) -> &[u64] {
        &self.runs
    }

    /// Number of trials.
    pub fn len(&self) -> usize {
        self.seconds_per_run.len()
    }

    /// Whether no trial was recorded.
    pub fn is_empty(&self) -> bool {
        self.seconds_per_run.is_empty()
    }

    /// Trimmed mean over the trials.
    pub fn robust_average(&self) -> f64 {
        trimmed_mean(&self.seconds_per_run)
    }
}

/// Runs an operation through calibrated trials on its own [`Stopwatch`].
#[derive(Debug)]
pub struct TrialRunner<C> {
    stopwatch: Stopwatch<C>,
    trials: usize,
    min_trial_duration: Duration,
}

impl<C: Clock> TrialRunner<C> {
    /// Create a runner. `trials` is clamped to at least one.
    pub fn new(clock: C, trials: usize, min_trial_duration: Duration) -> Self {
        Self {
            stopwatch: Stopwatch::new(clock),
            trials: trials.max(1),
            min_trial_duration,
        }
    }

    /// Create a runner with the trial settings from `config`.
    pub fn from_config(clock: C, config: &Config) -> Self {
        Self::new(clock, config.trials, config.min_trial_duration)
    }

    /// Number of trials per measurement.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Measure `op` and return its robust seconds-per-run estimate.
    ///
    /// Errors from `op` are returned as-is; the runner does not recover.
    pub fn measure<F, T, E>(&mut self, op: F) -> Result<f64, E>
    where
        F: FnMut(&mut Stopwatch<C>) -> Result<T, E>,
    {
        Ok(self.sample(op)?.robust_average())
    }

    /// Run all trials of `op` and return the raw per-trial values.
    ///
    /// `op` receives the stopwatch so it can pause around setup work. Its
    /// result is passed through [`black_box`] on every run.
    pub fn sample<F, T, E>(&mut self, mut op: F) -> Result<TrialSample, E>
    where
        F: FnMut(&mut Stopwatch<C>) -> Result<T, E>,
    {
        let mut seconds_per_run = Vec::with_capacity(self.trials);
        let mut runs_per_trial = Vec::with_capacity(self.trials);

        for trial in 0..self.trials {
            let mut runs: u64 = 0;
            self.stopwatch.mark_start();
            let elapsed = loop {
                black_box(op(&mut self.stopwatch)?);
                runs += 1;
                let now = self.stopwatch.now();
                let elapsed = self.stopwatch.elapsed_since_start(now);
                if elapsed >= self.min_trial_duration {
                    break elapsed;
                }
            };

            let per_run = elapsed.as_secs_f64() / runs as f64;
            trace!(trial, runs, seconds_per_run = per_run, "trial finished");
            seconds_per_run.push(per_run);
            runs_per_trial.push(runs);
        }

        Ok(TrialSample {
            seconds_per_run,
            runs: runs_per_trial,
        })
    }
}
