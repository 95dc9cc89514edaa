//! # fragsort-bench
//!
//! Measure and rank sort strategies on fragmented bulk containers.
//!
//! A sweep fills containers with `10^k` live elements at a range of erasure
//! rates, so the live elements sit among the holes left by erasing, and
//! times the baseline container's sort against several competing sorts.
//! Each cell reports:
//! - The index of the fastest competitor
//! - Its speedup over the runner-up competitor
//! - Its speedup over the baseline
//!
//! ## Measurement
//!
//! Every variant is timed through [`TrialRunner`]: each of 10 trials repeats
//! the operation until at least 200ms have been timed, and the per-run
//! averages are reduced with a trimmed mean that drops the two fastest and
//! two slowest trials. Test data is generated inside the timed operation
//! with the [`Stopwatch`] paused, so only the sort itself is counted.
//!
//! ## Quick Start
//!
//! ```ignore
//! use fragsort_bench::{run, Config, output::TerminalSink};
//!
//! let config = Config::default().from_env();
//! let mut sink = TerminalSink::stdout();
//! let rows = run(&config, &mut sink)?;
//! ```
//!
//! Runtime behaviour is tuned through `FRAGSORT_*` environment variables;
//! see [`Config::from_env`].

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod compare;
pub mod condition;
pub mod config;
pub mod container;
mod error;
pub mod sweep;
pub mod variant;

// Functional modules
pub mod measurement;
pub mod output;
pub mod preflight;
pub mod statistics;

pub use compare::{pick_winner, Verdict};
pub use condition::{Condition, ConditionGenerator, Populate};
pub use config::{ClockSpec, Config, ElementSize, SortStability};
pub use error::{BenchError, Result};
pub use measurement::{AnyClock, Clock, Stopwatch, TrialRunner, TrialSample};
pub use statistics::trimmed_mean;
pub use sweep::{CellOutcome, RankedCell, Sweep, SweepCell, SweepRow, SweepSink};
pub use variant::Variant;

use container::{Element, Keyed};

/// Run a full sweep for `config`, timing with the configured clock.
///
/// Out-of-memory cells are reported in place; other errors (an invalid
/// configuration) end the sweep.
pub fn run<S: SweepSink + ?Sized>(config: &Config, sink: &mut S) -> Result<Vec<SweepRow>> {
    run_with_clock(config, AnyClock::from_spec(config.clock), sink)
}

/// Run a full sweep for `config`, timing with `clock`.
pub fn run_with_clock<C, S>(config: &Config, clock: C, sink: &mut S) -> Result<Vec<SweepRow>>
where
    C: Clock,
    S: SweepSink + ?Sized,
{
    config.validate()?;
    match config.element_size {
        ElementSize::B4 => sweep_with::<Element<0>, C, S>(config, clock, sink),
        ElementSize::B8 => sweep_with::<Element<4>, C, S>(config, clock, sink),
        ElementSize::B16 => sweep_with::<Element<12>, C, S>(config, clock, sink),
        ElementSize::B32 => sweep_with::<Element<28>, C, S>(config, clock, sink),
        ElementSize::B64 => sweep_with::<Element<60>, C, S>(config, clock, sink),
        ElementSize::B128 => sweep_with::<Element<124>, C, S>(config, clock, sink),
    }
}

fn sweep_with<E, C, S>(config: &Config, clock: C, sink: &mut S) -> Result<Vec<SweepRow>>
where
    E: Keyed,
    C: Clock,
    S: SweepSink + ?Sized,
{
    let mut runner = TrialRunner::from_config(clock, config);
    let mut populate = ConditionGenerator::new(config.seed);
    Sweep::new(config.clone()).run::<E, _, _, _>(&mut populate, &mut runner, sink)
}
