//! The size × erasure-rate sweep.
//!
//! Rows are erasure rates, columns are size exponents. Each cell measures
//! the baseline and every enabled competitor on freshly generated
//! instances and ranks the competitors. A cell ends in one of three ways:
//!
//! - **Too large**: the estimated footprint exceeds the memory ceiling and
//!   nothing is generated
//! - **Out of memory**: an allocation failed while generating or sorting;
//!   the cell is abandoned and the sweep moves on
//! - **Ranked**: every variant was measured

use std::mem::size_of;

use tracing::{debug, info, warn};

use crate::compare::{pick_winner, Verdict};
use crate::condition::{Condition, Populate};
use crate::config::Config;
use crate::container::Keyed;
use crate::error::{BenchError, Result};
use crate::measurement::{Clock, TrialRunner};
use crate::variant::Variant;

/// Timings of a fully measured cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCell {
    /// Seconds per run of the baseline.
    pub baseline: f64,
    /// Seconds per run of each enabled competitor, in display order.
    pub competitors: Vec<f64>,
    /// The fastest competitor and its speedups.
    pub verdict: Verdict,
}

/// How a cell ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome {
    /// Skipped before generation: footprint above the memory ceiling.
    TooLarge,
    /// An allocation failed during generation or sorting.
    OutOfMemory,
    /// Measured and ranked.
    Ranked(RankedCell),
}

/// One cell of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepCell {
    /// Size exponent `k`.
    pub exponent: u32,
    /// Live element count, `10^k`.
    pub size: usize,
    /// Result.
    pub outcome: CellOutcome,
}

/// One erasure rate across all sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    /// Erasure rate of this row.
    pub erasure_rate: f64,
    /// Cells in column order.
    pub cells: Vec<SweepCell>,
}

/// Observer notified as the sweep progresses.
///
/// All methods default to doing nothing.
pub trait SweepSink {
    /// Called once before the first row.
    fn sweep_started(&mut self, _config: &Config, _element_size: usize, _competitors: &[Variant]) {}

    /// Called before the first cell of a row.
    fn row_started(&mut self, _erasure_rate: f64) {}

    /// Called as soon as a cell is done.
    fn cell_finished(&mut self, _cell: &SweepCell) {}

    /// Called after the last cell of a row.
    fn row_finished(&mut self, _row: &SweepRow) {}
}

impl SweepSink for () {}

/// Drives a sweep for one configuration.
#[derive(Debug, Clone)]
pub struct Sweep {
    config: Config,
}

impl Sweep {
    /// Create a sweep over `config`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Competitors that support `E`, in display order.
    pub fn competitors_for<E>(&self) -> Vec<Variant> {
        self.config.competitors_supporting(size_of::<E>())
    }

    /// Run every cell with elements of type `E`.
    ///
    /// Out-of-memory failures are recorded per cell. Any other error aborts
    /// the sweep.
    pub fn run<E, P, C, S>(&self, populate: &mut P, runner: &mut TrialRunner<C>, sink: &mut S) -> Result<Vec<SweepRow>>
    where
        E: Keyed,
        P: Populate,
        C: Clock,
        S: SweepSink + ?Sized,
    {
        let element_size = size_of::<E>();
        let competitors = self.competitors_for::<E>();
        if competitors.is_empty() {
            return Err(BenchError::InvalidConfig(format!(
                "no competitor supports {}-byte elements",
                element_size
            )));
        }

        info!(
            element_size,
            competitors = competitors.len(),
            rows = self.config.erasure_rates.len(),
            columns = self.config.size_exponents.len(),
            "starting sweep"
        );
        sink.sweep_started(&self.config, element_size, &competitors);

        let mut rows = Vec::with_capacity(self.config.erasure_rates.len());
        for &rate in &self.config.erasure_rates {
            sink.row_started(rate);
            let mut cells = Vec::with_capacity(self.config.size_exponents.len());
            for &exponent in &self.config.size_exponents {
                let size = 10usize.checked_pow(exponent).ok_or_else(|| {
                    BenchError::InvalidConfig(format!("10^{} elements do not fit in usize", exponent))
                })?;
                let condition = Condition::new(size, rate)?;
                let outcome = self.run_cell::<E, _, _>(&condition, &competitors, populate, runner)?;
                let cell = SweepCell {
                    exponent,
                    size,
                    outcome,
                };
                sink.cell_finished(&cell);
                cells.push(cell);
            }
            let row = SweepRow {
                erasure_rate: rate,
                cells,
            };
            sink.row_finished(&row);
            rows.push(row);
        }
        Ok(rows)
    }

    /// Measure one cell, turning an allocation failure into a marker.
    pub fn run_cell<E, P, C>(
        &self,
        condition: &Condition,
        competitors: &[Variant],
        populate: &mut P,
        runner: &mut TrialRunner<C>,
    ) -> Result<CellOutcome>
    where
        E: Keyed,
        P: Populate,
        C: Clock,
    {
        let footprint = condition.footprint_bytes(size_of::<E>());
        if footprint > self.config.memory_ceiling_bytes as f64 {
            info!(
                size = condition.size(),
                erasure_rate = condition.erasure_rate(),
                footprint,
                ceiling = self.config.memory_ceiling_bytes,
                "skipping cell above the memory ceiling"
            );
            return Ok(CellOutcome::TooLarge);
        }

        match self.measure_cell::<E, _, _>(condition, competitors, populate, runner) {
            Ok(ranked) => Ok(CellOutcome::Ranked(ranked)),
            Err(err) if err.is_out_of_memory() => {
                warn!(
                    size = condition.size(),
                    erasure_rate = condition.erasure_rate(),
                    error = %err,
                    "cell abandoned"
                );
                Ok(CellOutcome::OutOfMemory)
            }
            Err(err) => Err(err),
        }
    }

    fn measure_cell<E, P, C>(
        &self,
        condition: &Condition,
        competitors: &[Variant],
        populate: &mut P,
        runner: &mut TrialRunner<C>,
    ) -> Result<RankedCell>
    where
        E: Keyed,
        P: Populate,
        C: Clock,
    {
        let baseline = self.measure_variant::<E, _, _>(Variant::BASELINE, condition, populate, runner)?;

        let mut times = Vec::with_capacity(competitors.len());
        for &variant in competitors {
            times.push(self.measure_variant::<E, _, _>(variant, condition, populate, runner)?);
        }

        let verdict = pick_winner(baseline, &times)
            .ok_or_else(|| BenchError::InvalidConfig("no competitors to rank".into()))?;
        Ok(RankedCell {
            baseline,
            competitors: times,
            verdict,
        })
    }

    fn measure_variant<E, P, C>(
        &self,
        variant: Variant,
        condition: &Condition,
        populate: &mut P,
        runner: &mut TrialRunner<C>,
    ) -> Result<f64>
    where
        E: Keyed,
        P: Populate,
        C: Clock,
    {
        let stability = self.config.stability;
        let seconds =
            runner.measure(|sw| variant.run::<E, _, _>(populate, condition, stability, sw))?;
        debug!(
            variant = variant.name(),
            size = condition.size(),
            erasure_rate = condition.erasure_rate(),
            seconds_per_run = seconds,
            "measured"
        );
        Ok(seconds)
    }
}
