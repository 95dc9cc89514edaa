//! Terminal report with colors.
//!
//! Layout: a header naming the element size, stability and competitor
//! indices, then one row per erasure rate with one cell per size exponent.
//! Cells are padded before colorizing so ANSI escapes do not skew columns.

use std::io::{self, Write};

use colored::Colorize;

use crate::config::{Config, SortStability};
use crate::sweep::{CellOutcome, SweepCell, SweepRow, SweepSink};
use crate::variant::Variant;

/// Width of the row label column.
const LABEL_WIDTH: usize = 11;

/// Width of one cell.
const CELL_WIDTH: usize = 18;

/// Width of the horizontal rule.
const RULE_WIDTH: usize = 99;

/// Format the report header.
pub fn format_header(config: &Config, element_size: usize, competitors: &[Variant]) -> String {
    let mut output = String::new();
    let rule = "\u{2500}".repeat(RULE_WIDTH);
    let stability = match config.stability {
        SortStability::Unstable => "unstable",
        SortStability::Stable => "stable",
    };

    output.push_str(&format!(
        "{}: {}-byte elements, trivial movement, {} sort\n",
        "fragsort-bench".bold(),
        element_size,
        stability
    ));
    output.push_str(&format!("  baseline: {}\n", Variant::BASELINE));
    for (i, v) in competitors.iter().enumerate() {
        output.push_str(&format!("  {}: {}\n", i + 1, v));
    }
    output.push_str("  cells: winner (speedup vs runner-up, speedup vs baseline)\n");
    output.push_str(&rule);
    output.push('\n');

    output.push_str(&format!("{:<w$}container size\n", "", w = LABEL_WIDTH));
    output.push_str(&format!("{:<w$}", "erasure", w = LABEL_WIDTH));
    for k in &config.size_exponents {
        output.push_str(&format!("{:<w$}", format!("1.E{}", k), w = CELL_WIDTH));
    }
    output.push('\n');
    output
}

/// Format a row label: the erasure rate with one decimal.
pub fn format_row_label(erasure_rate: f64) -> String {
    format!("{:<w$}", format!("{:.1}", erasure_rate), w = LABEL_WIDTH)
}

/// Plain text of a cell, without padding or color.
pub fn cell_text(outcome: &CellOutcome) -> String {
    match outcome {
        CellOutcome::TooLarge => "too large".to_string(),
        CellOutcome::OutOfMemory => "out of memory".to_string(),
        CellOutcome::Ranked(ranked) => {
            let v = &ranked.verdict;
            let runner_up = v
                .vs_runner_up
                .map_or_else(|| "n/a".to_string(), |r| format!("{:.2}x", r));
            format!("{} ({}, {:.2}x)", v.winner, runner_up, v.vs_baseline)
        }
    }
}

/// A padded, colored cell.
pub fn format_cell(outcome: &CellOutcome) -> String {
    let padded = format!("{:<w$}", cell_text(outcome), w = CELL_WIDTH);
    match outcome {
        CellOutcome::TooLarge => padded.dimmed().to_string(),
        CellOutcome::OutOfMemory => padded.red().to_string(),
        CellOutcome::Ranked(ranked) if ranked.verdict.vs_baseline >= 1.0 => padded.green().to_string(),
        CellOutcome::Ranked(_) => padded.yellow().to_string(),
    }
}

/// Format a finished row, label included, ending with a newline.
pub fn format_row(row: &SweepRow) -> String {
    let mut output = format_row_label(row.erasure_rate);
    for cell in &row.cells {
        output.push_str(&format_cell(&cell.outcome));
    }
    output.push('\n');
    output
}

/// Format a complete report.
pub fn format_table(config: &Config, element_size: usize, competitors: &[Variant], rows: &[SweepRow]) -> String {
    let mut output = format_header(config, element_size, competitors);
    for row in rows {
        output.push_str(&format_row(row));
    }
    output
}

/// [`SweepSink`] that prints each cell as soon as it finishes.
///
/// Write errors are held until [`TerminalSink::finish`].
#[derive(Debug)]
pub struct TerminalSink<W> {
    out: W,
    error: Option<io::Error>,
}

impl TerminalSink<io::Stdout> {
    /// Print to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    /// Print to `out`.
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Return the first write error, if any, and the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn emit(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}

impl<W: Write> SweepSink for TerminalSink<W> {
    fn sweep_started(&mut self, config: &Config, element_size: usize, competitors: &[Variant]) {
        self.emit(&format_header(config, element_size, competitors));
    }

    fn row_started(&mut self, erasure_rate: f64) {
        self.emit(&format_row_label(erasure_rate));
    }

    fn cell_finished(&mut self, cell: &SweepCell) {
        self.emit(&format_cell(&cell.outcome));
    }

    fn row_finished(&mut self, _row: &SweepRow) {
        self.emit("\n");
    }
}
