//! Ranking competitors within one cell.

/// The fastest competitor of a cell and its speedups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// 1-based index of the fastest competitor.
    pub winner: usize,
    /// Runner-up time over winner time, when there is a runner-up.
    pub vs_runner_up: Option<f64>,
    /// Baseline time over winner time.
    pub vs_baseline: f64,
}

/// Pick the fastest competitor and compute its speedups.
///
/// Ties go to the first competitor in the list. Returns `None` when
/// `competitors` is empty.
///
/// # Arguments
///
/// * `baseline` - Seconds per run of the baseline variant
/// * `competitors` - Seconds per run of each competitor, in display order
pub fn pick_winner(baseline: f64, competitors: &[f64]) -> Option<Verdict> {
    let (winner_idx, &best) = competitors
        .iter()
        .enumerate()
        .reduce(|best, cur| if cur.1 < best.1 { cur } else { best })?;

    let runner_up = competitors
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != winner_idx)
        .map(|(_, &t)| t)
        .reduce(f64::min);

    Some(Verdict {
        winner: winner_idx + 1,
        vs_runner_up: runner_up.map(|t| t / best),
        vs_baseline: baseline / best,
    })
}
