//! Symmetric trimmed mean over trial samples.
//!
//! Sorts the samples, discards the same number of values from each tail and
//! averages the rest, so a trial that dodged a preemption counts as little
//! as one hit by throttling.

/// One sample in this many is discarded from each tail.
pub const TRIM_DIVISOR: usize = 5;

/// Number of samples discarded from each tail for `n` samples.
///
/// Ten samples trim two per tail. The result always leaves at least one
/// sample for `n >= 1`.
pub fn trim_count(n: usize) -> usize {
    n / TRIM_DIVISOR
}

/// Trimmed mean with the default per-tail trim of [`trim_count`].
///
/// # Panics
///
/// Panics if `samples` is empty.
pub fn trimmed_mean(samples: &[f64]) -> f64 {
    assert!(!samples.is_empty(), "Cannot compute trimmed mean of empty slice");
    trimmed_mean_with(samples, trim_count(samples.len()))
}

/// Trimmed mean discarding `trim` samples from each tail.
///
/// The input is not modified; a sorted copy is made.
///
/// # Panics
///
/// Panics unless `samples.len() > 2 * trim`.
pub fn trimmed_mean_with(samples: &[f64], trim: usize) -> f64 {
    assert!(
        samples.len() > 2 * trim,
        "Trimming {} per tail leaves nothing of {} samples",
        trim,
        samples.len()
    );

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let kept = &sorted[trim..sorted.len() - trim];
    kept.iter().sum::<f64>() / kept.len() as f64
}
