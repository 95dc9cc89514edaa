//! Statistical methods for trial aggregation.

mod trimmed;

pub use trimmed::{trim_count, trimmed_mean, trimmed_mean_with, TRIM_DIVISOR};
