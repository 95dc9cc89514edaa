//! Error types for the benchmark harness.

use std::collections::TryReserveError;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors raised while generating test data, sorting, or configuring a sweep.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The allocator refused a reservation.
    ///
    /// The sweep driver isolates this per cell and reports it in place.
    #[error("out of memory while {context} ({requested} elements)")]
    OutOfMemory {
        /// What was being allocated.
        context: &'static str,
        /// Number of elements requested.
        requested: usize,
        /// The failed reservation.
        #[source]
        source: TryReserveError,
    },

    /// An erasure rate outside `[0, 1)`.
    #[error("invalid erasure rate {0}: must lie in [0, 1)")]
    InvalidErasureRate(f64),

    /// Configuration that cannot drive a sweep.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BenchError {
    /// Build an [`BenchError::OutOfMemory`] from a failed reservation.
    pub fn out_of_memory(context: &'static str, requested: usize, source: TryReserveError) -> Self {
        BenchError::OutOfMemory {
            context,
            requested,
            source,
        }
    }

    /// Whether this is an allocation failure.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, BenchError::OutOfMemory { .. })
    }
}

/// Reserve room for `additional` more elements in `vec`, mapping failure to
/// [`BenchError::OutOfMemory`].
pub(crate) fn try_reserve<T>(vec: &mut Vec<T>, additional: usize, context: &'static str) -> Result<()> {
    vec.try_reserve(additional)
        .map_err(|source| BenchError::out_of_memory(context, additional, source))
}
