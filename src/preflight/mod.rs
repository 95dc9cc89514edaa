//! Preflight checks run before a sweep.
//!
//! Nothing here stops a sweep. Each finding is logged as a warning so a
//! reader of a surprising table knows the host was noisy.
//!
//! # Checks Performed
//!
//! - **Resolution**: the trial clock ticks finely enough for the duration floor
//! - **System**: platform-specific host settings (e.g., CPU governor on Linux)

mod resolution;
mod system;

pub use resolution::{estimate_tick, resolution_check, ResolutionWarning};
pub use system::{system_check, system_check_in, SystemWarning};

use std::time::Duration;

use tracing::{debug, warn};

use crate::measurement::Clock;

/// Findings of all preflight checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreflightResult {
    /// Host configuration findings.
    pub system: Vec<SystemWarning>,
    /// Clock resolution finding.
    pub resolution: Option<ResolutionWarning>,
}

impl PreflightResult {
    /// Log each finding at `warn` level.
    pub fn log(&self) {
        for warning in &self.system {
            warn!("preflight: {}", warning);
        }
        if let Some(warning) = &self.resolution {
            warn!("preflight: {}", warning);
        }
    }
}

/// Run every check for a sweep timed by `clock` with the given trial floor.
pub fn run_preflight<C: Clock>(clock: &C, min_trial_duration: Duration) -> PreflightResult {
    let resolution = estimate_tick(clock).and_then(|tick| {
        debug!(?tick, "estimated clock tick");
        resolution_check(tick, min_trial_duration)
    });
    PreflightResult {
        system: system_check(),
        resolution,
    }
}
