//! Host configuration checks.
//!
//! Frequency scaling, turbo, SMT siblings, virtualization and background
//! load all widen the spread between trials. None of them invalidates a
//! sweep, but a noisy host can flip the winner of close cells.

use std::fmt;
use std::fs;
use std::path::Path;

/// Load average above which the host is considered busy.
const LOAD_THRESHOLD: f64 = 1.0;

/// A host setting that may add noise to trial timings.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemWarning {
    /// CPU frequency governor other than `performance`.
    CpuGovernor {
        /// Current governor.
        current: String,
    },

    /// Turbo boost is enabled.
    TurboBoost,

    /// SMT siblings are active.
    Smt,

    /// The CPU reports a hypervisor.
    Hypervisor,

    /// One-minute load average above the threshold.
    HighLoad {
        /// Observed load average.
        load_average: f64,
        /// Threshold exceeded.
        threshold: f64,
    },
}

impl fmt::Display for SystemWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemWarning::CpuGovernor { current } => write!(
                f,
                "CPU frequency governor is '{}'; trial times drift as the clock ramps. \
                 Set with: sudo cpupower frequency-set -g performance",
                current
            ),
            SystemWarning::TurboBoost => f.write_str(
                "turbo boost is enabled; long sweeps may throttle and slow later cells",
            ),
            SystemWarning::Smt => f.write_str(
                "SMT is active; a busy sibling thread shares caches with the benchmark",
            ),
            SystemWarning::Hypervisor => f.write_str(
                "running under a hypervisor; steal time shows up as trial outliers",
            ),
            SystemWarning::HighLoad {
                load_average,
                threshold,
            } => write!(
                f,
                "load average {:.2} exceeds {:.2}; other processes compete for the core",
                load_average, threshold
            ),
        }
    }
}

/// Run every host check for the current platform.
///
/// Returns an empty list where no checks are implemented.
pub fn system_check() -> Vec<SystemWarning> {
    if cfg!(target_os = "linux") {
        system_check_in(Path::new("/"))
    } else {
        Vec::new()
    }
}

/// Run the Linux checks against `sysfs`/`procfs` files under `root`.
pub fn system_check_in(root: &Path) -> Vec<SystemWarning> {
    [
        check_governor(root),
        check_turbo(root),
        check_smt(root),
        check_hypervisor(root),
        check_load(root),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn read_trimmed(root: &Path, rel: &str) -> Option<String> {
    fs::read_to_string(root.join(rel))
        .ok()
        .map(|s| s.trim().to_string())
}

fn check_governor(root: &Path) -> Option<SystemWarning> {
    let governor = read_trimmed(root, "sys/devices/system/cpu/cpu0/cpufreq/scaling_governor")?;
    let governor = governor.to_lowercase();
    (governor != "performance").then_some(SystemWarning::CpuGovernor { current: governor })
}

fn check_turbo(root: &Path) -> Option<SystemWarning> {
    // intel_pstate reports the inverse setting.
    if let Some(no_turbo) = read_trimmed(root, "sys/devices/system/cpu/intel_pstate/no_turbo") {
        return (no_turbo == "0").then_some(SystemWarning::TurboBoost);
    }
    let boost = read_trimmed(root, "sys/devices/system/cpu/cpufreq/boost")?;
    (boost == "1").then_some(SystemWarning::TurboBoost)
}

fn check_smt(root: &Path) -> Option<SystemWarning> {
    let active = read_trimmed(root, "sys/devices/system/cpu/smt/active")?;
    (active == "1").then_some(SystemWarning::Smt)
}

fn check_hypervisor(root: &Path) -> Option<SystemWarning> {
    let cpuinfo = fs::read_to_string(root.join("proc/cpuinfo")).ok()?;
    cpuinfo
        .lines()
        .filter(|l| l.starts_with("flags"))
        .any(|l| l.split_whitespace().any(|flag| flag == "hypervisor"))
        .then_some(SystemWarning::Hypervisor)
}

fn check_load(root: &Path) -> Option<SystemWarning> {
    let load: f64 = read_trimmed(root, "proc/loadavg")?
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;
    (load > LOAD_THRESHOLD).then_some(SystemWarning::HighLoad {
        load_average: load,
        threshold: LOAD_THRESHOLD,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A scratch filesystem root holding `files`, removed on drop.
    fn fake_root(files: &[(&str, &str)]) -> TempDir {
        let root = TempDir::new().unwrap();
        for (rel, contents) in files {
            let path = root.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        root
    }

    #[test]
    fn test_quiet_host_has_no_warnings() {
        let root = fake_root(&[
            ("sys/devices/system/cpu/cpu0/cpufreq/scaling_governor", "performance\n"),
            ("sys/devices/system/cpu/intel_pstate/no_turbo", "1\n"),
            ("sys/devices/system/cpu/smt/active", "0\n"),
            ("proc/cpuinfo", "flags\t\t: fpu vme sse2\n"),
            ("proc/loadavg", "0.12 0.10 0.05 1/200 4242\n"),
        ]);
        assert_eq!(system_check_in(root.path()), vec![]);
    }

    #[test]
    fn test_noisy_host_reports_everything() {
        let root = fake_root(&[
            ("sys/devices/system/cpu/cpu0/cpufreq/scaling_governor", "PowerSave\n"),
            ("sys/devices/system/cpu/cpufreq/boost", "1\n"),
            ("sys/devices/system/cpu/smt/active", "1\n"),
            ("proc/cpuinfo", "flags\t\t: fpu hypervisor sse2\n"),
            ("proc/loadavg", "3.50 2.00 1.00 1/200 4242\n"),
        ]);
        let warnings = system_check_in(root.path());
        assert_eq!(warnings.len(), 5, "warnings = {:?}", warnings);
        assert_eq!(
            warnings[0],
            SystemWarning::CpuGovernor {
                current: "powersave".into()
            }
        );
        assert!(warnings[4].to_string().contains("3.50"));
    }

    #[test]
    fn test_missing_files_are_silent() {
        let root = fake_root(&[]);
        assert!(system_check_in(root.path()).is_empty());
    }

    #[test]
    fn test_fake_root_is_removed_after_a_failed_assertion() {
        let root = fake_root(&[("proc/loadavg", "9.00 9.00 9.00 1/200 4242\n")]);
        let path = root.path().to_path_buf();
        let checked = path.clone();
        let outcome = std::panic::catch_unwind(move || {
            let _root = root;
            assert!(system_check_in(&checked).is_empty());
        });
        assert!(outcome.is_err(), "high load should have warned");
        assert!(!path.exists(), "{} leaked", path.display());
    }
}
