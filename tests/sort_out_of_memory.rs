//! Allocation failure inside the timed sort.
//!
//! This binary installs a global allocator that refuses any single request
//! above [`CAP`]. With 4-byte elements and 10^5 live elements the gathered
//! values (400 KB) fit under the cap, while the 16-byte `(key, index)` pairs
//! a stable sort needs (1.6 MB) do not.

use std::alloc::{GlobalAlloc, Layout, System};
use std::ptr;
use std::time::Duration;

use fragsort_bench::container::{BulkContainer, Element, Hive, Hub};
use fragsort_bench::measurement::{MonotonicClock, TrialRunner};
use fragsort_bench::{
    CellOutcome, Condition, ConditionGenerator, Config, Populate, SortStability, Sweep, Variant,
};

const CAP: usize = 1 << 20;

struct CappedAlloc;

unsafe impl GlobalAlloc for CappedAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.size() > CAP {
            return ptr::null_mut();
        }
        // SAFETY: forwarded unchanged to the system allocator.
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: `ptr` came from `System` through `alloc` or `realloc`.
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if new_size > CAP {
            return ptr::null_mut();
        }
        // SAFETY: forwarded unchanged to the system allocator.
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static GLOBAL: CappedAlloc = CappedAlloc;

type E = Element<0>;

const LIVE: usize = 100_000;

fn config(stability: SortStability) -> Config {
    Config::default()
        .trials(3)
        .min_trial_duration(Duration::from_millis(1))
        .erasure_rates(vec![0.0])
        .size_exponents(vec![5])
        .competitors(vec![Variant::HubGather])
        .stability(stability)
}

fn outcome(stability: SortStability) -> CellOutcome {
    let config = config(stability);
    let sweep = Sweep::new(config.clone());
    let mut runner = TrialRunner::from_config(MonotonicClock::new(), &config);
    let rows = sweep
        .run::<E, _, _, _>(&mut ConditionGenerator::new(0), &mut runner, &mut ())
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cells.len(), 1);
    rows[0].cells[0].outcome.clone()
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn failed_stable_sort_leaves_the_container_intact() {
    let cond = Condition::new(LIVE, 0.0).unwrap();
    let mut gen = ConditionGenerator::new(0);

    let mut hive: Hive<E> = gen.populate(&cond).unwrap();
    let before = hive.keys();
    let err = hive.sort(SortStability::Stable).unwrap_err();
    assert!(err.is_out_of_memory(), "{}", err);
    assert_eq!(hive.keys(), before, "hive lost elements on a failed sort");

    let mut hub: Hub<E> = gen.populate(&cond).unwrap();
    let before = hub.keys();
    let err = hub.sort_gather(SortStability::Stable).unwrap_err();
    assert!(err.is_out_of_memory(), "{}", err);
    assert_eq!(hub.keys(), before, "hub lost elements on a failed sort");
}

#[test]
fn unstable_sort_fits_under_the_cap() {
    let cond = Condition::new(LIVE, 0.0).unwrap();
    let mut hive: Hive<E> = ConditionGenerator::new(0).populate(&cond).unwrap();
    hive.sort(SortStability::Unstable).unwrap();
    let keys = hive.keys();
    assert_eq!(keys.len(), LIVE);
    assert!(keys.windows(2).all(|w| w[0] <= w[1]));
}

// ============================================================================
// Sweep
// ============================================================================

#[test]
fn out_of_memory_while_sorting_is_reported_per_cell() {
    assert_eq!(outcome(SortStability::Stable), CellOutcome::OutOfMemory);
}

#[test]
fn same_cell_ranks_when_the_sort_fits() {
    assert!(matches!(outcome(SortStability::Unstable), CellOutcome::Ranked(_)));
}
