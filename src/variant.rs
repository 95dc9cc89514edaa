//! The sort variants under comparison.

use std::fmt;

use crate::condition::{Condition, Populate};
use crate::config::SortStability;
use crate::container::{BulkContainer, Hive, Hub, Keyed};
use crate::error::Result;
use crate::measurement::{Clock, Stopwatch};

/// One container and sort entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// [`Hive::sort`], the baseline every competitor is compared against.
    HiveSort,
    /// [`Hub::sort_gather`].
    HubGather,
    /// [`Hub::sort_indirect`].
    HubIndirect,
    /// [`Hub::sort_compact`].
    HubCompact,
    /// [`Hub::sort_block_merge`].
    HubBlockMerge,
}

impl Variant {
    /// The variant all others are measured against.
    pub const BASELINE: Variant = Variant::HiveSort;

    /// Competitors in display order; index `i` is shown as `i + 1`.
    pub const COMPETITORS: [Variant; 4] = [
        Variant::HubGather,
        Variant::HubIndirect,
        Variant::HubCompact,
        Variant::HubBlockMerge,
    ];

    /// Short name used in logs, the report legend and `FRAGSORT_VARIANTS`.
    pub fn name(self) -> &'static str {
        match self {
            Variant::HiveSort => "hive-sort",
            Variant::HubGather => "hub-gather",
            Variant::HubIndirect => "hub-indirect",
            Variant::HubCompact => "hub-compact",
            Variant::HubBlockMerge => "hub-block-merge",
        }
    }

    /// Look a variant up by [`Variant::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        [Variant::BASELINE]
            .into_iter()
            .chain(Variant::COMPETITORS)
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }

    /// Whether this variant is run for `element_size`-byte elements.
    ///
    /// Compacting and run merging move elements more often than the other
    /// sorts; they are only compared while an element fits in two words.
    pub fn supports(self, element_size: usize) -> bool {
        match self {
            Variant::HubCompact | Variant::HubBlockMerge => {
                element_size <= 2 * std::mem::size_of::<usize>()
            }
            _ => true,
        }
    }

    /// One timed run: generate a fresh instance with the stopwatch paused,
    /// then sort it. Returns the live size so the result stays observable.
    pub fn run<E, P, C>(
        self,
        populate: &mut P,
        condition: &Condition,
        stability: SortStability,
        stopwatch: &mut Stopwatch<C>,
    ) -> Result<usize>
    where
        E: Keyed,
        P: Populate,
        C: Clock,
    {
        match self {
            Variant::HiveSort => {
                let mut hive: Hive<E> = generate(populate, condition, stopwatch)?;
                hive.sort(stability)?;
                Ok(hive.len())
            }
            _ => {
                let mut hub: Hub<E> = generate(populate, condition, stopwatch)?;
                match self {
                    Variant::HubIndirect => hub.sort_indirect()?,
                    Variant::HubCompact => hub.sort_compact(stability)?,
                    Variant::HubBlockMerge => hub.sort_block_merge(stability)?,
                    _ => hub.sort_gather(stability)?,
                }
                Ok(hub.len())
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build an instance outside the timed window.
///
/// The stopwatch is resumed before a generation error is returned, so an
/// out-of-memory cell leaves it unpaused.
fn generate<K, P, C>(populate: &mut P, condition: &Condition, stopwatch: &mut Stopwatch<C>) -> Result<K>
where
    K: BulkContainer,
    P: Populate,
    C: Clock,
{
    stopwatch.pause();
    let instance = populate.populate(condition);
    stopwatch.resume();
    instance
}
