//! Serial Episode Mining
//!
//! Discovers frequent serial episodes, i.e., ordered sequences of sets of
//! co-occurring activity labels, from flat (object-centric) event streams.
//!
//! Mining runs in three phases:
//! 1. [`itemsets`]: frequent itemsets (labels co-occurring at the same time) are mined
//!    by prefix projection over the [`index_db::IndexDb`]
//! 2. [`bound_list`]: each itemset is turned into a bound list on the transaction time axis,
//!    and all bound lists are spread into a dense [`bound_list::EncodedDb`]
//! 3. [`episodes`]: itemsets are extended into episodes by windowed temporal joins
//!
//! [`per_trace`] runs the pipeline for every entity separately and aggregates
//! structurally equal episodes across entities.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::event_data::FlatEvent;

pub mod bound_list;
pub mod episodes;
pub mod index_db;
pub mod itemsets;
pub mod per_trace;

#[cfg(test)]
mod tests;

/// Activity label
pub type Label = String;
/// 1-based location of a frequent event in the [`index_db::IndexDb`]
pub type Loc = usize;
/// Identifier of a frequent itemset
pub type ItemsetId = usize;

/// Options for serial episode mining
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EpisodeMiningOptions {
    /// Minimum support
    ///
    /// Counted as distinct entities if the event stream has entities, otherwise as occurrences.
    /// A minimum support of `0` yields no results.
    pub min_support: usize,
    /// Maximum window (in time slots) an episode may span
    ///
    /// A window of `0` yields no results.
    pub max_window: usize,
}

impl Default for EpisodeMiningOptions {
    fn default() -> Self {
        Self {
            min_support: 2,
            max_window: 5,
        }
    }
}

impl EpisodeMiningOptions {
    /// Create new options
    pub fn new(min_support: usize, max_window: usize) -> Self {
        Self {
            min_support,
            max_window,
        }
    }

    /// Reject non-positive parameters
    ///
    /// The miners themselves treat those as "no results"; this check is meant for callers
    /// that want to report invalid input instead.
    pub fn validate(&self) -> Result<(), EpisodeMiningError> {
        if self.min_support == 0 {
            return Err(EpisodeMiningError::InvalidParameter {
                name: "min_support",
                value: self.min_support,
            });
        }
        if self.max_window == 0 {
            return Err(EpisodeMiningError::InvalidParameter {
                name: "max_window",
                value: self.max_window,
            });
        }
        Ok(())
    }

    fn is_degenerate(&self) -> bool {
        self.min_support == 0 || self.max_window == 0
    }
}

/// Error type for serial episode mining
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeMiningError {
    /// A mining parameter must be positive
    InvalidParameter {
        /// Name of the parameter
        name: &'static str,
        /// The rejected value
        value: usize,
    },
    /// An itemset id was referenced that does not exist in the itemset table
    ///
    /// Itemset ids are only assigned by the miners, so this indicates
    /// an encoded database that does not belong to the given itemset table.
    UnknownItemset(ItemsetId),
}

impl std::fmt::Display for EpisodeMiningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter { name, value } => {
                write!(f, "Invalid parameter: {name} must be positive (got {value})")
            }
            Self::UnknownItemset(id) => write!(f, "Unknown itemset id: {id}"),
        }
    }
}

impl std::error::Error for EpisodeMiningError {}

/// Hands out sequential ids, starting at `1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: usize,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// Return the next id
    pub fn allocate(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> usize {
        self.next - 1
    }
}

/// Identifier of a discovered pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PatternId {
    /// Ordered itemset ids making up an episode (single run)
    Sequence(Vec<ItemsetId>),
    /// Sequential id of an aggregated pattern (per-trace runs)
    Global(usize),
}

/// One step of an episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EpisodeStep {
    /// Labels occurring together in this step
    pub activity: Vec<Label>,
    /// Objects involved in the witnessing events
    pub objects: Vec<String>,
}

/// A frequent serial episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EpisodeRecord {
    /// Pattern identifier
    pub pattern_id: PatternId,
    /// Ordered steps of the episode
    pub episode: Vec<EpisodeStep>,
    /// Support of the episode
    pub support: usize,
}

impl EpisodeRecord {
    /// Labels of every step
    pub fn activities(&self) -> Vec<Vec<&str>> {
        self.episode
            .iter()
            .map(|step| step.activity.iter().map(String::as_str).collect())
            .collect()
    }
}

/// Discover frequent serial episodes in a flat event stream
///
/// Runs all three mining phases over the whole stream at once.
/// Empty input or a degenerate option (see [`EpisodeMiningOptions`]) yields an empty result.
pub fn discover_serial_episodes(
    events: &[FlatEvent],
    options: &EpisodeMiningOptions,
) -> Result<Vec<EpisodeRecord>, EpisodeMiningError> {
    if options.is_degenerate() || events.is_empty() {
        return Ok(Vec::new());
    }
    let index_db = index_db::IndexDb::build(events, options.min_support);
    let itemsets = itemsets::mine_frequent_itemsets(
        &index_db,
        options.min_support,
        &mut IdAllocator::default(),
    );
    let bound_itemsets = bound_list::encode_bound_lists(&index_db, &itemsets);
    let encoded_db = bound_list::EncodedDb::from_bound_itemsets(&bound_itemsets);
    let ret = episodes::mine_serial_episodes(&bound_itemsets, &encoded_db, options)?;
    debug!(
        events = events.len(),
        itemsets = itemsets.len(),
        max_time = encoded_db.max_time(),
        episodes = ret.len(),
        "discovered serial episodes"
    );
    Ok(ret)
}
