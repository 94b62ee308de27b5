//! Bound lists and the encoded database
//!
//! A [`BoundList`] marks where a pattern occurs on the transaction time axis.
//! The [`EncodedDb`] is the dense inverse view: for every time slot, which itemsets are active.
use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{index_db::IndexDb, itemsets::ItemsetTable, ItemsetId, Label, Loc};

/// Inclusive interval `[start, end]` on the time axis
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Bound {
    /// First time slot
    pub start: usize,
    /// Last time slot
    pub end: usize,
}

impl Bound {
    /// Create a new [`Bound`]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Degenerate bound `[t, t]`
    pub fn point(t: usize) -> Self {
        Self { start: t, end: t }
    }
}

impl From<(usize, usize)> for Bound {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

/// Sorted list of [`Bound`]s
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct BoundList {
    bounds: Vec<Bound>,
}

impl BoundList {
    /// One point bound per distinct time slot
    pub fn from_points(points: impl IntoIterator<Item = usize>) -> Self {
        let mut bounds: Vec<Bound> = points.into_iter().map(Bound::point).collect();
        bounds.sort_unstable();
        bounds.dedup();
        Self { bounds }
    }

    /// Number of bounds
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Check if there are no bounds
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Iterate over all bounds
    pub fn iter(&self) -> impl Iterator<Item = &Bound> {
        self.bounds.iter()
    }

    /// All bounds as a slice
    pub fn as_slice(&self) -> &[Bound] {
        &self.bounds
    }

    /// Largest end of all bounds (`0` if empty)
    pub fn max_end(&self) -> usize {
        self.bounds.iter().map(|b| b.end).max().unwrap_or(0)
    }

    /// Search windows following every bound
    ///
    /// For a bound `[ts, te]` the window is `[te + 1, min(ts + max_window - 1, max_time)]`.
    /// Empty windows are dropped.
    pub fn project(&self, max_window: usize, max_time: usize) -> BoundList {
        let bounds = self
            .bounds
            .iter()
            .filter_map(|b| {
                let start = b.end + 1;
                let end = b
                    .start
                    .saturating_add(max_window)
                    .saturating_sub(1)
                    .min(max_time);
                (start <= end).then_some(Bound::new(start, end))
            })
            .collect();
        BoundList { bounds }
    }

    /// Join this bound list with the start points of `candidate`
    ///
    /// Every pair of a bound `[ts_i, te_i]` and a candidate start `ts_f` with
    /// `te_i < ts_f` and `ts_f - ts_i < max_window` yields the bound `[ts_i, ts_f]`.
    /// Pairs are not deduplicated.
    pub fn temporal_join(&self, candidate: &BoundList, max_window: usize) -> BoundList {
        let mut bounds = Vec::new();
        for anchor in &self.bounds {
            for follower in &candidate.bounds {
                if anchor.end < follower.start
                    && follower.start.saturating_sub(anchor.start) < max_window
                {
                    bounds.push(Bound::new(anchor.start, follower.start));
                }
            }
        }
        BoundList { bounds }
    }
}

impl<B: Into<Bound>> FromIterator<B> for BoundList {
    fn from_iter<T: IntoIterator<Item = B>>(iter: T) -> Self {
        Self {
            bounds: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// An itemset together with its bound list and witnessing objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BoundItemset {
    /// Itemset id
    pub id: ItemsetId,
    /// Labels of the itemset
    pub items: Vec<Label>,
    /// Locations the itemset occurs at
    pub locs: Vec<Loc>,
    /// Point bounds at every transaction the itemset occurs in
    pub bound_list: BoundList,
    /// Objects referenced at the itemset's locations
    pub objects: Vec<String>,
}

/// [`BoundItemset`]s ordered by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BoundItemsetTable {
    rows: Vec<BoundItemset>,
}

impl BoundItemsetTable {
    /// Create a table from arbitrary ordered rows
    pub fn new(mut rows: Vec<BoundItemset>) -> Self {
        rows.sort_by_key(|r| r.id);
        Self { rows }
    }

    /// Number of itemsets
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no itemsets
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over all itemsets in id order
    pub fn iter(&self) -> impl Iterator<Item = &BoundItemset> {
        self.rows.iter()
    }

    /// Get the itemset with the given id
    pub fn get(&self, id: ItemsetId) -> Option<&BoundItemset> {
        self.rows
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|pos| &self.rows[pos])
    }

    /// Largest bound end over all itemsets
    pub fn max_time(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.bound_list.max_end())
            .max()
            .unwrap_or(0)
    }
}

/// Attach bound lists and objects to all itemsets
///
/// The bound list of an itemset has one point bound per distinct transaction id of its locations.
pub fn encode_bound_lists(index_db: &IndexDb, itemsets: &ItemsetTable) -> BoundItemsetTable {
    BoundItemsetTable::new(
        itemsets
            .iter()
            .map(|itemset| BoundItemset {
                id: itemset.id,
                items: itemset.items.clone(),
                locs: itemset.locs.clone(),
                bound_list: BoundList::from_points(index_db.tids_of(&itemset.locs)),
                objects: index_db.objects_of(&itemset.locs),
            })
            .collect(),
    )
}

/// Dense index from time slot to the ids of all itemsets active at that slot
///
/// Time slots are 1-based; slot `t` is stored at position `t - 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct EncodedDb {
    slots: Vec<Vec<ItemsetId>>,
}

impl EncodedDb {
    /// Spread every bound of every itemset over the slots it covers
    ///
    /// The database has [`BoundItemsetTable::max_time`] slots.
    /// Inverted bounds (`start > end`) cover no slot.
    pub fn from_bound_itemsets(table: &BoundItemsetTable) -> Self {
        let mut slots = vec![Vec::new(); table.max_time()];
        for row in table.iter() {
            for bound in row.bound_list.iter().filter(|b| b.start <= b.end) {
                for slot in &mut slots[bound.start.saturating_sub(1)..bound.end] {
                    slot.push(row.id);
                }
            }
        }
        tracing::debug!(
            slots = slots.len(),
            entries = slots.iter().map(Vec::len).sum::<usize>(),
            "encoded itemset database"
        );
        Self { slots }
    }

    /// Use the given rows as slots `1, 2, ...`
    pub fn from_slots(slots: Vec<Vec<ItemsetId>>) -> Self {
        Self { slots }
    }

    /// Use time-indexed rows, where row `t` holds slot `t`
    ///
    /// Row `0` (time 0) precedes the time axis and is discarded.
    pub fn from_time_indexed(rows: Vec<Vec<ItemsetId>>) -> Self {
        Self {
            slots: rows.into_iter().skip(1).collect(),
        }
    }

    /// Number of time slots
    pub fn max_time(&self) -> usize {
        self.slots.len()
    }

    /// Ids active at time slot `t` (empty outside of `1..=max_time`)
    pub fn slot(&self, t: usize) -> &[ItemsetId] {
        t.checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All slots, starting with slot `1`
    pub fn slots(&self) -> &[Vec<ItemsetId>] {
        &self.slots
    }

    /// Count how often every id occurs within the given windows
    ///
    /// Every (window, slot) coincidence counts, so an id active at several slots
    /// of one window is counted several times.
    pub fn count_in_windows(&self, windows: &BoundList) -> BTreeMap<ItemsetId, usize> {
        let mut counts: BTreeMap<ItemsetId, usize> = BTreeMap::new();
        for window in windows.iter() {
            for t in window.start..=window.end {
                for id in self.slot(t) {
                    *counts.entry(*id).or_default() += 1;
                }
            }
        }
        counts
    }
}
