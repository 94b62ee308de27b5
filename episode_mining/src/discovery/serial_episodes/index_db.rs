//! Index Database: the frequent, sorted and positioned view of an event stream
use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{Label, Loc};
use crate::core::event_data::FlatEvent;

/// A frequent event at a fixed location of the [`IndexDb`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRow {
    /// 1-based location
    pub loc: Loc,
    /// Transaction id: dense 1-based rank of the timestamp
    pub tid: usize,
    /// Original timestamp
    pub timestamp: i64,
    /// Activity label
    pub label: Label,
    /// Entity of the event, if any
    pub entity: Option<String>,
    /// Object references of the event
    pub objects: Vec<String>,
}

/// Frequent events sorted by (timestamp, label) and numbered by location
///
/// Events sharing a timestamp form one transaction; transactions are numbered
/// densely, and this numbering is the time axis all bound lists live on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDb {
    /// Frequent single labels (F1), sorted
    pub frequent_labels: Vec<Label>,
    /// Rows, where `rows[i].loc == i + 1`
    pub rows: Vec<IndexRow>,
    /// Locations of every frequent label (ascending)
    pub label_locs: BTreeMap<Label, Vec<Loc>>,
    /// Whether support is counted by distinct entities (otherwise by occurrence)
    pub has_entities: bool,
}

impl IndexDb {
    /// Build the [`IndexDb`] of all events whose label reaches `min_support`
    ///
    /// The support of a label is the number of distinct entities it occurs in, or,
    /// if no event has an entity, the number of its occurrences.
    /// An empty stream or a `min_support` of `0` results in an empty [`IndexDb`].
    pub fn build(events: &[FlatEvent], min_support: usize) -> Self {
        if events.is_empty() || min_support == 0 {
            return Self::default();
        }
        let has_entities = events.iter().any(|e| e.entity.is_some());

        let mut label_events: BTreeMap<&str, Vec<&FlatEvent>> = BTreeMap::new();
        for e in events {
            label_events.entry(e.label.as_str()).or_default().push(e);
        }
        let frequent_labels: Vec<Label> = label_events
            .iter()
            .filter(|(_, evs)| {
                let support = if has_entities {
                    evs.iter().map(|e| e.entity.as_deref()).unique().count()
                } else {
                    evs.len()
                };
                support >= min_support
            })
            .map(|(label, _)| label.to_string())
            .collect();
        let frequent: HashSet<&str> = frequent_labels.iter().map(String::as_str).collect();

        let mut filtered: Vec<&FlatEvent> = events
            .iter()
            .filter(|e| frequent.contains(e.label.as_str()))
            .collect();
        filtered.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.label.cmp(&b.label))
        });

        let mut rows = Vec::with_capacity(filtered.len());
        let mut label_locs: BTreeMap<Label, Vec<Loc>> = BTreeMap::new();
        let mut tid = 0;
        let mut last_timestamp = None;
        for (i, e) in filtered.into_iter().enumerate() {
            if last_timestamp != Some(e.timestamp) {
                tid += 1;
                last_timestamp = Some(e.timestamp);
            }
            let loc = i + 1;
            label_locs.entry(e.label.clone()).or_default().push(loc);
            rows.push(IndexRow {
                loc,
                tid,
                timestamp: e.timestamp,
                label: e.label.clone(),
                entity: e.entity.clone(),
                objects: e.objects.clone(),
            });
        }

        tracing::debug!(
            frequent_labels = frequent_labels.len(),
            rows = rows.len(),
            transactions = tid,
            "built index database"
        );
        Self {
            frequent_labels,
            rows,
            label_locs,
            has_entities,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at the given location
    pub fn row(&self, loc: Loc) -> Option<&IndexRow> {
        loc.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    /// Number of transactions (i.e., the largest transaction id)
    pub fn max_tid(&self) -> usize {
        self.rows.last().map(|r| r.tid).unwrap_or(0)
    }

    /// Rows grouped by transaction, in transaction order
    pub fn transactions(&self) -> impl Iterator<Item = &[IndexRow]> + '_ {
        self.rows.chunk_by(|a, b| a.tid == b.tid)
    }

    /// Support of a set of locations
    ///
    /// Distinct entities if the stream has entities, distinct transactions otherwise.
    pub fn support_of(&self, locs: &[Loc]) -> usize {
        let rows = locs.iter().filter_map(|loc| self.row(*loc));
        if self.has_entities {
            rows.map(|r| r.entity.as_deref()).unique().count()
        } else {
            rows.map(|r| r.tid).unique().count()
        }
    }

    /// Support of a single label, measured as when selecting the frequent labels
    ///
    /// Distinct entities if the stream has entities, occurrences otherwise.
    pub fn label_support(&self, label: &str) -> usize {
        let locs = self.label_locs.get(label).map(Vec::as_slice).unwrap_or(&[]);
        if self.has_entities {
            self.support_of(locs)
        } else {
            locs.len()
        }
    }

    /// Distinct transaction ids of a set of locations (ascending)
    pub fn tids_of(&self, locs: &[Loc]) -> Vec<usize> {
        locs.iter()
            .filter_map(|loc| self.row(*loc))
            .map(|r| r.tid)
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Objects referenced at a set of locations (deduplicated, in first-seen order)
    pub fn objects_of(&self, locs: &[Loc]) -> Vec<String> {
        locs.iter()
            .filter_map(|loc| self.row(*loc))
            .flat_map(|r| r.objects.iter())
            .unique()
            .cloned()
            .collect()
    }
}
