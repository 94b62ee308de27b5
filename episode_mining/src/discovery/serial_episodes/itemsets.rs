//! Frequent Itemset Mining using memory Anchors (FIMA)
//!
//! Itemsets are sets of labels co-occurring in one transaction. They are grown
//! by prefix projection: a prefix is extended only by labels that sort after its
//! last label, so every combination is generated exactly once.
use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{
    index_db::{IndexDb, IndexRow},
    IdAllocator, ItemsetId, Label, Loc,
};

/// A frequent itemset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Itemset {
    /// Generated id
    pub id: ItemsetId,
    /// Labels, strictly increasing
    pub items: Vec<Label>,
    /// Locations of the last label wherever the itemset occurs
    pub locs: Vec<Loc>,
    /// Support
    pub support: usize,
}

/// Frequent itemsets in generation (i.e., id) order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ItemsetTable {
    /// All itemsets, ordered by id
    pub itemsets: Vec<Itemset>,
}

impl ItemsetTable {
    /// Number of itemsets
    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    /// Check if there are no itemsets
    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    /// Iterate over all itemsets in id order
    pub fn iter(&self) -> impl Iterator<Item = &Itemset> {
        self.itemsets.iter()
    }

    /// Get the itemset with the given id
    pub fn get(&self, id: ItemsetId) -> Option<&Itemset> {
        self.itemsets
            .binary_search_by_key(&id, |i| i.id)
            .ok()
            .map(|pos| &self.itemsets[pos])
    }

    /// Find the itemset consisting of exactly the given (sorted) labels
    pub fn find(&self, items: &[&str]) -> Option<&Itemset> {
        self.itemsets.iter().find(|i| i.items == items)
    }
}

/// An extension of a prefix which still needs an id
#[derive(Debug)]
struct Extension {
    items: Vec<Label>,
    locs: Vec<Loc>,
    support: usize,
}

/// Mine all itemsets reaching `min_support`
///
/// Ids are taken from `ids` in generation order: first all frequent single labels
/// (sorted), then the extensions of every single label, depth-first.
pub fn mine_frequent_itemsets(
    index_db: &IndexDb,
    min_support: usize,
    ids: &mut IdAllocator,
) -> ItemsetTable {
    let mut table = ItemsetTable::default();
    if min_support == 0 {
        return table;
    }

    for label in &index_db.frequent_labels {
        let locs = index_db.label_locs.get(label).cloned().unwrap_or_default();
        let support = index_db.label_support(label);
        table.itemsets.push(Itemset {
            id: ids.allocate(),
            items: vec![label.clone()],
            locs,
            support,
        });
    }

    for label in &index_db.frequent_labels {
        let mut stack = project_extensions(index_db, std::slice::from_ref(label), min_support);
        stack.reverse();
        while let Some(ext) = stack.pop() {
            let children = project_extensions(index_db, &ext.items, min_support);
            table.itemsets.push(Itemset {
                id: ids.allocate(),
                items: ext.items,
                locs: ext.locs,
                support: ext.support,
            });
            stack.extend(children.into_iter().rev());
        }
    }

    tracing::debug!(
        seeds = index_db.frequent_labels.len(),
        itemsets = table.len(),
        "mined frequent itemsets"
    );
    table
}

/// Frequent one-label extensions of `prefix`, sorted by the added label
fn project_extensions(index_db: &IndexDb, prefix: &[Label], min_support: usize) -> Vec<Extension> {
    let Some(last) = prefix.last() else {
        return Vec::new();
    };
    let mut candidates: BTreeMap<&str, Vec<Loc>> = BTreeMap::new();
    for transaction in index_db.transactions() {
        let Some(anchor) = prefix_anchor(transaction, prefix) else {
            continue;
        };
        for row in transaction.iter().filter(|r| r.loc > anchor) {
            if row.label > *last {
                candidates.entry(row.label.as_str()).or_default().push(row.loc);
            }
        }
    }

    candidates
        .into_iter()
        .filter_map(|(label, locs)| {
            let support = index_db.support_of(&locs);
            (support >= min_support).then(|| {
                let mut items = prefix.to_vec();
                items.push(label.to_string());
                Extension {
                    items,
                    locs,
                    support,
                }
            })
        })
        .collect()
}

/// Location of the last prefix label in `transaction`
///
/// Only defined if the transaction contains every label of the (sorted) prefix and
/// the first of them sits at the transaction's very first location.
fn prefix_anchor(transaction: &[IndexRow], prefix: &[Label]) -> Option<Loc> {
    let first = transaction.first()?;
    let matched: Vec<&IndexRow> = transaction
        .iter()
        .filter(|r| prefix.binary_search(&r.label).is_ok())
        .collect();
    if matched.first()?.loc != first.loc {
        return None;
    }
    let all_present = prefix
        .iter()
        .all(|label| matched.iter().any(|r| &r.label == label));
    if !all_present {
        return None;
    }
    matched.last().map(|r| r.loc)
}
