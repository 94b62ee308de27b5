//! Derive process executions from object co-occurrence
//!
//! Two events belong to the same process execution if they are connected through
//! shared objects (directly or transitively). The resulting execution identifiers
//! are used as entities when mining.
use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

use super::FlatEvent;

/// Prefix for entity identifiers of events without any object reference
pub const ISOLATED_EXECUTION_PREFIX: &str = "p_iso_";

/// Assign each event the process execution it belongs to
///
/// Objects referenced by the same event are connected; the connected components of
/// this object graph are the process executions. They are numbered `0, 1, ...` in
/// the order of the first event touching them.
/// Events without object references each get their own isolated execution
/// (`p_iso_0`, `p_iso_1`, ...).
///
/// Timestamps, labels and objects are returned unchanged; existing entities are overwritten.
pub fn derive_process_executions(events: &[FlatEvent]) -> Vec<FlatEvent> {
    let mut object_index: HashMap<&str, usize> = HashMap::new();
    for ob in events.iter().flat_map(|e| e.objects.iter()) {
        let next = object_index.len();
        object_index.entry(ob.as_str()).or_insert(next);
    }

    let mut components = UnionFind::<usize>::new(object_index.len());
    for e in events {
        let mut obs = e.objects.iter().map(|ob| object_index[ob.as_str()]);
        if let Some(first) = obs.next() {
            for other in obs {
                components.union(first, other);
            }
        }
    }

    let mut execution_of_root: HashMap<usize, usize> = HashMap::new();
    let mut isolated = 0;
    let ret: Vec<FlatEvent> = events
        .iter()
        .map(|e| {
            let entity = match e.objects.first() {
                Some(ob) => {
                    let root = components.find(object_index[ob.as_str()]);
                    let next = execution_of_root.len();
                    execution_of_root.entry(root).or_insert(next).to_string()
                }
                None => {
                    isolated += 1;
                    format!("{ISOLATED_EXECUTION_PREFIX}{}", isolated - 1)
                }
            };
            FlatEvent {
                entity: Some(entity),
                ..e.clone()
            }
        })
        .collect();
    tracing::debug!(
        events = events.len(),
        objects = object_index.len(),
        executions = execution_of_root.len(),
        isolated,
        "derived process executions"
    );
    ret
}
