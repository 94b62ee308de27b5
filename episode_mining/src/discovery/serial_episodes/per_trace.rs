//! Per-trace serial episode mining
//!
//! Mines every entity (trace) on its own local time axis and aggregates the
//! structurally equal episodes of all entities into global patterns.
use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use rayon::prelude::*;
use tracing::info;

use super::{
    discover_serial_episodes, EpisodeMiningError, EpisodeMiningOptions, EpisodeRecord,
    EpisodeStep, IdAllocator, Label, PatternId,
};
use crate::core::event_data::FlatEvent;

/// Structure of an episode: the sorted labels of every step, in step order
pub type EpisodeSignature = Vec<Vec<Label>>;

/// Group events by entity, in order of first appearance
///
/// Events without entity form one group.
pub fn group_by_entity(events: &[FlatEvent]) -> Vec<(Option<&str>, Vec<&FlatEvent>)> {
    let mut group_of: HashMap<Option<&str>, usize> = HashMap::new();
    let mut groups: Vec<(Option<&str>, Vec<&FlatEvent>)> = Vec::new();
    for e in events {
        let entity = e.entity.as_deref();
        let pos = *group_of.entry(entity).or_insert_with(|| {
            groups.push((entity, Vec::new()));
            groups.len() - 1
        });
        groups[pos].1.push(e);
    }
    groups
}

/// Replace timestamps by their dense rank `1..=N` within the trace
pub fn normalize_timestamps(trace: &[&FlatEvent]) -> Vec<FlatEvent> {
    let rank: HashMap<i64, i64> = trace
        .iter()
        .map(|e| e.timestamp)
        .sorted_unstable()
        .dedup()
        .zip(1..)
        .collect();
    trace
        .iter()
        .map(|e| FlatEvent {
            timestamp: rank[&e.timestamp],
            ..(*e).clone()
        })
        .collect()
}

/// Structural signature of an episode record
pub fn episode_signature(record: &EpisodeRecord) -> EpisodeSignature {
    record
        .episode
        .iter()
        .map(|step| step.activity.iter().cloned().sorted().collect())
        .collect()
}

#[derive(Debug)]
struct AggregatedEpisode {
    id: usize,
    signature: EpisodeSignature,
    witnesses: HashSet<usize>,
    objects: Vec<Vec<String>>,
}

impl AggregatedEpisode {
    fn into_record(self) -> EpisodeRecord {
        EpisodeRecord {
            pattern_id: PatternId::Global(self.id),
            episode: self
                .signature
                .into_iter()
                .zip(self.objects)
                .map(|(activity, objects)| EpisodeStep {
                    activity,
                    objects: objects.into_iter().unique().collect(),
                })
                .collect(),
            support: self.witnesses.len(),
        }
    }
}

/// Discover serial episodes per trace and aggregate them across traces
///
/// Every entity with at least two events is mined separately (with a minimum support of `1`
/// and the given `max_window`) on its own dense time axis. Episodes are then merged by their
/// [`episode_signature`]: the support of a merged pattern is the number of entities exhibiting
/// it, and the objects of each step are the union over all those entities.
///
/// Patterns are numbered in order of first discovery (before filtering), and only those
/// reaching `min_support` are returned, in id order.
pub fn discover_serial_episodes_per_trace(
    events: &[FlatEvent],
    options: &EpisodeMiningOptions,
) -> Result<Vec<EpisodeRecord>, EpisodeMiningError> {
    if options.is_degenerate() {
        return Ok(Vec::new());
    }
    let local_options = EpisodeMiningOptions::new(1, options.max_window);
    let traces: Vec<Vec<&FlatEvent>> = group_by_entity(events)
        .into_iter()
        .map(|(_, trace)| trace)
        .filter(|trace| trace.len() >= 2)
        .collect();

    let per_trace: Vec<Vec<EpisodeRecord>> = traces
        .par_iter()
        .map(|trace| discover_serial_episodes(&normalize_timestamps(trace), &local_options))
        .collect::<Result<_, _>>()?;

    let mut ids = IdAllocator::default();
    let mut aggregated: Vec<AggregatedEpisode> = Vec::new();
    let mut by_signature: HashMap<EpisodeSignature, usize> = HashMap::new();
    for (trace_index, records) in per_trace.into_iter().enumerate() {
        for record in records {
            let signature = episode_signature(&record);
            let pos = *by_signature.entry(signature).or_insert_with_key(|signature| {
                aggregated.push(AggregatedEpisode {
                    id: ids.allocate(),
                    signature: signature.clone(),
                    witnesses: HashSet::new(),
                    objects: vec![Vec::new(); signature.len()],
                });
                aggregated.len() - 1
            });
            let agg = &mut aggregated[pos];
            agg.witnesses.insert(trace_index);
            for (objects, step) in agg.objects.iter_mut().zip(record.episode) {
                objects.extend(step.objects);
            }
        }
    }

    let ret: Vec<EpisodeRecord> = aggregated
        .into_iter()
        .filter(|agg| agg.witnesses.len() >= options.min_support)
        .map(AggregatedEpisode::into_record)
        .collect();
    info!(
        traces = traces.len(),
        structures = ids.allocated(),
        episodes = ret.len(),
        "discovered serial episodes per trace"
    );
    Ok(ret)
}
