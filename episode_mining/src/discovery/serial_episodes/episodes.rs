//! Serial episode mining over projected bound lists
//!
//! Starting from every itemset whose projected bound list is frequent, episodes are
//! extended by the itemsets that are locally frequent inside the projected windows,
//! using a temporal join of the bound lists.
use super::{
    bound_list::{BoundItemsetTable, BoundList, EncodedDb},
    EpisodeMiningError, EpisodeMiningOptions, EpisodeRecord, EpisodeStep, ItemsetId, PatternId,
};

/// An episode still to be reported (and possibly extended)
#[derive(Debug)]
struct EpisodeNode {
    episode: Vec<ItemsetId>,
    bound_list: BoundList,
    extend: bool,
}

/// Ids occurring at least `min_support` times within the windows of `projected`
///
/// Returned in ascending id order.
pub fn local_frequent_ids(
    projected: &BoundList,
    encoded_db: &EncodedDb,
    min_support: usize,
) -> Vec<ItemsetId> {
    encoded_db
        .count_in_windows(projected)
        .into_iter()
        .filter(|(_, count)| *count >= min_support)
        .map(|(id, _)| id)
        .collect()
}

/// Mine serial episodes from bound itemsets and their encoded database
///
/// Every itemset whose projected bound list has at least `min_support` windows starts an episode.
/// Each locally frequent extension is reported with the number of joined bounds as support, and
/// extended further if its own projected bound list is still frequent.
/// Records are returned depth-first, in the order they are discovered.
///
/// Fails with [`EpisodeMiningError::UnknownItemset`] if `encoded_db` refers to an id
/// that is not part of `itemsets`.
pub fn mine_serial_episodes(
    itemsets: &BoundItemsetTable,
    encoded_db: &EncodedDb,
    options: &EpisodeMiningOptions,
) -> Result<Vec<EpisodeRecord>, EpisodeMiningError> {
    let mut ret = Vec::new();
    if options.is_degenerate() {
        return Ok(ret);
    }
    let EpisodeMiningOptions {
        min_support,
        max_window,
    } = *options;
    let max_time = encoded_db.max_time();

    for seed in itemsets.iter() {
        if seed.bound_list.project(max_window, max_time).len() < min_support {
            continue;
        }
        let mut stack = vec![EpisodeNode {
            episode: vec![seed.id],
            bound_list: seed.bound_list.clone(),
            extend: true,
        }];
        while let Some(node) = stack.pop() {
            ret.push(build_record(itemsets, &node.episode, node.bound_list.len())?);
            if !node.extend {
                continue;
            }
            let projected = node.bound_list.project(max_window, max_time);
            let mut children = Vec::new();
            for id in local_frequent_ids(&projected, encoded_db, min_support) {
                let candidate = itemsets
                    .get(id)
                    .ok_or(EpisodeMiningError::UnknownItemset(id))?;
                let joined = node
                    .bound_list
                    .temporal_join(&candidate.bound_list, max_window);
                let extend = joined.project(max_window, max_time).len() >= min_support;
                let mut episode = node.episode.clone();
                episode.push(id);
                children.push(EpisodeNode {
                    episode,
                    bound_list: joined,
                    extend,
                });
            }
            stack.extend(children.into_iter().rev());
        }
    }
    tracing::debug!(
        seeds = itemsets.len(),
        episodes = ret.len(),
        "mined serial episodes"
    );
    Ok(ret)
}

fn build_record(
    itemsets: &BoundItemsetTable,
    episode: &[ItemsetId],
    support: usize,
) -> Result<EpisodeRecord, EpisodeMiningError> {
    let steps = episode
        .iter()
        .map(|id| {
            itemsets
                .get(*id)
                .map(|row| EpisodeStep {
                    activity: row.items.clone(),
                    objects: row.objects.clone(),
                })
                .ok_or(EpisodeMiningError::UnknownItemset(*id))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EpisodeRecord {
        pattern_id: PatternId::Sequence(episode.to_vec()),
        episode: steps,
        support,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::serial_episodes::bound_list::BoundItemset;

    fn row(id: ItemsetId, items: &[&str], points: &[usize]) -> BoundItemset {
        BoundItemset {
            id,
            items: items.iter().map(|s| s.to_string()).collect(),
            locs: Vec::new(),
            bound_list: BoundList::from_points(points.iter().copied()),
            objects: vec![format!("ob-{id}")],
        }
    }

    fn scenario_b() -> (BoundItemsetTable, EncodedDb) {
        let table = BoundItemsetTable::new(vec![
            row(1, &["A", "C", "F"], &[1, 4]),
            row(2, &["B", "D"], &[3, 5]),
        ]);
        let encoded =
            EncodedDb::from_time_indexed(vec![vec![], vec![1], vec![], vec![2], vec![1], vec![2]]);
        (table, encoded)
    }

    #[test]
    fn scenario_b_episode() {
        let (table, encoded) = scenario_b();
        assert_eq!(encoded, EncodedDb::from_bound_itemsets(&table));

        let episodes = mine_serial_episodes(&table, &encoded, &EpisodeMiningOptions::new(2, 3))
            .unwrap();
        let patterns: Vec<(PatternId, usize)> = episodes
            .iter()
            .map(|e| (e.pattern_id.clone(), e.support))
            .collect();
        assert_eq!(
            patterns,
            vec![
                (PatternId::Sequence(vec![1]), 2),
                (PatternId::Sequence(vec![1, 2]), 2)
            ]
        );
        let acf_bd = &episodes[1];
        assert_eq!(acf_bd.activities(), vec![vec!["A", "C", "F"], vec!["B", "D"]]);
        assert_eq!(acf_bd.episode[0].objects, vec!["ob-1"]);
        assert_eq!(acf_bd.episode[1].objects, vec!["ob-2"]);
    }

    #[test]
    fn local_frequency_counts_slot_coincidences() {
        let (_, encoded) = scenario_b();
        let projected: BoundList = [(1_usize, 3_usize), (5, 5)].into_iter().collect();
        assert_eq!(local_frequent_ids(&projected, &encoded, 2), vec![2]);
        assert_eq!(local_frequent_ids(&projected, &encoded, 1), vec![1, 2]);
        assert!(local_frequent_ids(&projected, &encoded, 3).is_empty());
    }

    #[test]
    fn steps_keep_episode_order() {
        // B strictly precedes A, so the only two-step episode is (2, 1)
        let table = BoundItemsetTable::new(vec![
            row(1, &["A"], &[2, 5]),
            row(2, &["B"], &[1, 4]),
        ]);
        let encoded = EncodedDb::from_bound_itemsets(&table);
        let episodes = mine_serial_episodes(&table, &encoded, &EpisodeMiningOptions::new(2, 2))
            .unwrap();
        let two_step = episodes
            .iter()
            .find(|e| e.pattern_id == PatternId::Sequence(vec![2, 1]))
            .unwrap();
        assert_eq!(two_step.activities(), vec![vec!["B"], vec!["A"]]);
        assert_eq!(two_step.support, 2);
    }

    #[test]
    fn unknown_ids_fail_fast() {
        let (table, _) = scenario_b();
        let encoded =
            EncodedDb::from_time_indexed(vec![vec![], vec![1], vec![7], vec![7], vec![1], vec![7]]);
        let res = mine_serial_episodes(&table, &encoded, &EpisodeMiningOptions::new(2, 3));
        assert_eq!(res, Err(EpisodeMiningError::UnknownItemset(7)));
    }

    #[test]
    fn degenerate_options_yield_nothing() {
        let (table, encoded) = scenario_b();
        for options in [EpisodeMiningOptions::new(0, 3), EpisodeMiningOptions::new(2, 0)] {
            assert!(mine_serial_episodes(&table, &encoded, &options)
                .unwrap()
                .is_empty());
        }
        let empty = mine_serial_episodes(
            &BoundItemsetTable::default(),
            &EncodedDb::default(),
            &EpisodeMiningOptions::default(),
        )
        .unwrap();
        assert!(empty.is_empty());
    }
}
