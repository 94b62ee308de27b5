use itertools::Itertools;

use super::{per_trace::discover_serial_episodes_per_trace, *};
use crate::{
    core::io::Importable, derive_process_executions, utils::test_utils::get_test_data_path,
    EventStream,
};

/// Three transactions of `A, C, F` followed by `B, D` (with a single `E` at the end)
pub fn scenario_a_events() -> Vec<FlatEvent> {
    vec![
        FlatEvent::new(1, "A"),
        FlatEvent::new(1, "C"),
        FlatEvent::new(1, "F"),
        FlatEvent::new(3, "B"),
        FlatEvent::new(3, "D"),
        FlatEvent::new(4, "A"),
        FlatEvent::new(4, "C"),
        FlatEvent::new(4, "F"),
        FlatEvent::new(5, "B"),
        FlatEvent::new(5, "D"),
        FlatEvent::new(5, "E"),
    ]
}

fn order_handling_events() -> Vec<FlatEvent> {
    let path = get_test_data_path().join("order_handling.json");
    let stream = EventStream::import_from_path(&path).unwrap();
    derive_process_executions(&stream.events)
}

fn sequence_of(record: &EpisodeRecord) -> Vec<ItemsetId> {
    match &record.pattern_id {
        PatternId::Sequence(ids) => ids.clone(),
        PatternId::Global(id) => vec![*id],
    }
}

#[test]
fn scenario_a_end_to_end() {
    let episodes =
        discover_serial_episodes(&scenario_a_events(), &EpisodeMiningOptions::new(2, 3)).unwrap();
    assert_eq!(episodes.len(), 24);
    assert!(episodes.iter().all(|e| e.support == 2));

    // Every root (A, C, F, AC, ACF, AF) is followed by its extensions B, D and BD
    let roots: Vec<ItemsetId> = episodes
        .iter()
        .map(sequence_of)
        .filter(|ids| ids.len() == 1)
        .map(|ids| ids[0])
        .collect();
    assert_eq!(roots, vec![1, 3, 5, 6, 7, 8]);
    let after_acf: Vec<Vec<ItemsetId>> = episodes
        .iter()
        .map(sequence_of)
        .skip_while(|ids| ids != &vec![7])
        .take(4)
        .collect();
    assert_eq!(after_acf, vec![vec![7], vec![7, 2], vec![7, 4], vec![7, 9]]);

    let acf_bd = episodes
        .iter()
        .find(|e| e.pattern_id == PatternId::Sequence(vec![7, 9]))
        .unwrap();
    assert_eq!(acf_bd.activities(), vec![vec!["A", "C", "F"], vec!["B", "D"]]);
    assert_eq!(acf_bd.support, 2);

    // B and D only occur at the end of each window
    assert!(episodes
        .iter()
        .all(|e| !matches!(e.activities()[0].as_slice(), ["B"] | ["D"] | ["B", "D"])));
}

#[test]
fn episodes_are_unique_and_frequent() {
    for (min_support, max_window) in [(1, 1), (1, 2), (2, 2), (2, 4), (3, 5)] {
        let options = EpisodeMiningOptions::new(min_support, max_window);
        let episodes = discover_serial_episodes(&scenario_a_events(), &options).unwrap();
        let unique: std::collections::HashSet<Vec<ItemsetId>> =
            episodes.iter().map(sequence_of).collect();
        assert_eq!(unique.len(), episodes.len());
        assert!(episodes.iter().all(|e| e.support >= min_support));
        if max_window == 1 {
            assert!(episodes.iter().all(|e| e.episode.len() == 1));
        }
    }
}

#[test]
fn unbounded_window_matches_wide_window() {
    let wide =
        discover_serial_episodes(&scenario_a_events(), &EpisodeMiningOptions::new(2, 100)).unwrap();
    let unbounded =
        discover_serial_episodes(&scenario_a_events(), &EpisodeMiningOptions::new(2, usize::MAX))
            .unwrap();
    assert!(!wide.is_empty());
    assert_eq!(wide, unbounded);
}

#[test]
fn empty_input_is_not_an_error() {
    assert!(discover_serial_episodes(&[], &EpisodeMiningOptions::default())
        .unwrap()
        .is_empty());

    for (min_support, max_window) in [(1, 1), (2, 5), (0, 0)] {
        let options = EpisodeMiningOptions::new(min_support, max_window);
        let db = index_db::IndexDb::build(&[], min_support);
        assert!(db.is_empty());
        let table = itemsets::mine_frequent_itemsets(&db, min_support, &mut IdAllocator::default());
        assert!(table.is_empty());
        let bound_itemsets = bound_list::encode_bound_lists(&db, &table);
        assert!(bound_itemsets.is_empty());
        let encoded_db = bound_list::EncodedDb::from_bound_itemsets(&bound_itemsets);
        assert_eq!(encoded_db.max_time(), 0);
        let mined = episodes::mine_serial_episodes(&bound_itemsets, &encoded_db, &options);
        assert_eq!(mined, Ok(Vec::new()));
        assert!(discover_serial_episodes_per_trace(&[], &options)
            .unwrap()
            .is_empty());
    }
}

#[test]
fn degenerate_options() {
    for options in [EpisodeMiningOptions::new(0, 3), EpisodeMiningOptions::new(2, 0)] {
        assert!(options.validate().is_err());
        assert!(discover_serial_episodes(&scenario_a_events(), &options)
            .unwrap()
            .is_empty());
    }
    assert_eq!(
        EpisodeMiningOptions::new(2, 0).validate(),
        Err(EpisodeMiningError::InvalidParameter {
            name: "max_window",
            value: 0
        })
    );
    assert!(EpisodeMiningOptions::default().validate().is_ok());
}

#[test]
fn mining_is_deterministic() {
    let options = EpisodeMiningOptions::new(2, 3);
    let first = discover_serial_episodes(&scenario_a_events(), &options).unwrap();
    let second = discover_serial_episodes(&scenario_a_events(), &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn records_serialize_with_plain_ids() {
    let episodes =
        discover_serial_episodes(&scenario_a_events(), &EpisodeMiningOptions::new(2, 3)).unwrap();
    let json = serde_json::to_value(&episodes[1]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "pattern_id": [1, 2],
            "episode": [
                {"activity": ["A"], "objects": []},
                {"activity": ["B"], "objects": []}
            ],
            "support": 2
        })
    );
}

#[test]
fn order_handling_whole_stream() {
    let events = order_handling_events();
    let entities: Vec<&str> = events
        .iter()
        .filter_map(|e| e.entity.as_deref())
        .unique()
        .collect();
    assert_eq!(entities, vec!["0", "1", "2", "3"]);

    let episodes = discover_serial_episodes(&events, &EpisodeMiningOptions::new(3, 3)).unwrap();
    let found: Vec<Vec<Vec<&str>>> = episodes.iter().map(|e| e.activities()).collect();
    assert_eq!(
        found,
        vec![
            vec![vec!["pick item"]],
            vec![vec!["pick item"], vec!["ship"]],
            vec![vec!["place order"]],
            vec![vec!["place order"], vec!["pick item"]],
            vec![vec!["place order"], vec!["pick item"], vec!["ship"]],
            vec![vec!["place order"], vec!["ship"]],
        ]
    );
    assert!(episodes.iter().all(|e| e.support == 3));
}

#[test]
fn order_handling_per_trace() {
    let events = order_handling_events();

    let episodes =
        discover_serial_episodes_per_trace(&events, &EpisodeMiningOptions::new(2, 3)).unwrap();
    let ids: Vec<PatternId> = episodes.iter().map(|e| e.pattern_id.clone()).collect();
    assert_eq!(ids, (1..=14).map(PatternId::Global).collect::<Vec<_>>());
    let pay_pick_ship = episodes
        .iter()
        .find(|e| e.pattern_id == PatternId::Global(14))
        .unwrap();
    assert_eq!(
        pay_pick_ship.activities(),
        vec![vec!["pay order", "pick item"], vec!["ship"]]
    );
    assert_eq!(pay_pick_ship.support, 2);

    // The third order is never paid, so only structures without payment remain
    let episodes =
        discover_serial_episodes_per_trace(&events, &EpisodeMiningOptions::new(3, 3)).unwrap();
    let ids: Vec<PatternId> = episodes.iter().map(|e| e.pattern_id.clone()).collect();
    assert_eq!(
        ids,
        [3, 4, 5, 8, 9, 10].map(PatternId::Global).to_vec()
    );
    assert!(episodes.iter().all(|e| e.support == 3));

    let place_ship = episodes
        .iter()
        .find(|e| e.pattern_id == PatternId::Global(10))
        .unwrap();
    assert_eq!(place_ship.activities(), vec![vec!["place order"], vec!["ship"]]);
    assert_eq!(
        place_ship.episode[0].objects,
        vec!["o1", "c1", "o2", "c2", "o3", "c3"]
    );
    assert_eq!(
        place_ship.episode[1].objects,
        vec!["o1", "i1", "o2", "i2", "o3", "i3"]
    );
}
