use std::collections::BTreeSet;

use overlap_match::{ConsensusMatcher, MatchEngine, Normalizer, score};
use overlap_model::{CandidatePair, DrugRecord, MatchConfig, RawDrugRecord, Thresholds};
use proptest::prelude::*;

const VOCAB: &[&str] = &[
    "insulin", "glargine", "lispro", "aspirin", "paclitaxel", "injection", "sodium",
    "abacavir", "lamivudine", "acid", "folinic", "calcium", "and", "+", "/", "tablets",
];

fn drug_name() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCAB), 0..4).prop_map(|tokens| tokens.join(" "))
}

fn record(id: &str, name: &str) -> DrugRecord {
    DrugRecord::new(id, name, Normalizer::default().normalize(name))
}

fn passing(pairs: &[(DrugRecord, DrugRecord)], thresholds: Thresholds) -> BTreeSet<usize> {
    let matcher = ConsensusMatcher::new(thresholds, None);
    pairs
        .iter()
        .enumerate()
        .filter(|(_, (left, right))| {
            matcher
                .decide(CandidatePair::new(left, right, score(left, right)))
                .is_match
        })
        .map(|(idx, _)| idx)
        .collect()
}

proptest! {
    #[test]
    fn normalization_is_idempotent(raw in ".{0,40}") {
        let normalizer = Normalizer::default();
        let once = normalizer.normalize(&raw);
        prop_assert_eq!(normalizer.normalize(&once), once);
    }

    #[test]
    fn stripping_normalization_is_idempotent(raw in "[A-Za-z0-9 ,./+&-]{0,40}") {
        let normalizer = Normalizer::new(true);
        let once = normalizer.normalize(&raw);
        prop_assert_eq!(normalizer.normalize(&once), once);
    }

    #[test]
    fn scores_are_symmetric(a in drug_name(), b in drug_name()) {
        let left = record("A", &a);
        let right = record("B", &b);
        let forward = score(&left, &right);
        let backward = score(&right, &left);
        prop_assert_eq!(forward.jaccard, backward.jaccard);
        prop_assert!((forward.token_ratio - backward.token_ratio).abs() < 1e-9);
        prop_assert!((forward.jaro_winkler - backward.jaro_winkler).abs() < 1e-9);
        prop_assert!((forward.edit_ratio - backward.edit_ratio).abs() < 1e-9);
    }

    #[test]
    fn scores_stay_in_range(a in drug_name(), b in drug_name()) {
        let scores = score(&record("A", &a), &record("B", &b));
        prop_assert!((0.0..=1.0).contains(&scores.jaro_winkler));
        prop_assert!((0.0..=1.0).contains(&scores.jaccard));
        prop_assert!((0.0..=100.0).contains(&scores.token_ratio));
        prop_assert!((0.0..=100.0).contains(&scores.edit_ratio));
    }

    #[test]
    fn blank_names_never_match(a in "[ .,;()]{0,8}", b in "[ .,;()]{0,8}") {
        let left = record("A", &a);
        let right = record("B", &b);
        let zero = Thresholds { jaro_winkler: 0.0, jaccard: 0.0, token: 0, edit: 0 };
        let decision = ConsensusMatcher::new(zero, None)
            .decide(CandidatePair::new(&left, &right, score(&left, &right)));
        prop_assert!(!decision.is_match);
    }

    #[test]
    fn raising_a_threshold_never_adds_matches(
        names in prop::collection::vec((drug_name(), drug_name()), 1..12),
        jw in 0.5f64..1.0,
        jaccard in 0.0f64..1.0,
        token in 0u32..=100,
        edit in 0u32..=100,
        which in 0usize..4,
        bump in 0.0f64..0.5,
    ) {
        let pairs: Vec<(DrugRecord, DrugRecord)> = names
            .iter()
            .enumerate()
            .map(|(idx, (a, b))| (record(&format!("L{idx}"), a), record(&format!("R{idx}"), b)))
            .collect();
        let base = Thresholds { jaro_winkler: jw, jaccard, token, edit };
        let mut raised = base;
        match which {
            0 => raised.jaro_winkler = (jw + bump).min(1.0),
            1 => raised.jaccard = (jaccard + bump).min(1.0),
            2 => raised.token = (token + (bump * 100.0) as u32).min(100),
            _ => raised.edit = (edit + (bump * 100.0) as u32).min(100),
        }
        let loose = passing(&pairs, base);
        let strict = passing(&pairs, raised);
        prop_assert!(strict.is_subset(&loose));
    }

    #[test]
    fn resolved_overlaps_are_one_to_one(
        left in prop::collection::vec(drug_name(), 0..10),
        right in prop::collection::vec(drug_name(), 0..10),
    ) {
        let engine = MatchEngine::new(
            MatchConfig::default().with_thresholds(Thresholds::relaxed()),
            None,
        ).unwrap();
        let left: Vec<RawDrugRecord> = left
            .iter()
            .enumerate()
            .map(|(idx, name)| RawDrugRecord::new(format!("L{idx}"), name.as_str()))
            .collect();
        let right: Vec<RawDrugRecord> = right
            .iter()
            .enumerate()
            .map(|(idx, name)| RawDrugRecord::new(format!("R{idx}"), name.as_str()))
            .collect();
        let report = engine.run_raw(left, right).unwrap();

        let mut left_ids = BTreeSet::new();
        let mut right_ids = BTreeSet::new();
        for overlap in &report.overlaps {
            prop_assert!(left_ids.insert(overlap.left_id.clone()));
            prop_assert!(right_ids.insert(overlap.right_id.clone()));
        }
    }

    #[test]
    fn exploded_overlaps_name_the_parent(
        left in prop::collection::vec(drug_name(), 0..8),
        right in prop::collection::vec(drug_name(), 0..8),
    ) {
        let config = MatchConfig {
            explode_combinations: true,
            use_exploded: true,
            ..MatchConfig::default()
        };
        let engine = MatchEngine::new(config, None).unwrap();
        let left_raw: Vec<RawDrugRecord> = left
            .iter()
            .enumerate()
            .map(|(idx, name)| RawDrugRecord::new(format!("L{idx}"), name.as_str()))
            .collect();
        let right_raw: Vec<RawDrugRecord> = right
            .iter()
            .enumerate()
            .map(|(idx, name)| RawDrugRecord::new(format!("R{idx}"), name.as_str()))
            .collect();
        let report = engine.run_raw(left_raw.clone(), right_raw).unwrap();
        let mut left_ids = BTreeSet::new();
        for overlap in &report.overlaps {
            let parent = left_raw.iter().find(|raw| raw.source_id == overlap.left_id);
            prop_assert!(parent.is_some());
            if let Some(parent) = parent {
                prop_assert_eq!(&overlap.left_name, &parent.raw_name);
            }
            prop_assert!(left_ids.insert(overlap.left_id.clone()));
        }
    }
}
