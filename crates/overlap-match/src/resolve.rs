//! One-to-one assignment of accepted matches.
//!
//! Greedy by descending confidence: accepted decisions are ranked by
//! Jaro-Winkler, then Jaccard, token ratio and edit ratio. Equal scores fall
//! back to the attributed left source id, the right source id and finally the
//! left unit id, all ascending, so the order is total. Walking the ranked list,
//! a decision is kept only when neither its left nor its right record has been
//! claimed yet. Exploded constituents claim their parent record.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use overlap_model::{DrugRecord, MatchDecision, OverlapRecord, Side};
use tracing::debug;

use crate::error::{MatchError, Result};

/// Ranking used by the resolver: best first.
pub fn rank_cmp(a: &MatchDecision<'_>, b: &MatchDecision<'_>) -> Ordering {
    b.pair
        .scores
        .rank_cmp(&a.pair.scores)
        .then_with(|| a.pair.attributed_left_id().cmp(b.pair.attributed_left_id()))
        .then_with(|| a.pair.right.source_id().cmp(b.pair.right.source_id()))
        .then_with(|| a.pair.left.source_id().cmp(b.pair.left.source_id()))
}

/// Resolves accepted decisions against the original datasets.
#[derive(Debug, Clone)]
pub struct AssignmentResolver<'r> {
    left: BTreeMap<&'r str, &'r DrugRecord>,
    right: BTreeMap<&'r str, &'r DrugRecord>,
}

impl<'r> AssignmentResolver<'r> {
    /// Indexes both datasets by source id.
    ///
    /// Fails when either dataset repeats a source id.
    pub fn new(left: &'r [DrugRecord], right: &'r [DrugRecord]) -> Result<Self> {
        Ok(Self {
            left: index_by_id(left, Side::Left)?,
            right: index_by_id(right, Side::Right)?,
        })
    }

    /// Picks a conflict-free subset of the accepted decisions.
    ///
    /// Rejected decisions are ignored. The output follows rank order and no
    /// left or right source id appears in it twice. A decision pointing at a
    /// record that is not in the datasets is an error.
    pub fn resolve(&self, decisions: &[MatchDecision<'_>]) -> Result<Vec<OverlapRecord>> {
        let mut ranked: Vec<&MatchDecision<'_>> =
            decisions.iter().filter(|decision| decision.is_match).collect();
        ranked.sort_by(|a, b| rank_cmp(a, b));

        let mut claimed_left: BTreeSet<&str> = BTreeSet::new();
        let mut claimed_right: BTreeSet<&str> = BTreeSet::new();
        let mut overlaps = Vec::new();

        for decision in ranked {
            let left_id = decision.pair.attributed_left_id();
            let right_id = decision.pair.right.source_id();
            let left = self.lookup(Side::Left, left_id)?;
            let right = self.lookup(Side::Right, right_id)?;

            if claimed_left.contains(left.source_id()) || claimed_right.contains(right.source_id()) {
                debug!(
                    left_id,
                    right_id,
                    match_type = %decision.match_type,
                    "dropping match: record already claimed"
                );
                continue;
            }
            claimed_left.insert(left.source_id());
            claimed_right.insert(right.source_id());
            overlaps.push(OverlapRecord::new(left, right, decision));
        }
        Ok(overlaps)
    }

    fn lookup(&self, side: Side, id: &str) -> Result<&'r DrugRecord> {
        let records = match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        };
        records
            .get(id)
            .copied()
            .ok_or_else(|| MatchError::UnknownRecord {
                side,
                id: id.to_string(),
            })
    }
}

fn index_by_id(records: &[DrugRecord], side: Side) -> Result<BTreeMap<&str, &DrugRecord>> {
    let mut index = BTreeMap::new();
    for record in records {
        if index.insert(record.source_id(), record).is_some() {
            return Err(MatchError::DuplicateSourceId {
                side,
                id: record.source_id().to_string(),
            });
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlap_model::{CandidatePair, MatchType, SimilarityScores};

    fn record(id: &str, name: &str) -> DrugRecord {
        DrugRecord::new(id, name, name.to_lowercase())
    }

    fn scores(jw: f64, jaccard: f64) -> SimilarityScores {
        SimilarityScores {
            jaro_winkler: jw,
            jaccard,
            token_ratio: 90.0,
            edit_ratio: 90.0,
        }
    }

    fn accepted<'a>(
        left: &'a DrugRecord,
        right: &'a DrugRecord,
        scores: SimilarityScores,
    ) -> MatchDecision<'a> {
        MatchDecision::accept(
            CandidatePair::new(left, right, scores),
            MatchType::FuzzyConsensus,
        )
    }

    #[test]
    fn greedy_keeps_best_pair_per_record() {
        let left = vec![record("L1", "a"), record("L2", "b")];
        let right = vec![record("R1", "x"), record("R2", "y")];
        let resolver = AssignmentResolver::new(&left, &right).unwrap();
        let decisions = vec![
            accepted(&left[0], &right[0], scores(0.90, 0.5)),
            accepted(&left[0], &right[1], scores(0.95, 0.5)),
            accepted(&left[1], &right[1], scores(0.93, 0.5)),
            accepted(&left[1], &right[0], scores(0.88, 0.5)),
        ];
        let overlaps = resolver.resolve(&decisions).unwrap();
        let pairs: Vec<(&str, &str)> = overlaps
            .iter()
            .map(|o| (o.left_id.as_str(), o.right_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("L1", "R2"), ("L2", "R1")]);
    }

    #[test]
    fn ties_resolve_by_source_id() {
        let left = vec![record("L2", "a"), record("L1", "a")];
        let right = vec![record("R1", "a")];
        let resolver = AssignmentResolver::new(&left, &right).unwrap();
        let decisions = vec![
            accepted(&left[0], &right[0], scores(0.9, 0.5)),
            accepted(&left[1], &right[0], scores(0.9, 0.5)),
        ];
        let overlaps = resolver.resolve(&decisions).unwrap();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].left_id, "L1");
    }

    #[test]
    fn rejected_decisions_are_ignored() {
        let left = vec![record("L1", "a")];
        let right = vec![record("R1", "b")];
        let resolver = AssignmentResolver::new(&left, &right).unwrap();
        let decisions = vec![MatchDecision::reject(CandidatePair::new(
            &left[0],
            &right[0],
            scores(0.99, 1.0),
        ))];
        assert!(resolver.resolve(&decisions).unwrap().is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let left = vec![record("L1", "a"), record("L1", "b")];
        let right = vec![record("R1", "a")];
        let err = AssignmentResolver::new(&left, &right).unwrap_err();
        assert!(matches!(
            err,
            MatchError::DuplicateSourceId { side: Side::Left, .. }
        ));
    }

    #[test]
    fn unknown_record_is_fatal() {
        let left = vec![record("L1", "a")];
        let right = vec![record("R1", "a")];
        let stranger = record("L9", "a");
        let resolver = AssignmentResolver::new(&left, &right).unwrap();
        let decisions = vec![accepted(&stranger, &right[0], scores(1.0, 1.0))];
        let err = resolver.resolve(&decisions).unwrap_err();
        assert!(matches!(err, MatchError::UnknownRecord { side: Side::Left, ref id } if id == "L9"));
    }

    #[test]
    fn exploded_children_claim_their_parent() {
        let parent = record("L1", "a + b");
        let left = vec![parent.clone()];
        let right = vec![record("R1", "a"), record("R2", "b")];
        let child_a = overlap_model::ExplodedDrugRecord::new(&parent, 0, "a");
        let child_b = overlap_model::ExplodedDrugRecord::new(&parent, 1, "b");
        let resolver = AssignmentResolver::new(&left, &right).unwrap();
        let decisions = vec![
            MatchDecision::accept(
                CandidatePair::new(child_a.record(), &right[0], scores(1.0, 1.0))
                    .with_left_parent(Some(child_a.parent_id())),
                MatchType::Exact,
            ),
            MatchDecision::accept(
                CandidatePair::new(child_b.record(), &right[1], scores(1.0, 1.0))
                    .with_left_parent(Some(child_b.parent_id())),
                MatchType::Exact,
            ),
        ];
        let overlaps = resolver.resolve(&decisions).unwrap();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].left_id, "L1");
        assert_eq!(overlaps[0].left_name, "a + b");
        assert_eq!(overlaps[0].left_component.as_deref(), Some("a"));
    }
}
