//! Threshold sweep.
//!
//! Candidate pairs are scored once; every grid point only re-runs the
//! consensus matcher and the resolver over the same score set.

use std::collections::BTreeSet;

use overlap_model::{ConfigError, DrugRecord, Thresholds};
use tracing::{debug, info_span};

use crate::consensus::ConsensusMatcher;
use crate::engine::MatchEngine;
use crate::error::Result;
use crate::resolve::AssignmentResolver;

pub const DEFAULT_JARO_WINKLER_GRID: [f64; 5] = [0.70, 0.80, 0.85, 0.90, 0.95];
pub const DEFAULT_JACCARD_GRID: [f64; 3] = [0.10, 0.30, 0.50];

/// Jaro-Winkler x Jaccard combinations to evaluate.
///
/// Token and edit thresholds stay at the engine's configured values.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepGrid {
    pub jaro_winkler: Vec<f64>,
    pub jaccard: Vec<f64>,
}

impl Default for SweepGrid {
    fn default() -> Self {
        Self {
            jaro_winkler: DEFAULT_JARO_WINKLER_GRID.to_vec(),
            jaccard: DEFAULT_JACCARD_GRID.to_vec(),
        }
    }
}

impl SweepGrid {
    pub fn new(jaro_winkler: Vec<f64>, jaccard: Vec<f64>) -> Self {
        Self {
            jaro_winkler,
            jaccard,
        }
    }

    /// Every grid point applied on top of `base`, Jaro-Winkler major.
    ///
    /// Each combination is validated like any other threshold set.
    pub fn thresholds(&self, base: &Thresholds) -> std::result::Result<Vec<Thresholds>, ConfigError> {
        let mut points = Vec::with_capacity(self.jaro_winkler.len() * self.jaccard.len());
        for &jaro_winkler in &self.jaro_winkler {
            for &jaccard in &self.jaccard {
                let point = Thresholds {
                    jaro_winkler,
                    jaccard,
                    ..*base
                };
                point.validate()?;
                points.push(point);
            }
        }
        Ok(points)
    }
}

/// Outcome of one grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    pub thresholds: Thresholds,
    /// Pairs accepted by the consensus matcher before assignment.
    pub passing_pairs: usize,
    /// Overlaps after one-to-one assignment.
    pub total_matches: usize,
    /// Distinct left raw names among the overlaps.
    pub unique_left: usize,
    /// Distinct right raw names among the overlaps.
    pub unique_right: usize,
}

impl MatchEngine<'_> {
    /// Evaluates every grid point over a single scoring pass.
    pub fn sweep(
        &self,
        left: &[DrugRecord],
        right: &[DrugRecord],
        grid: &SweepGrid,
    ) -> Result<Vec<SweepRow>> {
        let points = grid.thresholds(&self.config().thresholds)?;
        let resolver = AssignmentResolver::new(left, right)?;
        let vocabulary = self.vocabulary(right);
        let index = self.build_index(right, vocabulary.as_ref());
        let exploded = self.explode_left(left, &index);
        let units = self.units(left, &exploded);
        let pairs = self.score_candidates(&units, right, &index);

        let base = ConsensusMatcher::new(self.config().thresholds, self.synonyms());
        let mut rows = Vec::with_capacity(points.len());
        for thresholds in points {
            let _span = info_span!(
                "sweep",
                jaro_winkler = thresholds.jaro_winkler,
                jaccard = thresholds.jaccard
            )
            .entered();
            let decisions = base.with_thresholds(thresholds).decide_all(&pairs);
            let passing_pairs = decisions.iter().filter(|decision| decision.is_match).count();
            let overlaps = resolver.resolve(&decisions)?;
            let unique_left: BTreeSet<&str> =
                overlaps.iter().map(|o| o.left_name.as_str()).collect();
            let unique_right: BTreeSet<&str> =
                overlaps.iter().map(|o| o.right_name.as_str()).collect();
            debug!(passing_pairs, overlaps = overlaps.len(), "evaluated grid point");
            rows.push(SweepRow {
                thresholds,
                passing_pairs,
                total_matches: overlaps.len(),
                unique_left: unique_left.len(),
                unique_right: unique_right.len(),
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlap_model::{MatchConfig, RawDrugRecord};

    #[test]
    fn default_grid_has_fifteen_points() {
        let points = SweepGrid::default()
            .thresholds(&Thresholds::default())
            .unwrap();
        assert_eq!(points.len(), 15);
        assert_eq!(points[0].jaro_winkler, 0.70);
        assert_eq!(points[0].jaccard, 0.10);
        assert_eq!(points[14].jaro_winkler, 0.95);
        assert_eq!(points[14].jaccard, 0.50);
        assert!(points.iter().all(|p| p.token == 80 && p.edit == 80));
    }

    #[test]
    fn invalid_grid_point_fails() {
        let grid = SweepGrid::new(vec![0.9], vec![-0.1]);
        assert!(grid.thresholds(&Thresholds::default()).is_err());
    }

    #[test]
    fn looser_grid_points_never_pass_fewer_pairs() {
        let engine = MatchEngine::new(MatchConfig::default(), None).unwrap();
        let left = engine.normalize(vec![
            RawDrugRecord::new("L1", "Paclitaxel"),
            RawDrugRecord::new("L2", "Docetaxel"),
            RawDrugRecord::new("L3", "Imatinib Mesylate"),
        ]);
        let right = engine.normalize(vec![
            RawDrugRecord::new("R1", "paclitaxel injection"),
            RawDrugRecord::new("R2", "doxorubicin"),
            RawDrugRecord::new("R3", "imatinib"),
        ]);
        let grid = SweepGrid::new(vec![0.70, 0.95], vec![0.10, 0.50]);
        let rows = engine.sweep(&left, &right, &grid).unwrap();
        assert_eq!(rows.len(), 4);
        // (0.70, 0.10) is the loosest point, (0.95, 0.50) the strictest.
        assert!(rows[0].passing_pairs >= rows[3].passing_pairs);
        assert!(rows.iter().all(|row| row.total_matches <= row.passing_pairs));
    }
}
