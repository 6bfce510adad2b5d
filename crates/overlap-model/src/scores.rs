//! Similarity signals for a candidate pair.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::DrugRecord;

/// The four similarity signals computed for every candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimilarityScores {
    /// Jaro-Winkler similarity over normalized names (0.0 to 1.0).
    pub jaro_winkler: f64,
    /// Jaccard similarity of token sets (0.0 to 1.0).
    pub jaccard: f64,
    /// Token-set ratio (0 to 100).
    pub token_ratio: f64,
    /// Edit-distance ratio (0 to 100).
    pub edit_ratio: f64,
}

impl SimilarityScores {
    /// Scores assigned to pairs involving an empty name.
    pub const NONE: Self = Self {
        jaro_winkler: 0.0,
        jaccard: 0.0,
        token_ratio: 0.0,
        edit_ratio: 0.0,
    };

    /// Compares by confidence: Jaro-Winkler first, then Jaccard, token ratio
    /// and edit ratio.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.jaro_winkler
            .total_cmp(&other.jaro_winkler)
            .then_with(|| self.jaccard.total_cmp(&other.jaccard))
            .then_with(|| self.token_ratio.total_cmp(&other.token_ratio))
            .then_with(|| self.edit_ratio.total_cmp(&other.edit_ratio))
    }
}

/// A scored pairing of one left unit against one right record.
///
/// `left` is either an original left record or, in exploded mode, one of its
/// constituents; `left_parent` then names the original record the match is
/// attributed to.
///
/// When the synonym table maps the left name onto a canonical name,
/// `synonym_scores` holds the scores of that canonical name against `right`.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePair<'a> {
    pub left: &'a DrugRecord,
    pub right: &'a DrugRecord,
    pub left_parent: Option<&'a str>,
    pub scores: SimilarityScores,
    pub synonym_scores: Option<SimilarityScores>,
}

impl<'a> CandidatePair<'a> {
    pub fn new(left: &'a DrugRecord, right: &'a DrugRecord, scores: SimilarityScores) -> Self {
        Self {
            left,
            right,
            left_parent: None,
            scores,
            synonym_scores: None,
        }
    }

    #[must_use]
    pub fn with_left_parent(mut self, parent_id: Option<&'a str>) -> Self {
        self.left_parent = parent_id;
        self
    }

    #[must_use]
    pub fn with_synonym_scores(mut self, scores: Option<SimilarityScores>) -> Self {
        self.synonym_scores = scores;
        self
    }

    /// The same pair ranked and reported on its canonical-name scores.
    ///
    /// Pairs without synonym scores are returned unchanged.
    #[must_use]
    pub fn scored_by_synonym(mut self) -> Self {
        if let Some(scores) = self.synonym_scores {
            self.scores = scores;
        }
        self
    }

    /// Source id that claims the left side of this pair.
    pub fn attributed_left_id(&self) -> &'a str {
        self.left_parent.unwrap_or_else(|| self.left.source_id())
    }

    /// True when the left side is an exploded constituent.
    pub fn is_exploded(&self) -> bool {
        self.left_parent.is_some()
    }
}
