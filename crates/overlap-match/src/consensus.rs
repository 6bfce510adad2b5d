//! Consensus matcher: turns a scored candidate pair into a match decision.
//!
//! Rules, first hit wins:
//! 1. byte-identical normalized names -> [`MatchType::Exact`]
//! 2. same RxNorm id on both sides -> [`MatchType::Identifier`]
//! 3. synonym table maps one name onto the other, or the left name's
//!    canonical form passes [`is_high_confidence_match`] -> [`MatchType::Synonym`]
//! 4. [`is_high_confidence_match`] -> [`MatchType::FuzzyConsensus`]
//!
//! Synonym matches found through the canonical form are ranked and reported
//! on the canonical-name scores.
//!
//! A pair with an empty name on either side is always rejected.

use overlap_model::{CandidatePair, MatchDecision, MatchType, SimilarityScores, Thresholds};

use crate::synonyms::SynonymTable;

/// The consensus rule over the four signals.
///
/// Jaro-Winkler and Jaccard must both reach their thresholds; either the
/// token-set ratio or the edit ratio must reach its threshold as well.
/// Thresholds are inclusive.
pub fn is_high_confidence_match(scores: &SimilarityScores, thresholds: &Thresholds) -> bool {
    let baseline =
        scores.jaro_winkler >= thresholds.jaro_winkler && scores.jaccard >= thresholds.jaccard;
    let corroborated = scores.token_ratio >= f64::from(thresholds.token)
        || scores.edit_ratio >= f64::from(thresholds.edit);
    baseline && corroborated
}

/// Applies the decision rules with fixed thresholds and an optional synonym table.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusMatcher<'s> {
    thresholds: Thresholds,
    synonyms: Option<&'s SynonymTable>,
}

impl<'s> ConsensusMatcher<'s> {
    pub fn new(thresholds: Thresholds, synonyms: Option<&'s SynonymTable>) -> Self {
        Self {
            thresholds,
            synonyms,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Same matcher with different thresholds.
    #[must_use]
    pub fn with_thresholds(self, thresholds: Thresholds) -> Self {
        Self { thresholds, ..self }
    }

    pub fn decide<'a>(&self, pair: CandidatePair<'a>) -> MatchDecision<'a> {
        let left = pair.left;
        let right = pair.right;
        if left.is_empty() || right.is_empty() {
            return MatchDecision::reject(pair);
        }
        if left.normalized_name() == right.normalized_name() {
            return MatchDecision::accept(pair, MatchType::Exact);
        }
        if let (Some(a), Some(b)) = (left.rxcui(), right.rxcui())
            && a == b
        {
            return MatchDecision::accept(pair, MatchType::Identifier);
        }
        if let Some(table) = self.synonyms {
            if table.are_synonyms(left.normalized_name(), right.normalized_name()) {
                return MatchDecision::accept(pair.scored_by_synonym(), MatchType::Synonym);
            }
            if pair
                .synonym_scores
                .is_some_and(|scores| is_high_confidence_match(&scores, &self.thresholds))
            {
                return MatchDecision::accept(pair.scored_by_synonym(), MatchType::Synonym);
            }
        }
        if is_high_confidence_match(&pair.scores, &self.thresholds) {
            return MatchDecision::accept(pair, MatchType::FuzzyConsensus);
        }
        MatchDecision::reject(pair)
    }

    /// Decides every pair, keeping input order.
    pub fn decide_all<'a>(&self, pairs: &[CandidatePair<'a>]) -> Vec<MatchDecision<'a>> {
        pairs.iter().map(|pair| self.decide(*pair)).collect()
    }
}
