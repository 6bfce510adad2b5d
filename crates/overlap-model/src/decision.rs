//! Match decisions and the confirmed overlap rows built from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::DrugRecord;
use crate::scores::{CandidatePair, SimilarityScores};

/// Which rule confirmed a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    /// Byte-identical normalized names.
    Exact,
    /// Both records carry the same RxNorm concept id.
    Identifier,
    /// The synonym table maps one name onto the other.
    Synonym,
    /// The multi-signal consensus rule.
    FuzzyConsensus,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "EXACT",
            Self::Identifier => "IDENTIFIER",
            Self::Synonym => "SYNONYM",
            Self::FuzzyConsensus => "FUZZY_CONSENSUS",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the consensus matcher for one candidate pair.
///
/// Rejected pairs carry [`MatchType::FuzzyConsensus`], the rule that
/// rejected them.
#[derive(Debug, Clone, Copy)]
pub struct MatchDecision<'a> {
    pub pair: CandidatePair<'a>,
    pub is_match: bool,
    pub match_type: MatchType,
}

impl<'a> MatchDecision<'a> {
    pub fn accept(pair: CandidatePair<'a>, match_type: MatchType) -> Self {
        Self {
            pair,
            is_match: true,
            match_type,
        }
    }

    pub fn reject(pair: CandidatePair<'a>) -> Self {
        Self {
            pair,
            is_match: false,
            match_type: MatchType::FuzzyConsensus,
        }
    }
}

/// One confirmed one-to-one match between the two lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapRecord {
    pub left_id: String,
    pub right_id: String,
    /// Raw name of the left record (the parent, in exploded mode).
    pub left_name: String,
    pub right_name: String,
    /// Constituent that produced the match, in exploded mode.
    pub left_component: Option<String>,
    pub match_type: MatchType,
    pub jaro_winkler: f64,
    pub jaccard: f64,
    pub token_ratio: f64,
    pub edit_ratio: f64,
    pub left_approval_date: Option<NaiveDate>,
    pub right_approval_date: Option<NaiveDate>,
    pub left_indication: Option<String>,
    pub right_indication: Option<String>,
}

impl OverlapRecord {
    /// Builds the overlap row for `decision`, attributed to `left` and `right`.
    ///
    /// `left` must be the original record the pair is attributed to, not an
    /// exploded constituent.
    pub fn new(left: &DrugRecord, right: &DrugRecord, decision: &MatchDecision<'_>) -> Self {
        let SimilarityScores {
            jaro_winkler,
            jaccard,
            token_ratio,
            edit_ratio,
        } = decision.pair.scores;
        let left_component = decision
            .pair
            .is_exploded()
            .then(|| decision.pair.left.normalized_name().to_string());
        Self {
            left_id: left.source_id().to_string(),
            right_id: right.source_id().to_string(),
            left_name: left.raw_name().to_string(),
            right_name: right.raw_name().to_string(),
            left_component,
            match_type: decision.match_type,
            jaro_winkler,
            jaccard,
            token_ratio,
            edit_ratio,
            left_approval_date: left.approval_date(),
            right_approval_date: right.approval_date(),
            left_indication: left.indication().map(str::to_string),
            right_indication: right.indication().map(str::to_string),
        }
    }

    pub fn scores(&self) -> SimilarityScores {
        SimilarityScores {
            jaro_winkler: self.jaro_winkler,
            jaccard: self.jaccard,
            token_ratio: self.token_ratio,
            edit_ratio: self.edit_ratio,
        }
    }
}
