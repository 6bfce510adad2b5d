//! Similarity signals for candidate pairs.
//!
//! Every candidate pair gets all four signals:
//! - Jaro-Winkler over normalized names (prefix-weighted, suits shared stems)
//! - Jaccard over token sets
//! - Token-set ratio (order and duplication insensitive)
//! - Edit ratio (normalized Indel similarity, tolerant of typos)
//!
//! All functions are pure and symmetric in their arguments. A pair with an
//! empty name on either side scores zero on every signal.

use std::collections::BTreeSet;

use overlap_model::{DrugRecord, SimilarityScores};
use rapidfuzz::distance::{indel, jaro_winkler};

/// Scores a pair on all four signals.
pub fn score(left: &DrugRecord, right: &DrugRecord) -> SimilarityScores {
    if left.is_empty() || right.is_empty() {
        return SimilarityScores::NONE;
    }
    SimilarityScores {
        jaro_winkler: jaro_winkler_similarity(left.normalized_name(), right.normalized_name()),
        jaccard: jaccard(left.token_set(), right.token_set()),
        token_ratio: token_set_ratio(left.token_set(), right.token_set()),
        edit_ratio: edit_ratio(left.normalized_name(), right.normalized_name()),
    }
}

/// Jaro-Winkler similarity in [0, 1]. Zero when either side is empty.
pub fn jaro_winkler_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    jaro_winkler::similarity(a.chars(), b.chars())
}

/// |A ∩ B| / |A ∪ B| in [0, 1]. Zero when either set is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    shared as f64 / union as f64
}

/// Normalized Indel similarity scaled to [0, 100]. Zero when either side is empty.
pub fn edit_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    indel::normalized_similarity(a.chars(), b.chars()) * 100.0
}

/// Token-set ratio in [0, 100].
///
/// Both sides are reduced to sorted, de-duplicated token sets. A shared core
/// with nothing left over on one side scores 100. Otherwise the best of three
/// comparisons wins: the two leftover strings against each other, and the
/// shared core against the core extended by each side's leftovers.
pub fn token_set_ratio(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared: Vec<&str> = a.intersection(b).map(String::as_str).collect();
    let only_a: Vec<&str> = a.difference(b).map(String::as_str).collect();
    let only_b: Vec<&str> = b.difference(a).map(String::as_str).collect();

    if !shared.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let rest_a = only_a.join(" ");
    let rest_b = only_b.join(" ");
    let mut best = indel::normalized_similarity(rest_a.chars(), rest_b.chars()) * 100.0;
    if shared.is_empty() {
        return best;
    }

    // The core and core+leftovers differ by the separator plus the leftovers.
    let core_len = shared.join(" ").chars().count();
    for rest in [&rest_a, &rest_b] {
        let rest_len = rest.chars().count();
        let distance = (1 + rest_len) as f64;
        let total = (2 * core_len + 1 + rest_len) as f64;
        best = best.max(100.0 * (1.0 - distance / total));
    }
    best
}
