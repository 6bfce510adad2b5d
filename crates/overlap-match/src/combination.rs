//! Combination names and their constituents.
//!
//! The `+` marker left by the normalizer always separates constituents. The
//! conjunctions `and` and `with` are ambiguous ("folinic acid and calcium" is
//! one substance), so with a [`Vocabulary`] they only split a name when every
//! piece closely matches a known drug name. Without a vocabulary they split
//! unconditionally.

use std::collections::BTreeSet;

use overlap_model::{COMBINATION_MARKER, DrugRecord, ExplodedDrugRecord};
use tracing::trace;

use crate::score::jaro_winkler_similarity;

/// Minimum Jaro-Winkler similarity for a piece to count as a known drug name.
pub const VOCABULARY_MATCH_THRESHOLD: f64 = 0.9;

/// Constituents scoring below this against every vocabulary term are dropped.
pub const FRAGMENT_FILTER_THRESHOLD: f64 = 0.8;

const CONJUNCTIONS: [&str; 2] = ["and", "with"];

/// Combinations known under a single name, keyed by normalized form.
const KNOWN_COMBINATIONS: [(&str, &str); 3] = [
    ("folinic acid and calcium", "calcium folinate"),
    ("folinic acid with calcium", "calcium folinate"),
    ("folinic acid + calcium", "calcium folinate"),
];

/// Normalized drug names that constituents are checked against.
///
/// Built from the right-hand list: every normalized name plus each of its
/// `+`-separated constituents.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: BTreeSet<String>,
}

impl Vocabulary {
    pub fn from_records(records: &[DrugRecord]) -> Self {
        Self::from_names(records.iter().map(DrugRecord::normalized_name))
    }

    /// Builds a vocabulary from already-normalized names. Empty names are skipped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            terms.extend(marker_segments(name).into_iter().map(str::to_string));
            terms.insert(name.to_string());
        }
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Closest term by Jaro-Winkler similarity; ties keep the first term.
    pub fn best_match(&self, term: &str) -> Option<(&str, f64)> {
        if term.is_empty() {
            return None;
        }
        if let Some(exact) = self.terms.get(term) {
            return Some((exact.as_str(), 1.0));
        }
        let mut best: Option<(&str, f64)> = None;
        for candidate in &self.terms {
            let similarity = jaro_winkler_similarity(term, candidate);
            if best.is_none_or(|(_, current)| similarity > current) {
                best = Some((candidate.as_str(), similarity));
            }
        }
        best
    }

    fn recognizes(&self, term: &str, threshold: f64) -> bool {
        self.best_match(term)
            .is_some_and(|(_, similarity)| similarity >= threshold)
    }
}

/// Splits normalized names into constituents.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombinationSplitter<'v> {
    vocabulary: Option<&'v Vocabulary>,
}

impl<'v> CombinationSplitter<'v> {
    /// An empty vocabulary checks nothing and behaves like no vocabulary.
    pub fn new(vocabulary: Option<&'v Vocabulary>) -> Self {
        Self {
            vocabulary: vocabulary.filter(|vocabulary| !vocabulary.is_empty()),
        }
    }

    pub fn with_vocabulary(vocabulary: &'v Vocabulary) -> Self {
        Self::new(Some(vocabulary))
    }

    pub fn vocabulary(&self) -> Option<&'v Vocabulary> {
        self.vocabulary
    }

    /// Constituents of a normalized name.
    ///
    /// A name without delimiters, or one that yields a single unchanged
    /// constituent, comes back as a singleton of itself, so exploding a
    /// constituent again is a no-op. Duplicates are dropped, keeping first
    /// occurrence order.
    ///
    /// With a vocabulary, known combinations collapse to their single name,
    /// conjunctions split only between recognized pieces, and constituents
    /// matching no vocabulary term are dropped (unless that would drop all
    /// of them).
    pub fn explode(&self, normalized_name: &str) -> Vec<String> {
        let Some(vocabulary) = self.vocabulary else {
            return split_unchecked(normalized_name);
        };
        if let Some(canonical) = known_combination(normalized_name, vocabulary) {
            return vec![canonical.to_string()];
        }

        let mut parts = Vec::new();
        for segment in marker_segments(normalized_name) {
            if let Some(canonical) = known_combination(segment, vocabulary) {
                push_unique(&mut parts, canonical.to_string());
                continue;
            }
            for piece in split_conjunctions(segment, vocabulary) {
                push_unique(&mut parts, piece);
            }
        }
        if parts.len() <= 1 {
            return vec![normalized_name.to_string()];
        }

        let (kept, dropped): (Vec<String>, Vec<String>) = parts
            .into_iter()
            .partition(|part| vocabulary.recognizes(part, FRAGMENT_FILTER_THRESHOLD));
        if !dropped.is_empty() {
            trace!(name = normalized_name, ?dropped, "dropped unrecognized constituents");
        }
        if kept.is_empty() {
            return vec![normalized_name.to_string()];
        }
        kept
    }

    /// True when [`CombinationSplitter::explode`] yields several constituents.
    pub fn is_combination(&self, normalized_name: &str) -> bool {
        self.explode(normalized_name).len() > 1
    }

    /// Expands a record into one child per constituent.
    ///
    /// Atomic names yield a single child carrying the whole name. Empty names
    /// yield nothing.
    pub fn explode_record(&self, record: &DrugRecord) -> Vec<ExplodedDrugRecord> {
        if record.is_empty() {
            return Vec::new();
        }
        self.explode(record.normalized_name())
            .iter()
            .enumerate()
            .map(|(idx, part)| ExplodedDrugRecord::new(record, idx, part))
            .collect()
    }
}

/// Splits a normalized combination name on `+`, `and` and `with`.
///
/// See [`CombinationSplitter::explode`]; this is the splitter without a
/// vocabulary.
pub fn explode(normalized_name: &str) -> Vec<String> {
    CombinationSplitter::default().explode(normalized_name)
}

/// True when [`explode`] would split the name into several constituents.
pub fn is_combination(normalized_name: &str) -> bool {
    CombinationSplitter::default().is_combination(normalized_name)
}

/// Expands a record with the vocabulary-free splitter.
pub fn explode_record(record: &DrugRecord) -> Vec<ExplodedDrugRecord> {
    CombinationSplitter::default().explode_record(record)
}

fn split_unchecked(normalized_name: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for token in normalized_name.split_whitespace() {
        if token == COMBINATION_MARKER || CONJUNCTIONS.contains(&token) {
            flush(&mut parts, &mut current);
        } else {
            current.push(token);
        }
    }
    flush(&mut parts, &mut current);
    if parts.len() <= 1 {
        return vec![normalized_name.to_string()];
    }
    parts
}

/// Splits a `+`-free segment at conjunctions when every piece is recognized.
fn split_conjunctions(segment: &str, vocabulary: &Vocabulary) -> Vec<String> {
    let tokens: Vec<&str> = segment.split_whitespace().collect();
    if !tokens.iter().any(|token| CONJUNCTIONS.contains(token)) {
        return vec![segment.to_string()];
    }
    if vocabulary.recognizes(segment, VOCABULARY_MATCH_THRESHOLD) {
        return vec![segment.to_string()];
    }
    let pieces: Vec<String> = tokens
        .split(|token| CONJUNCTIONS.contains(token))
        .filter(|piece| !piece.is_empty())
        .map(|piece| piece.join(" "))
        .collect();
    let recognized = pieces.len() > 1
        && pieces
            .iter()
            .all(|piece| vocabulary.recognizes(piece, VOCABULARY_MATCH_THRESHOLD));
    if recognized {
        pieces
    } else {
        vec![segment.to_string()]
    }
}

/// Single name of a known combination, when the vocabulary contains it.
fn known_combination(name: &str, vocabulary: &Vocabulary) -> Option<&'static str> {
    KNOWN_COMBINATIONS
        .iter()
        .find(|(combination, canonical)| *combination == name && vocabulary.contains(canonical))
        .map(|(_, canonical)| *canonical)
}

fn marker_segments(name: &str) -> Vec<&str> {
    name.split(COMBINATION_MARKER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn flush(parts: &mut Vec<String>, current: &mut Vec<&str>) {
    if current.is_empty() {
        return;
    }
    let part = current.join(" ");
    current.clear();
    push_unique(parts, part);
}

fn push_unique(parts: &mut Vec<String>, part: String) {
    if !parts.contains(&part) {
        parts.push(part);
    }
}
