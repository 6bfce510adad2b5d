//! Synonym table: an injected mapping from variant names to canonical names.
//!
//! Keys and values are normalized on construction with the same
//! [`Normalizer`] the engine uses, so lookups compare normalized forms.

use std::collections::{BTreeMap, BTreeSet};

use crate::normalize::Normalizer;
use crate::score::token_set_ratio;

/// Default minimum token-set ratio for suggested synonyms.
pub const DEFAULT_SUGGESTION_RATIO: f64 = 85.0;

/// Read-only variant -> canonical name mapping.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    canonical: BTreeMap<String, String>,
    variants: BTreeMap<String, BTreeSet<String>>,
}

impl SynonymTable {
    /// Builds a table from raw `(variant, canonical)` pairs.
    ///
    /// Entries whose key or value normalizes to an empty string, or that map a
    /// name onto itself, are skipped. A later entry for the same variant
    /// replaces an earlier one.
    pub fn from_pairs<I, K, V>(pairs: I, normalizer: &Normalizer) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut canonical = BTreeMap::new();
        for (variant, target) in pairs {
            let variant = normalizer.normalize(variant.as_ref());
            let target = normalizer.normalize(target.as_ref());
            if variant.is_empty() || target.is_empty() || variant == target {
                continue;
            }
            canonical.insert(variant, target);
        }
        let mut variants: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (variant, target) in &canonical {
            variants
                .entry(target.clone())
                .or_default()
                .insert(variant.clone());
        }
        Self {
            canonical,
            variants,
        }
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Canonical name for a normalized variant.
    pub fn canonical(&self, normalized_name: &str) -> Option<&str> {
        self.canonical.get(normalized_name).map(String::as_str)
    }

    /// Normalized variants mapping onto `canonical`.
    pub fn variants_of<'a>(&'a self, canonical: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.variants
            .get(canonical)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// True when either name maps onto the other.
    pub fn are_synonyms(&self, a: &str, b: &str) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }
        self.canonical(a) == Some(b) || self.canonical(b) == Some(a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.canonical
            .iter()
            .map(|(variant, target)| (variant.as_str(), target.as_str()))
    }
}

/// Suggests synonym entries for names that found no match.
///
/// Each unmatched name is mapped to the canonical name with the highest
/// token-set ratio when that ratio reaches `min_ratio`. Ties keep the
/// lexicographically first canonical name. Names that normalize to an empty
/// string, or whose best candidate is the name itself, are skipped.
pub fn suggest_synonyms<U, C>(
    unmatched: &[U],
    canonical: &[C],
    normalizer: &Normalizer,
    min_ratio: f64,
) -> BTreeMap<String, String>
where
    U: AsRef<str>,
    C: AsRef<str>,
{
    let targets: BTreeMap<String, BTreeSet<String>> = canonical
        .iter()
        .map(|name| normalizer.tokenize(name.as_ref()))
        .filter(|(name, _)| !name.is_empty())
        .collect();

    let mut suggestions = BTreeMap::new();
    for name in unmatched {
        let (variant, tokens) = normalizer.tokenize(name.as_ref());
        if variant.is_empty() {
            continue;
        }
        let mut best: Option<(&str, f64)> = None;
        for (target, target_tokens) in &targets {
            let ratio = token_set_ratio(&tokens, target_tokens);
            if best.is_none_or(|(_, current)| ratio > current) {
                best = Some((target.as_str(), ratio));
            }
        }
        if let Some((target, ratio)) = best
            && ratio >= min_ratio
            && target != variant
        {
            suggestions.insert(variant, target.to_string());
        }
    }
    suggestions
}
