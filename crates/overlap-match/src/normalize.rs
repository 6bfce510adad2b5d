//! Drug name normalization and combination explosion.
//!
//! Normalization lowercases, folds accents, removes punctuation (internal
//! hyphens survive) and collapses whitespace. Combination delimiters (`+`,
//! `/`, `&`) become a standalone [`COMBINATION_MARKER`] token so that
//! [`explode`](crate::combination::explode) can still split the name
//! afterwards. Bracketed text is taken out before punctuation goes: short
//! abbreviations such as `(ABC/3TC)` are dropped and anything else becomes a
//! constituent of its own. Salt, dosage-form and strength suffixes are
//! stripped only when configured.

use std::collections::BTreeSet;

use overlap_model::{COMBINATION_MARKER, DrugRecord, MatchConfig, RawDrugRecord};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Bracketed text with at most this many alphanumerics is an abbreviation.
const ABBREVIATION_MAX_LEN: usize = 5;

/// Trailing tokens removed when suffix stripping is enabled.
const STRIPPABLE_SUFFIXES: &[&str] = &[
    // salts and hydrates
    "hydrochloride",
    "hcl",
    "hydrobromide",
    "sodium",
    "potassium",
    "magnesium",
    "sulfate",
    "sulphate",
    "phosphate",
    "acetate",
    "citrate",
    "maleate",
    "mesylate",
    "besylate",
    "tartrate",
    "fumarate",
    "succinate",
    "bromide",
    "chloride",
    "monohydrate",
    "dihydrate",
    "trihydrate",
    "anhydrous",
    // dosage forms and routes
    "tablet",
    "tablets",
    "capsule",
    "capsules",
    "injection",
    "injectable",
    "infusion",
    "concentrate",
    "cream",
    "ointment",
    "spray",
    "solution",
    "gel",
    "drop",
    "drops",
    "suspension",
    "syrup",
    "powder",
    "lotion",
    "patch",
    "vial",
    "ampoule",
    "sachet",
    "eye",
    "ear",
    "nasal",
    "intranasal",
    "oral",
    "iv",
    "im",
    // strength units
    "mg",
    "mcg",
    "g",
    "ml",
    "iu",
    "w",
    "v",
];

const STRENGTH_UNITS: [&str; 5] = ["mg", "mcg", "g", "ml", "iu"];

/// Normalizes raw drug names into the form every similarity signal runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    strip_suffixes: bool,
}

impl Normalizer {
    pub fn new(strip_suffixes: bool) -> Self {
        Self { strip_suffixes }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(config.strip_suffixes)
    }

    pub fn strips_suffixes(&self) -> bool {
        self.strip_suffixes
    }

    /// Normalizes a raw name. The result is a fixed point of this function.
    pub fn normalize(&self, raw: &str) -> String {
        let folded = fold_characters(&bracket_segments(raw).join(" + "));
        let mut components: Vec<Vec<&str>> = vec![Vec::new()];
        for token in folded.split_whitespace() {
            if token == COMBINATION_MARKER {
                components.push(Vec::new());
                continue;
            }
            let token = token.trim_matches('-');
            if token.is_empty() {
                continue;
            }
            if let Some(current) = components.last_mut() {
                current.push(token);
            }
        }
        let marker = format!(" {COMBINATION_MARKER} ");
        components
            .into_iter()
            .filter(|component| !component.is_empty())
            .map(|mut component| {
                if self.strip_suffixes {
                    strip_trailing_suffixes(&mut component);
                }
                component.join(" ")
            })
            .collect::<Vec<_>>()
            .join(&marker)
    }

    /// Normalizes a raw name and derives its token set.
    pub fn tokenize(&self, raw: &str) -> (String, BTreeSet<String>) {
        let normalized = self.normalize(raw);
        let tokens = overlap_model::record::token_set(&normalized);
        (normalized, tokens)
    }

    pub fn normalize_record(&self, raw: RawDrugRecord) -> DrugRecord {
        let normalized = self.normalize(&raw.raw_name);
        DrugRecord::from_raw(raw, normalized)
    }

    pub fn normalize_all(&self, raw: Vec<RawDrugRecord>) -> Vec<DrugRecord> {
        raw.into_iter()
            .map(|record| self.normalize_record(record))
            .collect()
    }
}

/// Lowercases and folds characters; the output holds only ASCII lowercase
/// alphanumerics, `-`, spaces and spaced combination markers.
fn fold_characters(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for ch in raw.to_lowercase().nfkd() {
        if ch.is_ascii_alphanumeric() {
            folded.push(ch.to_ascii_lowercase());
        } else if ch == '-' {
            folded.push('-');
        } else if matches!(ch, '+' | '/' | '&') {
            folded.push(' ');
            folded.push_str(COMBINATION_MARKER);
            folded.push(' ');
        } else if is_combining_mark(ch) {
            continue;
        } else {
            folded.push(' ');
        }
    }
    folded
}

/// The text outside brackets followed by every kept bracketed group, nested
/// groups flattened in reading order.
fn bracket_segments(raw: &str) -> Vec<String> {
    let (backbone, groups) = extract_brackets(raw);
    let mut segments = vec![backbone];
    for group in groups {
        let mut inner = bracket_segments(&group).into_iter();
        if let Some(head) = inner.next()
            && !is_abbreviation(&head)
        {
            segments.push(head);
        }
        segments.extend(inner);
    }
    segments
}

/// Splits off top-level `(...)` and `[...]` groups. Unbalanced brackets stay
/// in the backbone and are later removed as punctuation.
fn extract_brackets(raw: &str) -> (String, Vec<String>) {
    let mut backbone = String::with_capacity(raw.len());
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for ch in raw.chars() {
        match ch {
            '(' | '[' => {
                if depth > 0 {
                    current.push(ch);
                }
                depth += 1;
            }
            ')' | ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    groups.push(std::mem::take(&mut current).trim().to_string());
                    backbone.push(' ');
                } else {
                    current.push(ch);
                }
            }
            _ if depth > 0 => current.push(ch),
            _ => backbone.push(ch),
        }
    }
    if depth > 0 {
        backbone.push(' ');
        backbone.push_str(&current);
    }
    (backbone, groups)
}

/// Short codes and strengths: `ABC`, `3TC`, `500 mg`.
fn is_abbreviation(text: &str) -> bool {
    let alphanumerics = text.chars().filter(|ch| ch.is_alphanumeric()).count();
    alphanumerics <= ABBREVIATION_MAX_LEN || text.chars().any(|ch| ch.is_ascii_digit())
}

fn strip_trailing_suffixes(component: &mut Vec<&str>) {
    while component.len() > 1 {
        match component.last() {
            Some(token) if is_strippable(token) => {
                component.pop();
            }
            _ => break,
        }
    }
}

fn is_strippable(token: &str) -> bool {
    STRIPPABLE_SUFFIXES.contains(&token) || is_strength(token)
}

/// `500`, `500mg`, `10ml` and the like.
fn is_strength(token: &str) -> bool {
    let digits = token.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return false;
    }
    let unit = &token[digits..];
    unit.is_empty() || STRENGTH_UNITS.contains(&unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("Hello, World!"), "hello world");
        assert_eq!(normalizer.normalize("  Multiple   spaces "), "multiple spaces");
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("Ibuprofen."), "ibuprofen");
    }

    #[test]
    fn keeps_internal_hyphens_only() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("5-Fluorouracil"), "5-fluorouracil");
        assert_eq!(normalizer.normalize("- Co-trimoxazole -"), "co-trimoxazole");
        assert_eq!(normalizer.normalize("abc- def"), "abc def");
    }

    #[test]
    fn folds_accents() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("Hémoglobine"), "hemoglobine");
        assert_eq!(normalizer.normalize("NAÏVE"), "naive");
    }

    #[test]
    fn canonicalizes_combination_delimiters() {
        let normalizer = Normalizer::default();
        assert_eq!(
            normalizer.normalize("Amoxicillin/Clavulanic Acid"),
            "amoxicillin + clavulanic acid"
        );
        assert_eq!(
            normalizer.normalize("Paracetamol & Caffeine"),
            "paracetamol + caffeine"
        );
        assert_eq!(normalizer.normalize("+ Aspirin ++"), "aspirin");
    }

    #[test]
    fn strips_suffixes_only_when_configured() {
        let plain = Normalizer::default();
        let stripping = Normalizer::new(true);
        assert_eq!(
            plain.normalize("Paclitaxel Injection"),
            "paclitaxel injection"
        );
        assert_eq!(stripping.normalize("Paclitaxel Injection"), "paclitaxel");
        assert_eq!(
            stripping.normalize("Metformin Hydrochloride Tablets 500 mg"),
            "metformin"
        );
        assert_eq!(stripping.normalize("Imatinib Mesylate 400mg"), "imatinib");
    }

    #[test]
    fn stripping_keeps_lone_token() {
        let stripping = Normalizer::new(true);
        assert_eq!(stripping.normalize("Sodium"), "sodium");
        assert_eq!(stripping.normalize("Sodium Chloride"), "sodium");
    }

    #[test]
    fn stripping_applies_per_constituent() {
        let stripping = Normalizer::new(true);
        assert_eq!(
            stripping.normalize("Abacavir Sulfate / Lamivudine Tablets"),
            "abacavir + lamivudine"
        );
    }

    #[test]
    fn tokenize_returns_token_set() {
        let (name, tokens) = Normalizer::default().tokenize("Drug A + B");
        assert_eq!(name, "drug a + b");
        let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
        assert_eq!(tokens, vec!["a", "b", "drug"]);
    }

    #[test]
    fn drops_bracketed_abbreviations() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("(R)-Ibuprofen"), "ibuprofen");
        assert_eq!(
            normalizer.normalize("Abacavir/Lamivudine (ABC/3TC)"),
            "abacavir + lamivudine"
        );
        assert_eq!(normalizer.normalize("Paclitaxel [100 mg]"), "paclitaxel");
    }

    #[test]
    fn keeps_bracketed_names_as_constituents() {
        let normalizer = Normalizer::default();
        assert_eq!(
            normalizer.normalize("Aspirin (Acetylsalicylic Acid)"),
            "aspirin + acetylsalicylic acid"
        );
        assert_eq!(
            normalizer.normalize("Antiretroviral (ABC/3TC (Abacavir/Lamivudine))"),
            "antiretroviral + abacavir + lamivudine"
        );
        assert_eq!(normalizer.normalize("(Leucovorin)"), "leucovorin");
    }

    #[test]
    fn unbalanced_brackets_are_punctuation() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("Insulin (human"), "insulin human");
        assert_eq!(normalizer.normalize("Insulin) human"), "insulin human");
    }
}
