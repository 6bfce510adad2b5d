//! Matching engine: ties normalization, blocking, scoring, consensus and
//! assignment into a single run over two datasets.

use std::collections::{BTreeMap, BTreeSet};

use overlap_model::{
    CandidatePair, DrugRecord, ExplodedDrugRecord, MatchConfig, MatchType, OverlapRecord,
    RawDrugRecord,
};
use rayon::prelude::*;
use tracing::{debug, info, info_span};

use crate::blocking::BlockingIndex;
use crate::combination::{CombinationSplitter, Vocabulary};
use crate::consensus::ConsensusMatcher;
use crate::error::Result;
use crate::normalize::Normalizer;
use crate::resolve::AssignmentResolver;
use crate::score::score;
use crate::synonyms::SynonymTable;

/// A left-hand record as it enters scoring.
///
/// In exploded mode each constituent of a combination is its own unit and
/// remembers the source id of the record it came from.
#[derive(Debug, Clone, Copy)]
pub struct MatchUnit<'a> {
    pub record: &'a DrugRecord,
    pub parent_id: Option<&'a str>,
}

impl<'a> MatchUnit<'a> {
    pub fn whole(record: &'a DrugRecord) -> Self {
        Self {
            record,
            parent_id: None,
        }
    }

    pub fn constituent(child: &'a ExplodedDrugRecord) -> Self {
        Self {
            record: child.record(),
            parent_id: Some(child.parent_id()),
        }
    }
}

/// Counters collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub left_records: usize,
    pub right_records: usize,
    /// Left units scored; differs from `left_records` in exploded mode.
    pub left_units: usize,
    pub empty_left: usize,
    pub empty_right: usize,
    pub blocking_keys: usize,
    pub candidate_pairs: usize,
    pub passing_pairs: usize,
    pub overlaps: usize,
    pub by_type: BTreeMap<MatchType, usize>,
}

/// Result of a matching run.
#[derive(Debug, Clone)]
pub struct MatchReport {
    /// Confirmed one-to-one matches in resolver order.
    pub overlaps: Vec<OverlapRecord>,
    /// Raw names of non-empty left records without a match, in input order.
    pub unmatched_left: Vec<String>,
    pub stats: MatchStats,
}

impl MatchReport {
    /// Number of overlaps per match type.
    pub fn count_by_type(&self) -> &BTreeMap<MatchType, usize> {
        &self.stats.by_type
    }
}

/// Runs the matching pipeline with a validated configuration.
#[derive(Debug, Clone)]
pub struct MatchEngine<'s> {
    config: MatchConfig,
    normalizer: Normalizer,
    synonyms: Option<&'s SynonymTable>,
}

impl<'s> MatchEngine<'s> {
    /// Validates `config` before anything is scored.
    ///
    /// Without a synonym table the synonym rule is skipped.
    pub fn new(config: MatchConfig, synonyms: Option<&'s SynonymTable>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: Normalizer::from_config(&config),
            config,
            synonyms,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn normalizer(&self) -> Normalizer {
        self.normalizer
    }

    pub fn synonyms(&self) -> Option<&'s SynonymTable> {
        self.synonyms
    }

    /// Normalizes raw records with this engine's normalizer.
    pub fn normalize(&self, raw: Vec<RawDrugRecord>) -> Vec<DrugRecord> {
        let _span = info_span!("normalize", records = raw.len()).entered();
        let records = self.normalizer.normalize_all(raw);
        let empty = records.iter().filter(|record| record.is_empty()).count();
        if empty > 0 {
            info!(empty, "records with empty normalized names are excluded from matching");
        }
        records
    }

    /// Normalizes both datasets, then runs [`MatchEngine::run`].
    pub fn run_raw(
        &self,
        left: Vec<RawDrugRecord>,
        right: Vec<RawDrugRecord>,
    ) -> Result<MatchReport> {
        let left = self.normalize(left);
        let right = self.normalize(right);
        self.run(&left, &right)
    }

    /// Matches two normalized datasets.
    ///
    /// Fails when a dataset repeats a source id, or when the resolver meets a
    /// record that is not part of the input.
    pub fn run(&self, left: &[DrugRecord], right: &[DrugRecord]) -> Result<MatchReport> {
        let resolver = AssignmentResolver::new(left, right)?;
        let vocabulary = self.vocabulary(right);
        let index = self.build_index(right, vocabulary.as_ref());
        let exploded = self.explode_left(left, &index);
        let units = self.units(left, &exploded);
        let pairs = self.score_candidates(&units, right, &index);

        let matcher = ConsensusMatcher::new(self.config.thresholds, self.synonyms);
        let decisions = matcher.decide_all(&pairs);
        let passing_pairs = decisions.iter().filter(|decision| decision.is_match).count();

        let overlaps = {
            let _span = info_span!("resolve", passing_pairs).entered();
            let overlaps = resolver.resolve(&decisions)?;
            info!(
                passing_pairs,
                overlaps = overlaps.len(),
                dropped = passing_pairs - overlaps.len(),
                "resolved one-to-one matches"
            );
            overlaps
        };

        let matched: BTreeSet<&str> = overlaps.iter().map(|o| o.left_id.as_str()).collect();
        let unmatched_left: Vec<String> = left
            .iter()
            .filter(|record| !record.is_empty() && !matched.contains(record.source_id()))
            .map(|record| record.raw_name().to_string())
            .collect();

        let mut by_type = BTreeMap::new();
        for overlap in &overlaps {
            *by_type.entry(overlap.match_type).or_insert(0) += 1;
        }
        let stats = MatchStats {
            left_records: left.len(),
            right_records: right.len(),
            left_units: units.len(),
            empty_left: left.iter().filter(|record| record.is_empty()).count(),
            empty_right: index.skipped_empty(),
            blocking_keys: index.key_count(),
            candidate_pairs: pairs.len(),
            passing_pairs,
            overlaps: overlaps.len(),
            by_type,
        };

        Ok(MatchReport {
            overlaps,
            unmatched_left,
            stats,
        })
    }

    /// Vocabulary that checks combination splits, when combinations are exploded.
    ///
    /// Built from the right-hand list's normalized names.
    pub fn vocabulary(&self, right: &[DrugRecord]) -> Option<Vocabulary> {
        if !self.config.explode_combinations {
            return None;
        }
        let vocabulary = Vocabulary::from_records(right);
        debug!(terms = vocabulary.len(), "built combination vocabulary");
        Some(vocabulary)
    }

    /// Children of every left record, split the way `index` splits keys.
    ///
    /// Empty when exploded matching is off.
    pub fn explode_left(
        &self,
        left: &[DrugRecord],
        index: &BlockingIndex<'_>,
    ) -> Vec<ExplodedDrugRecord> {
        if !self.config.use_exploded {
            return Vec::new();
        }
        let splitter = index.splitter().unwrap_or_default();
        let exploded: Vec<ExplodedDrugRecord> = left
            .iter()
            .flat_map(|record| splitter.explode_record(record))
            .collect();
        debug!(
            records = left.len(),
            units = exploded.len(),
            "exploded combination names"
        );
        exploded
    }

    /// Units to score: the exploded children when exploded matching is on,
    /// the records themselves otherwise.
    pub fn units<'a>(
        &self,
        left: &'a [DrugRecord],
        exploded: &'a [ExplodedDrugRecord],
    ) -> Vec<MatchUnit<'a>> {
        if self.config.use_exploded {
            exploded.iter().map(MatchUnit::constituent).collect()
        } else {
            left.iter().map(MatchUnit::whole).collect()
        }
    }

    /// Blocking index over the right-hand dataset.
    ///
    /// Combination names are split with `vocabulary` when one is given.
    pub fn build_index<'v>(
        &self,
        right: &[DrugRecord],
        vocabulary: Option<&'v Vocabulary>,
    ) -> BlockingIndex<'v> {
        let _span = info_span!("index", records = right.len()).entered();
        let splitter = vocabulary.map(CombinationSplitter::with_vocabulary);
        let index = BlockingIndex::build(right, splitter);
        info!(
            indexed = index.indexed(),
            skipped_empty = index.skipped_empty(),
            keys = index.key_count(),
            "built blocking index"
        );
        index
    }

    /// Scores every unit against its candidates on all four signals.
    ///
    /// Candidates are the right records sharing a blocking key, plus those
    /// linked through the synonym table or a shared RxNorm id. A unit the
    /// synonym table maps onto a canonical name also reaches the records
    /// sharing a key with that name, and every pair of such a unit carries the
    /// canonical name's scores as well. Units are scored in parallel; the
    /// output keeps unit order, then right position.
    pub fn score_candidates<'a>(
        &self,
        units: &[MatchUnit<'a>],
        right: &'a [DrugRecord],
        index: &BlockingIndex<'_>,
    ) -> Vec<CandidatePair<'a>> {
        let _span = info_span!("score", units = units.len()).entered();
        let pairs: Vec<CandidatePair<'a>> = units
            .par_iter()
            .flat_map_iter(|unit| {
                let unit = *unit;
                let canonical = self.canonical_form(unit.record);
                let positions = self.candidate_positions(unit.record, canonical.as_ref(), index);
                positions.into_iter().map(move |pos| {
                    let partner = &right[pos];
                    let synonym_scores = canonical.as_ref().map(|form| score(form, partner));
                    CandidatePair::new(unit.record, partner, score(unit.record, partner))
                        .with_left_parent(unit.parent_id)
                        .with_synonym_scores(synonym_scores)
                })
            })
            .collect();
        info!(candidate_pairs = pairs.len(), "scored candidate pairs");
        pairs
    }

    /// `record` renamed to the canonical name the synonym table gives it.
    fn canonical_form(&self, record: &DrugRecord) -> Option<DrugRecord> {
        let canonical = self.synonyms?.canonical(record.normalized_name())?;
        Some(DrugRecord::new(record.source_id(), record.raw_name(), canonical))
    }

    fn candidate_positions(
        &self,
        record: &DrugRecord,
        canonical: Option<&DrugRecord>,
        index: &BlockingIndex<'_>,
    ) -> BTreeSet<usize> {
        let mut positions = index.candidates_for(record);
        positions.extend(index.identifier_candidates(record));
        if let Some(table) = self.synonyms {
            positions.extend(index.synonym_candidates(record, table));
        }
        if let Some(canonical) = canonical {
            positions.extend(index.candidates_for(canonical));
        }
        positions
    }
}
