//! Candidate blocking index.
//!
//! The right-hand dataset is partitioned by blocking key so that each left
//! record is only scored against records sharing at least one key. The key is
//! the first token of the normalized name; in exploded mode every constituent
//! found by the index's [`CombinationSplitter`] contributes its own first
//! token. Records with an empty normalized name are never indexed and never
//! produce candidates.
//!
//! Next to the key map the index keeps exact lookups by normalized name and by
//! RxNorm id, used to reach synonym and identifier partners that share no key.

use std::collections::{BTreeMap, BTreeSet};

use overlap_model::DrugRecord;

use crate::combination::CombinationSplitter;
use crate::synonyms::SynonymTable;

/// Blocking keys of a record. Empty for records with an empty name.
///
/// Without a splitter the key is the first token of the whole name.
pub fn blocking_keys(
    record: &DrugRecord,
    splitter: Option<&CombinationSplitter<'_>>,
) -> BTreeSet<String> {
    if record.is_empty() {
        return BTreeSet::new();
    }
    let Some(splitter) = splitter else {
        return record.first_token().map(str::to_string).into_iter().collect();
    };
    splitter
        .explode(record.normalized_name())
        .iter()
        .filter_map(|part| part.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Index from blocking key to positions in the indexed record slice.
#[derive(Debug, Clone, Default)]
pub struct BlockingIndex<'v> {
    splitter: Option<CombinationSplitter<'v>>,
    by_key: BTreeMap<String, BTreeSet<usize>>,
    by_name: BTreeMap<String, BTreeSet<usize>>,
    by_rxcui: BTreeMap<String, BTreeSet<usize>>,
    indexed: usize,
    skipped_empty: usize,
}

impl<'v> BlockingIndex<'v> {
    /// Indexes `records`; candidate ids are positions in this slice.
    ///
    /// With a splitter, keys are taken per constituent on both sides.
    pub fn build(records: &[DrugRecord], splitter: Option<CombinationSplitter<'v>>) -> Self {
        Self::build_range(records, 0, splitter)
    }

    /// Indexes a shard whose first record sits at `offset` in the full slice.
    ///
    /// Shards built this way combine with [`BlockingIndex::merge`].
    pub fn build_range(
        records: &[DrugRecord],
        offset: usize,
        splitter: Option<CombinationSplitter<'v>>,
    ) -> Self {
        let mut index = Self {
            splitter,
            ..Self::default()
        };
        for (pos, record) in records.iter().enumerate() {
            let id = offset + pos;
            if record.is_empty() {
                index.skipped_empty += 1;
                continue;
            }
            index.indexed += 1;
            for key in blocking_keys(record, splitter.as_ref()) {
                index.by_key.entry(key).or_default().insert(id);
            }
            index
                .by_name
                .entry(record.normalized_name().to_string())
                .or_default()
                .insert(id);
            if let Some(rxcui) = record.rxcui() {
                index
                    .by_rxcui
                    .entry(rxcui.to_string())
                    .or_default()
                    .insert(id);
            }
        }
        index
    }

    /// Merges another shard into this one by key union.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (key, ids) in other.by_key {
            self.by_key.entry(key).or_default().extend(ids);
        }
        for (name, ids) in other.by_name {
            self.by_name.entry(name).or_default().extend(ids);
        }
        for (rxcui, ids) in other.by_rxcui {
            self.by_rxcui.entry(rxcui).or_default().extend(ids);
        }
        self.indexed += other.indexed;
        self.skipped_empty += other.skipped_empty;
        self
    }

    /// Indexed records sharing at least one blocking key with `record`.
    pub fn candidates_for(&self, record: &DrugRecord) -> BTreeSet<usize> {
        let mut candidates = BTreeSet::new();
        for key in blocking_keys(record, self.splitter.as_ref()) {
            if let Some(ids) = self.by_key.get(&key) {
                candidates.extend(ids.iter().copied());
            }
        }
        candidates
    }

    /// Indexed records the synonym table links to `record`, in either direction.
    pub fn synonym_candidates(&self, record: &DrugRecord, table: &SynonymTable) -> BTreeSet<usize> {
        let mut candidates = BTreeSet::new();
        if record.is_empty() {
            return candidates;
        }
        let name = record.normalized_name();
        let linked = table.canonical(name).into_iter().chain(table.variants_of(name));
        for partner in linked {
            if let Some(ids) = self.by_name.get(partner) {
                candidates.extend(ids.iter().copied());
            }
        }
        candidates
    }

    /// Indexed records carrying the same RxNorm id as `record`.
    pub fn identifier_candidates(&self, record: &DrugRecord) -> BTreeSet<usize> {
        if record.is_empty() {
            return BTreeSet::new();
        }
        record
            .rxcui()
            .and_then(|rxcui| self.by_rxcui.get(rxcui))
            .cloned()
            .unwrap_or_default()
    }

    /// Splitter used for keys; `None` when combinations are not exploded.
    pub fn splitter(&self) -> Option<CombinationSplitter<'v>> {
        self.splitter
    }

    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }

    /// Number of records that went into the index.
    pub fn indexed(&self) -> usize {
        self.indexed
    }

    /// Number of records left out for having an empty name.
    pub fn skipped_empty(&self) -> usize {
        self.skipped_empty
    }

    /// Ids filed under `key`.
    pub fn ids_for_key(&self, key: &str) -> Option<&BTreeSet<usize>> {
        self.by_key.get(key)
    }
}
