//! File-level pipeline: load both lists, run the engine, hand results back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span};

use overlap_ingest::{CsvColumns, load_synonyms, read_drug_csv, read_name_list};
use overlap_match::{
    MatchEngine, MatchReport, Normalizer, SweepGrid, SweepRow, SynonymTable, suggest_synonyms,
};
use overlap_model::{MatchConfig, RawDrugRecord};

/// Where the two drug lists and the optional synonym file live.
#[derive(Debug, Clone)]
pub struct MatchInputs {
    pub left: PathBuf,
    pub right: PathBuf,
    pub left_columns: CsvColumns,
    pub right_columns: CsvColumns,
    pub synonyms: Option<PathBuf>,
}

impl MatchInputs {
    pub fn new(left: impl Into<PathBuf>, right: impl Into<PathBuf>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            left_columns: CsvColumns::default(),
            right_columns: CsvColumns::default(),
            synonyms: None,
        }
    }

    #[must_use]
    pub fn with_synonyms(mut self, path: Option<PathBuf>) -> Self {
        self.synonyms = path;
        self
    }
}

/// Raw inputs read from disk.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub left: Vec<RawDrugRecord>,
    pub right: Vec<RawDrugRecord>,
    pub synonyms: Option<SynonymTable>,
}

pub fn load_inputs(inputs: &MatchInputs, normalizer: &Normalizer) -> Result<LoadedInputs> {
    let _span = info_span!("load").entered();
    let left = read_drug_csv(&inputs.left, &inputs.left_columns)
        .with_context(|| format!("load left list: {}", inputs.left.display()))?;
    let right = read_drug_csv(&inputs.right, &inputs.right_columns)
        .with_context(|| format!("load right list: {}", inputs.right.display()))?;
    let synonyms = match &inputs.synonyms {
        Some(path) => load_synonyms(path)?
            .map(|pairs| SynonymTable::from_pairs(pairs, normalizer)),
        None => None,
    };
    Ok(LoadedInputs {
        left,
        right,
        synonyms,
    })
}

/// Runs a full match over two files.
pub fn run_match(config: MatchConfig, inputs: &MatchInputs) -> Result<MatchReport> {
    let normalizer = Normalizer::from_config(&config);
    let loaded = load_inputs(inputs, &normalizer)?;
    let engine = MatchEngine::new(config, loaded.synonyms.as_ref())?;
    let report = engine.run_raw(loaded.left, loaded.right)?;
    info!(
        overlaps = report.overlaps.len(),
        unmatched = report.unmatched_left.len(),
        "matching finished"
    );
    Ok(report)
}

/// Evaluates a threshold grid over two files.
pub fn run_sweep(config: MatchConfig, inputs: &MatchInputs, grid: &SweepGrid) -> Result<Vec<SweepRow>> {
    let normalizer = Normalizer::from_config(&config);
    let loaded = load_inputs(inputs, &normalizer)?;
    let engine = MatchEngine::new(config, loaded.synonyms.as_ref())?;
    let left = engine.normalize(loaded.left);
    let right = engine.normalize(loaded.right);
    Ok(engine.sweep(&left, &right, grid)?)
}

/// Suggests synonym entries for a list of unmatched names against the names
/// of a drug list.
pub fn run_synonym_suggestions(
    unmatched: &Path,
    canonical: &Path,
    columns: &CsvColumns,
    normalizer: &Normalizer,
    min_ratio: f64,
) -> Result<BTreeMap<String, String>> {
    let _span = info_span!("synonyms", min_ratio).entered();
    let names = read_name_list(unmatched)?;
    let canonical_names: Vec<String> = read_drug_csv(canonical, columns)?
        .into_iter()
        .map(|record| record.raw_name)
        .collect();
    let suggestions = suggest_synonyms(&names, &canonical_names, normalizer, min_ratio);
    info!(
        unmatched = names.len(),
        suggestions = suggestions.len(),
        "suggested synonyms"
    );
    Ok(suggestions)
}
