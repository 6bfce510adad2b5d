use std::path::PathBuf;

use anyhow::Result;
use tracing::info_span;

use overlap_cli::config::{ConfigOverrides, ThresholdPreset, resolve_config};
use overlap_cli::pipeline::{
    MatchInputs, run_match as match_files, run_sweep as sweep_files, run_synonym_suggestions,
};
use overlap_ingest::CsvColumns;
use overlap_match::{MatchReport, Normalizer, SweepGrid, SweepRow};
use overlap_report::{OverlapFormat, write_overlaps, write_synonyms, write_unmatched};

use crate::cli::{
    InputArgs, MatchArgs, MatchingArgs, OutputFormatArg, PresetArg, SweepArgs, SynonymsArgs,
};

pub struct MatchOutcome {
    pub report: MatchReport,
    pub out: PathBuf,
    pub format: OverlapFormat,
    pub unmatched: Option<PathBuf>,
}

pub struct SynonymOutcome {
    pub suggestions: usize,
    pub out: PathBuf,
}

pub fn run_match(args: &MatchArgs) -> Result<MatchOutcome> {
    let _span = info_span!("match").entered();
    let config = resolve_config(args.matching.config.as_deref(), &overrides(&args.matching))?;
    let report = match_files(config, &inputs(&args.inputs))?;

    let format = match args.format {
        Some(OutputFormatArg::Csv) => OverlapFormat::Csv,
        Some(OutputFormatArg::Json) => OverlapFormat::Json,
        None => OverlapFormat::from_path(&args.out),
    };
    write_overlaps(&args.out, &report.overlaps, format)?;
    if let Some(path) = &args.unmatched {
        write_unmatched(path, &report.unmatched_left)?;
    }
    Ok(MatchOutcome {
        report,
        out: args.out.clone(),
        format,
        unmatched: args.unmatched.clone(),
    })
}

pub fn run_sweep(args: &SweepArgs) -> Result<Vec<SweepRow>> {
    let _span = info_span!("sweep").entered();
    let config = resolve_config(args.matching.config.as_deref(), &overrides(&args.matching))?;
    let grid = SweepGrid::new(args.jw_grid.clone(), args.jaccard_grid.clone());
    sweep_files(config, &inputs(&args.inputs), &grid)
}

pub fn run_synonyms(args: &SynonymsArgs) -> Result<SynonymOutcome> {
    let columns = CsvColumns::default().with_name(args.name_column.as_str());
    let normalizer = Normalizer::new(args.strip_suffixes);
    let suggestions = run_synonym_suggestions(
        &args.unmatched,
        &args.canonical,
        &columns,
        &normalizer,
        args.min_ratio,
    )?;
    write_synonyms(&args.out, &suggestions)?;
    Ok(SynonymOutcome {
        suggestions: suggestions.len(),
        out: args.out.clone(),
    })
}

fn inputs(args: &InputArgs) -> MatchInputs {
    let mut inputs =
        MatchInputs::new(&args.left, &args.right).with_synonyms(args.synonyms.clone());
    inputs.left_columns = CsvColumns::default()
        .with_name(args.left_name_column.as_str())
        .with_source_id(args.left_id_column.as_str());
    inputs.right_columns = CsvColumns::default()
        .with_name(args.right_name_column.as_str())
        .with_source_id(args.right_id_column.as_str());
    inputs
}

fn overrides(args: &MatchingArgs) -> ConfigOverrides {
    ConfigOverrides {
        preset: args.preset.map(|preset| match preset {
            PresetArg::Default => ThresholdPreset::Default,
            PresetArg::Strict => ThresholdPreset::Strict,
            PresetArg::Relaxed => ThresholdPreset::Relaxed,
        }),
        jaro_winkler: args.jaro_winkler,
        jaccard: args.jaccard,
        token: args.token,
        edit: args.edit,
        explode_combinations: args.explode_combinations,
        use_exploded: args.use_exploded,
        strip_suffixes: args.strip_suffixes,
    }
}
