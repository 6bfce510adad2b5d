//! CLI argument definitions for the drug overlap matcher.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "drug-overlap",
    version,
    about = "Find drugs present in two regulatory drug lists",
    long_about = "Match drug names across two cleaned drug lists despite naming differences.\n\n\
                  Candidates are scored on Jaro-Winkler, Jaccard, token-set and edit similarity\n\
                  and confirmed one-to-one."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match two drug lists and write the confirmed overlaps.
    Match(MatchArgs),

    /// Count matches over a grid of Jaro-Winkler and Jaccard thresholds.
    Sweep(SweepArgs),

    /// Suggest synonym entries for names that found no match.
    Synonyms(SynonymsArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// Left drug list (CSV with a header row).
    #[arg(value_name = "LEFT_CSV")]
    pub left: PathBuf,

    /// Right drug list (CSV with a header row).
    #[arg(value_name = "RIGHT_CSV")]
    pub right: PathBuf,

    /// Drug name column of the left list.
    #[arg(long = "left-name-column", default_value = "Drug Name")]
    pub left_name_column: String,

    /// Drug name column of the right list.
    #[arg(long = "right-name-column", default_value = "Drug Name")]
    pub right_name_column: String,

    /// Source id column of the left list (row numbers when absent).
    #[arg(long = "left-id-column", default_value = "Source ID")]
    pub left_id_column: String,

    /// Source id column of the right list (row numbers when absent).
    #[arg(long = "right-id-column", default_value = "Source ID")]
    pub right_id_column: String,

    /// JSON object mapping variant names to canonical names.
    ///
    /// A missing file only disables synonym matching.
    #[arg(long = "synonyms", value_name = "PATH")]
    pub synonyms: Option<PathBuf>,
}

#[derive(Args)]
pub struct MatchingArgs {
    /// JSON match configuration; flags below override its values.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Start from a named threshold set.
    #[arg(long = "preset", value_enum)]
    pub preset: Option<PresetArg>,

    /// Minimum Jaro-Winkler similarity, 0 to 1.
    #[arg(long = "threshold-jaro-winkler", visible_alias = "jw", value_name = "F")]
    pub jaro_winkler: Option<f64>,

    /// Minimum Jaccard token similarity, 0 to 1.
    #[arg(long = "threshold-jaccard", visible_alias = "jaccard", value_name = "F")]
    pub jaccard: Option<f64>,

    /// Minimum token-set ratio, 0 to 100.
    #[arg(long = "threshold-token", value_name = "N")]
    pub token: Option<u32>,

    /// Minimum edit ratio, 0 to 100.
    #[arg(long = "threshold-edit", value_name = "N")]
    pub edit: Option<u32>,

    /// Block on every constituent of combination names.
    #[arg(long = "explode-combinations")]
    pub explode_combinations: bool,

    /// Score combination constituents individually.
    ///
    /// Needs combination explosion, from --explode-combinations or the config file.
    #[arg(long = "use-exploded")]
    pub use_exploded: bool,

    /// Strip salt, dosage-form and strength suffixes before matching.
    #[arg(long = "strip-suffixes")]
    pub strip_suffixes: bool,
}

#[derive(Parser)]
pub struct MatchArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[command(flatten)]
    pub matching: MatchingArgs,

    /// Output file for confirmed overlaps.
    #[arg(long = "out", short = 'o', value_name = "PATH", default_value = "overlap.csv")]
    pub out: PathBuf,

    /// Output format (default: from the output file extension).
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Also write unmatched left names, one per line.
    #[arg(long = "unmatched", value_name = "PATH")]
    pub unmatched: Option<PathBuf>,
}

#[derive(Parser)]
pub struct SweepArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[command(flatten)]
    pub matching: MatchingArgs,

    /// Jaro-Winkler thresholds to evaluate.
    #[arg(
        long = "jw-grid",
        value_delimiter = ',',
        default_values_t = [0.70, 0.80, 0.85, 0.90, 0.95]
    )]
    pub jw_grid: Vec<f64>,

    /// Jaccard thresholds to evaluate.
    #[arg(
        long = "jaccard-grid",
        value_delimiter = ',',
        default_values_t = [0.10, 0.30, 0.50]
    )]
    pub jaccard_grid: Vec<f64>,
}

#[derive(Parser)]
pub struct SynonymsArgs {
    /// Unmatched names, one per line (as written by `match --unmatched`).
    #[arg(value_name = "UNMATCHED")]
    pub unmatched: PathBuf,

    /// Drug list whose names are the canonical targets.
    #[arg(value_name = "CANONICAL_CSV")]
    pub canonical: PathBuf,

    /// Drug name column of the canonical list.
    #[arg(long = "name-column", default_value = "Drug Name")]
    pub name_column: String,

    /// Minimum token-set ratio for a suggestion, 0 to 100.
    #[arg(long = "min-ratio", default_value_t = 85.0)]
    pub min_ratio: f64,

    /// Strip salt, dosage-form and strength suffixes before comparing.
    #[arg(long = "strip-suffixes")]
    pub strip_suffixes: bool,

    /// Output JSON file.
    #[arg(long = "out", short = 'o', value_name = "PATH", default_value = "synonyms.json")]
    pub out: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    Default,
    Strict,
    Relaxed,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
