use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use overlap_model::OverlapRecord;

/// Column order of the overlap CSV.
pub const OVERLAP_COLUMNS: [&str; 14] = [
    "left_id",
    "right_id",
    "left_name",
    "right_name",
    "left_component",
    "match_type",
    "jaro_winkler",
    "jaccard",
    "token_ratio",
    "edit_ratio",
    "left_approval_date",
    "right_approval_date",
    "left_indication",
    "right_indication",
];

/// File format of the overlap list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapFormat {
    #[default]
    Csv,
    Json,
}

impl OverlapFormat {
    /// Guesses the format from a file extension; anything but `.json` is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Writes overlap rows as CSV with a header row, even when there are none.
pub fn write_overlap_csv_to<W: Write>(writer: W, records: &[OverlapRecord]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(OVERLAP_COLUMNS)
        .context("write overlap header")?;
    for record in records {
        csv.serialize(record)
            .with_context(|| format!("write overlap {} -> {}", record.left_id, record.right_id))?;
    }
    csv.flush().context("flush overlap csv")?;
    Ok(())
}

pub fn write_overlap_csv(path: &Path, records: &[OverlapRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_overlap_csv_to(BufWriter::new(file), records)
        .with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), rows = records.len(), "wrote overlap csv");
    Ok(())
}

pub fn write_overlap_json(path: &Path, records: &[OverlapRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .with_context(|| format!("write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    info!(path = %path.display(), rows = records.len(), "wrote overlap json");
    Ok(())
}

pub fn write_overlaps(path: &Path, records: &[OverlapRecord], format: OverlapFormat) -> Result<()> {
    match format {
        OverlapFormat::Csv => write_overlap_csv(path, records),
        OverlapFormat::Json => write_overlap_json(path, records),
    }
}
