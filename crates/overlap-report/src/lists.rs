use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Writes one name per line.
pub fn write_unmatched(path: &Path, names: &[String]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for name in names {
        writeln!(writer, "{name}").with_context(|| format!("write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    info!(path = %path.display(), names = names.len(), "wrote unmatched names");
    Ok(())
}

/// Writes a `{variant: canonical}` JSON object, keys sorted.
pub fn write_synonyms(path: &Path, synonyms: &BTreeMap<String, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(synonyms).context("serialize synonyms")?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), entries = synonyms.len(), "wrote synonyms");
    Ok(())
}
