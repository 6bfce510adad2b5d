use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Loads a `{variant: canonical}` JSON object.
///
/// A missing file is not an error: matching then runs without the synonym
/// rule. A file that exists but is not a JSON object of strings is.
pub fn load_synonyms(path: &Path) -> Result<Option<BTreeMap<String, String>>> {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "synonym file not found; matching without synonyms"
        );
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read synonyms: {}", path.display()))?;
    let synonyms: BTreeMap<String, String> = serde_json::from_str(&contents)
        .with_context(|| format!("parse synonyms: {}", path.display()))?;
    info!(path = %path.display(), entries = synonyms.len(), "loaded synonyms");
    Ok(Some(synonyms))
}
