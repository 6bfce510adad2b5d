//! Match configuration: optional JSON file, then command-line overrides.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use overlap_model::{MatchConfig, Thresholds};

/// Named threshold sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdPreset {
    Default,
    Strict,
    Relaxed,
}

impl ThresholdPreset {
    pub fn thresholds(self) -> Thresholds {
        match self {
            Self::Default => Thresholds::default(),
            Self::Strict => Thresholds::strict(),
            Self::Relaxed => Thresholds::relaxed(),
        }
    }
}

/// Values given on the command line. `None` and `false` leave the file value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigOverrides {
    pub preset: Option<ThresholdPreset>,
    pub jaro_winkler: Option<f64>,
    pub jaccard: Option<f64>,
    pub token: Option<u32>,
    pub edit: Option<u32>,
    pub explode_combinations: bool,
    pub use_exploded: bool,
    pub strip_suffixes: bool,
}

impl ConfigOverrides {
    /// Applies the preset first, then the individual thresholds and switches.
    pub fn apply(&self, mut config: MatchConfig) -> MatchConfig {
        if let Some(preset) = self.preset {
            config.thresholds = preset.thresholds();
        }
        if let Some(value) = self.jaro_winkler {
            config.thresholds.jaro_winkler = value;
        }
        if let Some(value) = self.jaccard {
            config.thresholds.jaccard = value;
        }
        if let Some(value) = self.token {
            config.thresholds.token = value;
        }
        if let Some(value) = self.edit {
            config.thresholds.edit = value;
        }
        config.explode_combinations |= self.explode_combinations;
        config.use_exploded |= self.use_exploded;
        config.strip_suffixes |= self.strip_suffixes;
        config
    }
}

/// Reads a JSON config file. Missing fields take their defaults.
pub fn load_config_file(path: &Path) -> Result<MatchConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse config: {}", path.display()))
}

/// Builds and validates the effective configuration.
pub fn resolve_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<MatchConfig> {
    let base = match path {
        Some(path) => load_config_file(path)?,
        None => MatchConfig::default(),
    };
    let config = overrides.apply(base);
    config.validate().context("invalid match configuration")?;
    debug!(?config, "resolved match configuration");
    Ok(config)
}
