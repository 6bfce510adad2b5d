//! Matching configuration and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default minimum Jaro-Winkler similarity.
pub const DEFAULT_JARO_WINKLER: f64 = 0.85;
/// Default minimum Jaccard token similarity.
pub const DEFAULT_JACCARD: f64 = 0.3;
/// Default minimum token-set ratio.
pub const DEFAULT_TOKEN: u32 = 80;
/// Default minimum edit ratio.
pub const DEFAULT_EDIT: u32 = 80;

/// Rejected configuration. Raised before any scoring starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{name} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("use_exploded requires explode_combinations to be enabled")]
    ExplodedWithoutExplosion,
}

/// Independently tunable thresholds of the consensus rule.
///
/// Jaro-Winkler and Jaccard are required gates; the token-set ratio and edit
/// ratio are alternative confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum Jaro-Winkler similarity (0.0 to 1.0, default 0.85).
    #[serde(rename = "threshold_jaro_winkler")]
    pub jaro_winkler: f64,
    /// Minimum Jaccard token similarity (0.0 to 1.0, default 0.3).
    #[serde(rename = "threshold_jaccard")]
    pub jaccard: f64,
    /// Minimum token-set ratio (0 to 100, default 80).
    #[serde(rename = "threshold_token")]
    pub token: u32,
    /// Minimum edit ratio (0 to 100, default 80).
    #[serde(rename = "threshold_edit")]
    pub edit: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            jaro_winkler: DEFAULT_JARO_WINKLER,
            jaccard: DEFAULT_JACCARD,
            token: DEFAULT_TOKEN,
            edit: DEFAULT_EDIT,
        }
    }
}

impl Thresholds {
    /// Thresholds for high-precision runs.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            jaro_winkler: 0.92,
            jaccard: 0.5,
            token: 90,
            edit: 90,
        }
    }

    /// Thresholds for exploratory, recall-oriented runs.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            jaro_winkler: 0.80,
            jaccard: 0.1,
            token: 70,
            edit: 70,
        }
    }

    /// Checks every threshold against its range. Values are never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("threshold_jaro_winkler", self.jaro_winkler)?;
        check_unit("threshold_jaccard", self.jaccard)?;
        check_percent("threshold_token", self.token)?;
        check_percent("threshold_edit", self.edit)?;
        Ok(())
    }
}

/// Options recognized by the matching engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    #[serde(flatten)]
    pub thresholds: Thresholds,
    /// Split combination names into constituents for blocking keys.
    pub explode_combinations: bool,
    /// Score exploded constituents instead of whole left names.
    pub use_exploded: bool,
    /// Strip salt, dosage-form and strength suffixes while normalizing.
    pub strip_suffixes: bool,
}

impl MatchConfig {
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if self.use_exploded && !self.explode_combinations {
            return Err(ConfigError::ExplodedWithoutExplosion);
        }
        Ok(())
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name, value });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(())
}

fn check_percent(name: &'static str, value: u32) -> Result<(), ConfigError> {
    if value > 100 {
        return Err(ConfigError::OutOfRange {
            name,
            value: f64::from(value),
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(())
}
