//! Error types for matching runs.

use overlap_model::{ConfigError, Side};
use thiserror::Error;

/// Errors from the matching engine.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Configuration rejected before scoring.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// A dataset repeats a source id.
    #[error("duplicate source id '{id}' in {side} dataset")]
    DuplicateSourceId { side: Side, id: String },
    /// A match refers to a record missing from its dataset.
    #[error("{side} record '{id}' referenced by a match is not in the {side} dataset")]
    UnknownRecord { side: Side, id: String },
}

pub type Result<T> = std::result::Result<T, MatchError>;
