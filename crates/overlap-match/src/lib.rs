//! Drug name overlap matching.
//!
//! The pipeline runs leaves first: [`normalize`] prepares names,
//! [`combination`] splits combination names, [`blocking`] limits which pairs
//! get compared, [`score`] computes the four similarity
//! signals, [`consensus`] decides each pair and [`resolve`] keeps a one-to-one
//! subset. [`engine::MatchEngine`] drives the whole run.

#![deny(unsafe_code)]

pub mod blocking;
pub mod combination;
pub mod consensus;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod resolve;
pub mod score;
pub mod sweep;
pub mod synonyms;

pub use blocking::{BlockingIndex, blocking_keys};
pub use combination::{
    CombinationSplitter, FRAGMENT_FILTER_THRESHOLD, VOCABULARY_MATCH_THRESHOLD, Vocabulary,
    explode, explode_record, is_combination,
};
pub use consensus::{ConsensusMatcher, is_high_confidence_match};
pub use engine::{MatchEngine, MatchReport, MatchStats, MatchUnit};
pub use error::{MatchError, Result};
pub use normalize::Normalizer;
pub use resolve::AssignmentResolver;
pub use score::score;
pub use sweep::{SweepGrid, SweepRow};
pub use synonyms::{DEFAULT_SUGGESTION_RATIO, SynonymTable, suggest_synonyms};
