pub mod config;
pub mod decision;
pub mod record;
pub mod scores;

pub use config::{ConfigError, MatchConfig, Thresholds};
pub use decision::{MatchDecision, MatchType, OverlapRecord};
pub use record::{COMBINATION_MARKER, DrugRecord, ExplodedDrugRecord, RawDrugRecord, Side};
pub use scores::{CandidatePair, SimilarityScores};
