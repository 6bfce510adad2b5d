//! Output side of the pipeline.
//!
//! - overlap list as CSV or JSON
//! - unmatched left names, one per line
//! - suggested synonyms as a JSON object

mod lists;
mod overlap;

pub use lists::{write_synonyms, write_unmatched};
pub use overlap::{
    OVERLAP_COLUMNS, OverlapFormat, write_overlap_csv, write_overlap_csv_to, write_overlap_json,
    write_overlaps,
};
