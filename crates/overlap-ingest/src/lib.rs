//! Input side of the pipeline: cleaned drug lists and synonym files.

pub mod drug_csv;
pub mod synonyms;

pub use drug_csv::{CsvColumns, parse_approval_date, read_drug_csv, read_name_list};
pub use synonyms::load_synonyms;
