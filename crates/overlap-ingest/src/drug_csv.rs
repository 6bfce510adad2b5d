use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use overlap_model::RawDrugRecord;

pub const DEFAULT_NAME_COLUMN: &str = "Drug Name";
pub const DEFAULT_DATE_COLUMN: &str = "Date of Approval";
pub const DEFAULT_INDICATION_COLUMN: &str = "Indication";
pub const DEFAULT_ID_COLUMN: &str = "Source ID";
pub const DEFAULT_RXCUI_COLUMN: &str = "RxCUI";

/// Header names to read from a drug list. Only the name column is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvColumns {
    pub name: String,
    pub approval_date: String,
    pub indication: String,
    pub source_id: String,
    pub rxcui: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME_COLUMN.to_string(),
            approval_date: DEFAULT_DATE_COLUMN.to_string(),
            indication: DEFAULT_INDICATION_COLUMN.to_string(),
            source_id: DEFAULT_ID_COLUMN.to_string(),
            rxcui: DEFAULT_RXCUI_COLUMN.to_string(),
        }
    }
}

impl CsvColumns {
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = source_id.into();
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnPositions {
    name: usize,
    approval_date: Option<usize>,
    indication: Option<usize>,
    source_id: Option<usize>,
    rxcui: Option<usize>,
}

impl ColumnPositions {
    fn locate(headers: &[String], columns: &CsvColumns, path: &Path) -> Result<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(wanted.trim()))
        };
        let Some(name) = find(&columns.name) else {
            bail!(
                "{}: missing drug name column '{}' (found: {})",
                path.display(),
                columns.name,
                headers.join(", ")
            );
        };
        Ok(Self {
            name,
            approval_date: find(&columns.approval_date),
            indication: find(&columns.indication),
            source_id: find(&columns.source_id),
            rxcui: find(&columns.rxcui),
        })
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|value| !value.is_empty()).cloned()
}

/// Parses an approval date.
///
/// Accepts `MM/DD/YYYY`, `YYYY-MM-DD`, `MM/YYYY` (first of the month) and a
/// bare year (first of January).
pub fn parse_approval_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    for format in ["%m/%d/%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    if value.len() == 4
        && let Ok(year) = value.parse::<i32>()
    {
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    if let Some((month, year)) = value.split_once('/')
        && year.len() == 4
        && let (Ok(month), Ok(year)) = (month.parse::<u32>(), year.parse::<i32>())
    {
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    None
}

/// Reads a cleaned drug list.
///
/// Header names are trimmed and stripped of a byte-order mark before they
/// are matched, ignoring ASCII case. Rows with only blank cells are skipped.
/// Without a source id column the 1-based data row number becomes the id.
/// A date that does not parse is dropped with a warning.
pub fn read_drug_csv(path: &Path, columns: &CsvColumns) -> Result<Vec<RawDrugRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("read header: {}", path.display()))?
        .iter()
        .map(normalize_header)
        .collect();
    let positions = ColumnPositions::locate(&headers, columns, path)?;
    debug!(path = %path.display(), ?headers, "resolved drug list columns");

    let mut records = Vec::new();
    let mut bad_dates = 0usize;
    for (idx, row) in reader.records().enumerate() {
        let row_number = idx + 1;
        let row = row.with_context(|| format!("read record {row_number}: {}", path.display()))?;
        let cells: Vec<String> = row.iter().map(normalize_cell).collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        let cell = |pos: Option<usize>| non_empty(pos.and_then(|pos| cells.get(pos)));

        let source_id = cell(positions.source_id).unwrap_or_else(|| row_number.to_string());
        let raw_name = cell(Some(positions.name)).unwrap_or_default();
        let approval_date = match cell(positions.approval_date) {
            Some(raw) => {
                let parsed = parse_approval_date(&raw);
                if parsed.is_none() {
                    bad_dates += 1;
                    warn!(
                        path = %path.display(),
                        row = row_number,
                        value = %raw,
                        "unparseable approval date ignored"
                    );
                }
                parsed
            }
            None => None,
        };

        records.push(
            RawDrugRecord::new(source_id, raw_name)
                .with_approval_date(approval_date)
                .with_indication(cell(positions.indication))
                .with_rxcui(cell(positions.rxcui)),
        );
    }
    info!(
        path = %path.display(),
        records = records.len(),
        bad_dates,
        "loaded drug list"
    );
    Ok(records)
}

/// Reads one name per line, skipping blank lines.
pub fn read_name_list(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read name list: {}", path.display()))?;
    Ok(contents
        .lines()
        .map(|line| line.trim().trim_matches('\u{feff}'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 9);
        assert_eq!(parse_approval_date("03/09/2021"), expected);
        assert_eq!(parse_approval_date("2021-03-09"), expected);
        assert_eq!(parse_approval_date(" 3/9/2021 "), expected);
        assert_eq!(
            parse_approval_date("03/2021"),
            NaiveDate::from_ymd_opt(2021, 3, 1)
        );
        assert_eq!(
            parse_approval_date("1998"),
            NaiveDate::from_ymd_opt(1998, 1, 1)
        );
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert_eq!(parse_approval_date(""), None);
        assert_eq!(parse_approval_date("sometime in 2020"), None);
        assert_eq!(parse_approval_date("13/45/2020"), None);
        assert_eq!(parse_approval_date("13/2020"), None);
    }

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_header("\u{feff} Drug   Name "), "Drug Name");
    }
}
