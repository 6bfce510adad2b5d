//! Drug records as seen by the matching engine.
//!
//! Ingestion produces [`RawDrugRecord`] values straight from the cleaned input
//! lists. The normalizer turns each of them into an immutable [`DrugRecord`]
//! carrying the derived normalized name and token set. When combination
//! explosion is enabled, a multi-ingredient record additionally yields one
//! [`ExplodedDrugRecord`] per constituent.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Standalone token marking a combination delimiter inside a normalized name.
///
/// `+`, `/` and `&` in raw names all normalize to this token. It is never part
/// of a record's token set.
pub const COMBINATION_MARKER: &str = "+";

/// Which of the two datasets a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The national regulator's approvals list.
    Left,
    /// The orphan-drug list it is compared against.
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A drug row as delivered by ingestion, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDrugRecord {
    /// Identifier, unique within its source dataset.
    pub source_id: String,
    /// Drug name as written in the source list.
    pub raw_name: String,
    pub approval_date: Option<NaiveDate>,
    pub indication: Option<String>,
    /// RxNorm concept identifier, when the source carries one.
    pub rxcui: Option<String>,
}

impl RawDrugRecord {
    pub fn new(source_id: impl Into<String>, raw_name: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            raw_name: raw_name.into(),
            approval_date: None,
            indication: None,
            rxcui: None,
        }
    }

    #[must_use]
    pub fn with_approval_date(mut self, date: Option<NaiveDate>) -> Self {
        self.approval_date = date;
        self
    }

    #[must_use]
    pub fn with_indication(mut self, indication: Option<String>) -> Self {
        self.indication = indication;
        self
    }

    #[must_use]
    pub fn with_rxcui(mut self, rxcui: Option<String>) -> Self {
        self.rxcui = rxcui;
        self
    }
}

/// A normalized drug record. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugRecord {
    source_id: String,
    raw_name: String,
    normalized_name: String,
    token_set: BTreeSet<String>,
    approval_date: Option<NaiveDate>,
    indication: Option<String>,
    rxcui: Option<String>,
}

impl DrugRecord {
    /// Builds a record from an already-normalized name.
    ///
    /// The token set is derived from `normalized_name`; an empty name yields an
    /// empty token set.
    pub fn new(
        source_id: impl Into<String>,
        raw_name: impl Into<String>,
        normalized_name: impl Into<String>,
    ) -> Self {
        let normalized_name = normalized_name.into();
        let token_set = token_set(&normalized_name);
        Self {
            source_id: source_id.into(),
            raw_name: raw_name.into(),
            normalized_name,
            token_set,
            approval_date: None,
            indication: None,
            rxcui: None,
        }
    }

    /// Builds a record from ingestion output and its normalized name.
    pub fn from_raw(raw: RawDrugRecord, normalized_name: impl Into<String>) -> Self {
        let RawDrugRecord {
            source_id,
            raw_name,
            approval_date,
            indication,
            rxcui,
        } = raw;
        Self::new(source_id, raw_name, normalized_name)
            .with_approval_date(approval_date)
            .with_indication(indication)
            .with_rxcui(rxcui)
    }

    #[must_use]
    pub fn with_approval_date(mut self, date: Option<NaiveDate>) -> Self {
        self.approval_date = date;
        self
    }

    #[must_use]
    pub fn with_indication(mut self, indication: Option<String>) -> Self {
        self.indication = indication.filter(|value| !value.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_rxcui(mut self, rxcui: Option<String>) -> Self {
        self.rxcui = rxcui
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    pub fn token_set(&self) -> &BTreeSet<String> {
        &self.token_set
    }

    pub fn approval_date(&self) -> Option<NaiveDate> {
        self.approval_date
    }

    pub fn indication(&self) -> Option<&str> {
        self.indication.as_deref()
    }

    pub fn rxcui(&self) -> Option<&str> {
        self.rxcui.as_deref()
    }

    /// True when the normalized name is empty. Such records never match.
    pub fn is_empty(&self) -> bool {
        self.normalized_name.is_empty()
    }

    /// First token of the normalized name, if any.
    pub fn first_token(&self) -> Option<&str> {
        self.normalized_name
            .split_whitespace()
            .find(|token| *token != COMBINATION_MARKER)
    }
}

/// One constituent of a multi-ingredient record.
///
/// The child record carries the constituent as both raw and normalized name;
/// its source id is `{parent_id}#{component}`. Matches found through a child
/// are reported against `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplodedDrugRecord {
    parent_id: String,
    component: usize,
    record: DrugRecord,
}

impl ExplodedDrugRecord {
    /// Builds the `component`-th child of `parent` from a normalized constituent.
    ///
    /// Metadata (dates, indication, identifier) is inherited from the parent.
    pub fn new(parent: &DrugRecord, component: usize, constituent: &str) -> Self {
        let record = DrugRecord::new(
            format!("{}#{component}", parent.source_id()),
            constituent,
            constituent,
        )
        .with_approval_date(parent.approval_date())
        .with_indication(parent.indication().map(str::to_string))
        .with_rxcui(parent.rxcui().map(str::to_string));
        Self {
            parent_id: parent.source_id().to_string(),
            component,
            record,
        }
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn component(&self) -> usize {
        self.component
    }

    pub fn record(&self) -> &DrugRecord {
        &self.record
    }
}

/// Whitespace tokens of a normalized name, excluding the combination marker.
pub fn token_set(normalized_name: &str) -> BTreeSet<String> {
    normalized_name
        .split_whitespace()
        .filter(|token| *token != COMBINATION_MARKER)
        .map(str::to_string)
        .collect()
}
