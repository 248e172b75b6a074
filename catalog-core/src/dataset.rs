//! Dataset records for the microdata catalog
//!
//! This module provides the catalog's data model:
//! - DatasetRecord: metadata describing one survey collection
//! - Access: public or premium tier (display only, never enforced)
//! - QuickStats: summary figures shown on dataset cards
//! - Catalog: a validated, immutable collection of records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Date format used by `QuickStats::last_updated`
pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d";

/// Access tier of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Premium,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Premium => "premium",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Access {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Access::Public),
            "premium" => Ok(Access::Premium),
            other => Err(CatalogError::UnknownAccess(other.to_string())),
        }
    }
}

/// Summary figures displayed alongside a dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuickStats {
    /// Record count formatted with thousands separators, e.g. "5,200,000"
    pub record_count: String,
    /// Date of the last update as YYYY-MM-DD
    pub last_updated: String,
}

impl QuickStats {
    pub fn new(record_count: impl Into<String>, last_updated: impl Into<String>) -> Self {
        Self {
            record_count: record_count.into(),
            last_updated: last_updated.into(),
        }
    }

    /// Parsed record count, or 0 when the formatted string is not a number
    pub fn records(&self) -> u64 {
        parse_record_count(&self.record_count).unwrap_or(0)
    }

    /// Parsed last update date, if well-formed
    pub fn last_updated_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.last_updated.trim(), LAST_UPDATED_FORMAT).ok()
    }
}

/// Parse a record count that may carry thousands separators
///
/// Commas, underscores and whitespace are stripped before parsing.
/// Returns `None` for empty or non-numeric input.
pub fn parse_record_count(raw: &str) -> Option<u64> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();

    if digits.is_empty() {
        return None;
    }

    digits.parse().ok()
}

/// One catalog entry describing a survey or microdata collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: String,
    pub name: String,
    pub theme: String,
    pub access: Access,
    /// Version labels, most recent first
    pub versions: Vec<String>,
    pub description: String,
    pub variables: Vec<String>,
    pub quick: QuickStats,
}

impl DatasetRecord {
    /// Most recent version label
    ///
    /// This is the first entry of `versions`, which is most recent only when
    /// the record lists its versions newest first. The shipped `plfs` record
    /// lists them oldest first, so this returns `2021_q4` for it.
    pub fn latest_version(&self) -> Option<&str> {
        self.versions.first().map(String::as_str)
    }

    /// Check the per-record invariants
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.versions.is_empty() {
            return Err(CatalogError::EmptyVersions(self.id.clone()));
        }
        if self.variables.is_empty() {
            return Err(CatalogError::EmptyVariables(self.id.clone()));
        }
        Ok(())
    }
}

/// A validated, immutable collection of dataset records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    records: Vec<DatasetRecord>,
}

impl Catalog {
    /// Create a catalog, rejecting duplicate ids and empty version or variable lists
    pub fn new(records: Vec<DatasetRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(records.len());

        for record in &records {
            record.validate()?;
            if !seen.insert(record.id.as_str()) {
                return Err(CatalogError::DuplicateId(record.id.clone()));
            }
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<&DatasetRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct themes in first-seen order
    pub fn themes(&self) -> Vec<&str> {
        let mut themes: Vec<&str> = Vec::new();
        for record in &self.records {
            if !themes.contains(&record.theme.as_str()) {
                themes.push(&record.theme);
            }
        }
        themes
    }
}

impl AsRef<[DatasetRecord]> for Catalog {
    fn as_ref(&self) -> &[DatasetRecord] {
        &self.records
    }
}

/// Catalog construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Duplicate dataset id: {0}")]
    DuplicateId(String),

    #[error("Dataset {0} has no versions")]
    EmptyVersions(String),

    #[error("Dataset {0} has no variables")]
    EmptyVariables(String),

    #[error("Unknown access level: {0}")]
    UnknownAccess(String),
}
