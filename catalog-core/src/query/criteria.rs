//! Query criteria definitions
//!
//! Defines the filter, search and sort parameters for one catalog view.
//! Criteria are built from whatever the presentation layer hands over and
//! never fail to construct: unknown values fall back to the defaults.

use crate::collation;
use crate::dataset::DatasetRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wildcard value that disables a filter
pub const WILDCARD: &str = "all";

/// Exact-match filter on one record field, or the "all" wildcard
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldFilter {
    /// Matches every record
    #[default]
    All,
    /// Matches records whose field equals the value exactly
    Exact(String),
}

impl FieldFilter {
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact(value.into())
    }

    /// Check a field value against the filter
    pub fn matches(&self, value: &str) -> bool {
        match self {
            FieldFilter::All => true,
            FieldFilter::Exact(expected) => expected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FieldFilter::All)
    }
}

impl From<&str> for FieldFilter {
    fn from(value: &str) -> Self {
        if value.is_empty() || value == WILDCARD {
            FieldFilter::All
        } else {
            FieldFilter::Exact(value.to_string())
        }
    }
}

impl From<String> for FieldFilter {
    fn from(value: String) -> Self {
        if value.is_empty() || value == WILDCARD {
            FieldFilter::All
        } else {
            FieldFilter::Exact(value)
        }
    }
}

impl From<Option<String>> for FieldFilter {
    fn from(value: Option<String>) -> Self {
        value.map(FieldFilter::from).unwrap_or_default()
    }
}

impl From<FieldFilter> for String {
    fn from(filter: FieldFilter) -> Self {
        match filter {
            FieldFilter::All => WILDCARD.to_string(),
            FieldFilter::Exact(value) => value,
        }
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFilter::All => f.write_str(WILDCARD),
            FieldFilter::Exact(value) => f.write_str(value),
        }
    }
}

/// Field used to order the visible records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    #[default]
    Name,
    Theme,
    Access,
    /// Numeric record count from the quick stats
    Records,
}

impl SortKey {
    /// Parse a sort key, `None` when unrecognised
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "name" => Some(SortKey::Name),
            "theme" => Some(SortKey::Theme),
            "access" => Some(SortKey::Access),
            "records" => Some(SortKey::Records),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Theme => "theme",
            SortKey::Access => "access",
            SortKey::Records => "records",
        }
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        SortKey::parse(&value).unwrap_or_default()
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.as_str().to_string()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl From<String> for SortDirection {
    fn from(value: String) -> Self {
        SortDirection::parse(&value).unwrap_or_default()
    }
}

impl From<SortDirection> for String {
    fn from(direction: SortDirection) -> Self {
        direction.as_str().to_string()
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combined search, filter and sort parameters for one catalog view
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryCriteria {
    /// Case-insensitive substring matched against name, description and id
    pub search_text: String,
    /// Exact match on theme
    pub theme_filter: FieldFilter,
    /// Exact match on access level
    pub access_filter: FieldFilter,
    /// Second, independent exact match on theme
    pub category_filter: FieldFilter,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl QueryCriteria {
    /// Create criteria that match everything, sorted by name ascending
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text search
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// Set the theme filter
    pub fn theme(mut self, theme: impl Into<FieldFilter>) -> Self {
        self.theme_filter = theme.into();
        self
    }

    /// Set the access filter
    pub fn access(mut self, access: impl Into<FieldFilter>) -> Self {
        self.access_filter = access.into();
        self
    }

    /// Set the category filter
    pub fn category(mut self, category: impl Into<FieldFilter>) -> Self {
        self.category_filter = category.into();
        self
    }

    /// Set sort key and direction
    pub fn sort(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort_key = key;
        self.sort_direction = direction;
        self
    }

    /// Set sorting from raw UI values
    ///
    /// An unrecognised key resets ordering to name ascending; an
    /// unrecognised direction alone resets to ascending.
    pub fn sort_raw(mut self, key: &str, direction: &str) -> Self {
        match SortKey::parse(key) {
            Some(key) => {
                self.sort_key = key;
                self.sort_direction = SortDirection::parse(direction).unwrap_or_default();
            }
            None => {
                self.sort_key = SortKey::default();
                self.sort_direction = SortDirection::default();
            }
        }
        self
    }

    /// Check whether every criterion is at its default
    pub fn is_unfiltered(&self) -> bool {
        self.search_text.is_empty()
            && self.theme_filter.is_all()
            && self.access_filter.is_all()
            && self.category_filter.is_all()
    }

    /// Free-text predicate
    pub fn matches_text(&self, record: &DatasetRecord) -> bool {
        [&record.name, &record.description, &record.id]
            .iter()
            .any(|field| collation::contains_ignore_case(field, &self.search_text))
    }

    /// Theme predicate
    pub fn matches_theme(&self, record: &DatasetRecord) -> bool {
        self.theme_filter.matches(&record.theme)
    }

    /// Access predicate
    pub fn matches_access(&self, record: &DatasetRecord) -> bool {
        self.access_filter.matches(record.access.as_str())
    }

    /// Category predicate
    pub fn matches_category(&self, record: &DatasetRecord) -> bool {
        self.category_filter.matches(&record.theme)
    }

    /// Conjunction of all active predicates
    pub fn matches(&self, record: &DatasetRecord) -> bool {
        self.matches_text(record)
            && self.matches_theme(record)
            && self.matches_access(record)
            && self.matches_category(record)
    }
}

impl fmt::Display for QueryCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "search={:?} theme={} access={} category={} sort={}:{}",
            self.search_text,
            self.theme_filter,
            self.access_filter,
            self.category_filter,
            self.sort_key,
            self.sort_direction
        )
    }
}
