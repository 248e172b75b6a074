//! Display-only API request templates
//!
//! Renders what a user could send to the microdata API for a dataset
//! selection. Nothing here performs a request.
//! - RequestTemplate: aggregate query URL, cURL command and a mock response
//! - ExportTemplate: bulk download and raw data URLs

use crate::dataset::DatasetRecord;
use crate::query::WILDCARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

/// Path of the query endpoint
pub const QUERY_ENDPOINT: &str = "/api/v1/query";

/// Path of the bulk download endpoint
pub const DOWNLOAD_ENDPOINT: &str = "/api/v1/download";

/// Path of the raw data endpoint
pub const DATA_ENDPOINT: &str = "/api/v1/data";

/// Disclosure note attached to every mock response
pub const PRIVACY_NOTE: &str = "Cells with n < 10 are suppressed for privacy protection";

/// Group labels of the mock response rows
const MOCK_GROUPS: [&str; 3] = ["Employed", "Unemployed", "Out of labour force"];

/// Default grouping for new templates
pub const DEFAULT_GROUP_BY: &str = "employment_status";

/// Default metric for new templates
pub const DEFAULT_METRIC: &str = "count";

/// Placeholder shown in place of a real API key
pub const API_KEY_PLACEHOLDER: &str = "<YOUR_API_KEY>";

/// Parameters of one illustrative query request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTemplate {
    pub dataset: String,
    pub version: String,
    /// Active filters; wildcard and empty values are never stored
    pub filters: BTreeMap<String, String>,
    pub group_by: String,
    pub metrics: Vec<String>,
}

impl RequestTemplate {
    /// Template for a dataset at its most recent version
    pub fn for_dataset(record: &DatasetRecord) -> Self {
        Self {
            dataset: record.id.clone(),
            version: record.latest_version().unwrap_or_default().to_string(),
            filters: BTreeMap::new(),
            group_by: DEFAULT_GROUP_BY.to_string(),
            metrics: vec![DEFAULT_METRIC.to_string()],
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a filter; "all" or an empty value removes it instead
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        if value.is_empty() || value == WILDCARD {
            self.filters.remove(&field);
        } else {
            self.filters.insert(field, value);
        }
        self
    }

    /// Replace filters from a JSON object of string values
    pub fn with_filters_json(mut self, json: &str) -> Result<Self, RequestError> {
        let parsed: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(|e| RequestError::InvalidFilters(e.to_string()))?;

        self.filters.clear();
        for (field, value) in parsed {
            self = self.filter(field, value);
        }
        Ok(self)
    }

    pub fn group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = group_by.into();
        self
    }

    /// Set metrics from a comma separated list
    pub fn metrics(mut self, metrics: &str) -> Self {
        self.metrics = metrics
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Filters rendered as a JSON object
    pub fn filters_json(&self) -> String {
        serde_json::to_string(&self.filters).unwrap_or_else(|_| "{}".to_string())
    }

    /// Endpoint path with encoded query string
    pub fn path(&self) -> String {
        let filters = self.filters_json();
        let metrics = self.metrics.join(",");
        let params = [
            ("dataset", self.dataset.as_str()),
            ("version", self.version.as_str()),
            ("filters", filters.as_str()),
            ("group_by", self.group_by.as_str()),
            ("metrics", metrics.as_str()),
        ];

        format!("{}?{}", QUERY_ENDPOINT, encode_query(params))
    }

    /// Absolute URL under the given origin
    pub fn url(&self, origin: &str) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.path())
    }

    /// cURL command for the request
    pub fn curl(&self, origin: &str) -> String {
        format!(
            "curl -H \"Authorization: Bearer {}\" \"{}\"",
            API_KEY_PLACEHOLDER,
            self.url(origin)
        )
    }

    /// Canned response for this request, stamped with the current time
    pub fn mock_response(&self) -> MockResponse {
        self.mock_response_at(Utc::now())
    }

    /// Canned response for this request
    ///
    /// Rows carry one column per requested metric. Only `count` and
    /// `avg_wage` have sample values; other metrics are null.
    pub fn mock_response_at(&self, generated_at: DateTime<Utc>) -> MockResponse {
        let rows = MOCK_GROUPS
            .iter()
            .enumerate()
            .map(|(row, label)| {
                let mut columns = Map::new();
                columns.insert(self.group_by.clone(), Value::from(*label));
                for metric in &self.metrics {
                    columns.insert(metric.clone(), mock_metric(metric, row));
                }
                columns
            })
            .collect();

        MockResponse {
            dataset: self.dataset.clone(),
            version: self.version.clone(),
            group_by: vec![self.group_by.clone()],
            metrics: self.metrics.clone(),
            rows,
            suppressed: false,
            generated_at,
            privacy_note: PRIVACY_NOTE.to_string(),
        }
    }
}

fn mock_metric(metric: &str, row: usize) -> Value {
    match (metric, row) {
        ("count", 0) => Value::from(123_456u64),
        ("count", 1) => Value::from(7_890u64),
        ("count", _) => Value::from(45_123u64),
        ("avg_wage", 0) => Value::from(25_000u64),
        _ => Value::Null,
    }
}

/// Response body shown for a request that was never sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockResponse {
    pub dataset: String,
    pub version: String,
    pub group_by: Vec<String>,
    pub metrics: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
    pub suppressed: bool,
    pub generated_at: DateTime<Utc>,
    pub privacy_note: String,
}

/// File format offered for bulk downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFormat {
    #[default]
    Csv,
    Json,
    Parquet,
    Excel,
}

impl DownloadFormat {
    pub const ALL: [DownloadFormat; 4] = [
        DownloadFormat::Csv,
        DownloadFormat::Json,
        DownloadFormat::Parquet,
        DownloadFormat::Excel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadFormat::Csv => "csv",
            DownloadFormat::Json => "json",
            DownloadFormat::Parquet => "parquet",
            DownloadFormat::Excel => "excel",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DownloadFormat::Csv => "Comma-separated values",
            DownloadFormat::Json => "JavaScript Object Notation",
            DownloadFormat::Parquet => "Columnar storage format",
            DownloadFormat::Excel => "Microsoft Excel format",
        }
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadFormat {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DownloadFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or(RequestError::UnknownFormat(wanted))
    }
}

/// Bulk download and raw data request for one dataset
///
/// Variables are checked against the dataset's own variable list. An empty
/// selection means every variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTemplate<'a> {
    record: &'a DatasetRecord,
    version: String,
    format: DownloadFormat,
    variables: Vec<String>,
    filters: BTreeMap<String, String>,
}

impl<'a> ExportTemplate<'a> {
    /// Template for a dataset at its most recent version, as CSV
    pub fn for_dataset(record: &'a DatasetRecord) -> Self {
        Self {
            record,
            version: record.latest_version().unwrap_or_default().to_string(),
            format: DownloadFormat::default(),
            variables: Vec::new(),
            filters: BTreeMap::new(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn format(mut self, format: DownloadFormat) -> Self {
        self.format = format;
        self
    }

    /// Selected variables in selection order
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    /// Add variables to the selection
    pub fn select_variables<I, S>(mut self, names: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if !self.record.variables.iter().any(|v| v == name) {
                return Err(RequestError::UnknownVariable {
                    dataset: self.record.id.clone(),
                    variable: name.to_string(),
                });
            }
            if !self.variables.iter().any(|v| v == name) {
                self.variables.push(name.to_string());
            }
        }
        Ok(self)
    }

    /// Select or deselect one variable
    pub fn toggle_variable(mut self, name: &str) -> Result<Self, RequestError> {
        match self.variables.iter().position(|v| v == name) {
            Some(index) => {
                self.variables.remove(index);
                Ok(self)
            }
            None => self.select_variables([name]),
        }
    }

    /// Select every variable of the dataset in catalog order
    pub fn select_all(mut self) -> Self {
        self.variables = self.record.variables.clone();
        self
    }

    /// Clear the selection when everything is selected, otherwise select all
    pub fn toggle_all(mut self) -> Self {
        if self.variables.len() == self.record.variables.len() {
            self.variables.clear();
            self
        } else {
            self.select_all()
        }
    }

    /// Add a filter; an empty value removes it instead
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        if value.is_empty() {
            self.filters.remove(&field);
        } else {
            self.filters.insert(field, value);
        }
        self
    }

    /// Bulk download path, e.g. `/api/v1/download?dataset=plfs&version=..&format=csv`
    pub fn download_path(&self) -> String {
        let variables = self.variables.join(",");
        let mut params = vec![
            ("dataset", self.record.id.as_str()),
            ("version", self.version.as_str()),
            ("format", self.format.as_str()),
        ];
        if !variables.is_empty() {
            params.push(("variables", variables.as_str()));
        }
        params.extend(self.filters.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        format!("{}?{}", DOWNLOAD_ENDPOINT, encode_query(params))
    }

    /// Raw data path; the selection is sent as `fields`
    pub fn data_path(&self) -> String {
        let fields = self.variables.join(",");
        let mut params = vec![
            ("dataset", self.record.id.as_str()),
            ("version", self.version.as_str()),
        ];
        if !fields.is_empty() {
            params.push(("fields", fields.as_str()));
        }
        params.extend(self.filters.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        format!("{}?{}", DATA_ENDPOINT, encode_query(params))
    }

    pub fn download_url(&self, origin: &str) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.download_path())
    }

    pub fn data_url(&self, origin: &str) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.data_path())
    }
}

fn encode_query<'p, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'p str, &'p str)>,
{
    params
        .into_iter()
        .map(|(key, value)| format!("{}={}", form_encode(key), form_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Encode a value as application/x-www-form-urlencoded
///
/// Unreserved characters are `A-Z a-z 0-9 * - . _`; space becomes `+`.
pub fn form_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}

/// Request template errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid filters JSON: {0}")]
    InvalidFilters(String),

    #[error("Unknown download format: {0} (expected csv, json, parquet or excel)")]
    UnknownFormat(String),

    #[error("Dataset {dataset} has no variable named {variable}")]
    UnknownVariable { dataset: String, variable: String },
}
