//! Catalog statistics for dashboard summaries
//!
//! Aggregates over the full catalog, independent of any query criteria:
//! - dataset and record totals
//! - access tier split
//! - theme and version counts
//! - most recent update

use crate::dataset::{Access, DatasetRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary figures for the whole catalog
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_datasets: usize,
    /// Sum of parsed record counts; unparseable counts contribute 0
    pub total_records: u64,
    pub public_datasets: usize,
    pub premium_datasets: usize,
    pub distinct_themes: usize,
    pub total_versions: usize,
    pub last_updated: Option<NaiveDate>,
}

impl CatalogStats {
    /// Compute statistics over a record collection
    pub fn compute(records: &[DatasetRecord]) -> Self {
        let mut stats = CatalogStats {
            total_datasets: records.len(),
            ..Default::default()
        };
        let mut themes: Vec<&str> = Vec::new();

        for record in records {
            stats.total_records = stats.total_records.saturating_add(record.quick.records());
            stats.total_versions += record.versions.len();

            match record.access {
                Access::Public => stats.public_datasets += 1,
                Access::Premium => stats.premium_datasets += 1,
            }

            if !themes.contains(&record.theme.as_str()) {
                themes.push(&record.theme);
            }

            if let Some(date) = record.quick.last_updated_date() {
                stats.last_updated = stats.last_updated.max(Some(date));
            }
        }

        stats.distinct_themes = themes.len();
        stats
    }

    /// Share of public datasets in percent
    pub fn public_share(&self) -> f64 {
        if self.total_datasets == 0 {
            return 0.0;
        }
        self.public_datasets as f64 * 100.0 / self.total_datasets as f64
    }
}

/// Format a count with comma thousands separators
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}
