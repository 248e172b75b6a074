//! Catalog query engine
//!
//! Filters, sorts and facets dataset records. Every operation is pure: the
//! input records are only borrowed and a fresh result is returned.

use super::criteria::{QueryCriteria, SortDirection, SortKey};
use crate::collation;
use crate::dataset::DatasetRecord;
use crate::monitoring::SlowQueryLogger;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;
use tracing::debug;

/// Number of records per theme
pub type FacetCounts = BTreeMap<String, usize>;

/// Everything a presentation layer needs to render one catalog view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogView {
    /// Visible records in display order
    pub records: Vec<DatasetRecord>,
    /// Per-theme counts over the full catalog
    pub facets: FacetCounts,
    /// Size of the full catalog
    pub total: usize,
}

impl CatalogView {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids of the visible records in order
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }
}

/// Catalog query engine
#[derive(Debug, Clone, Default)]
pub struct CatalogQueryEngine {
    slow_queries: Option<SlowQueryLogger>,
}

impl CatalogQueryEngine {
    /// Create a new query engine
    pub fn new() -> Self {
        Self { slow_queries: None }
    }

    /// Track query latency with the given slow query logger
    pub fn with_slow_query_logger(mut self, logger: SlowQueryLogger) -> Self {
        self.slow_queries = Some(logger);
        self
    }

    /// Filter and sort records according to the criteria
    pub fn filter_and_sort(
        &self,
        records: &[DatasetRecord],
        criteria: &QueryCriteria,
    ) -> Vec<DatasetRecord> {
        let tracker = self
            .slow_queries
            .as_ref()
            .filter(|logger| logger.is_enabled())
            .map(|logger| logger.start_query(criteria.to_string()));

        let mut results: Vec<DatasetRecord> = records
            .iter()
            .filter(|record| criteria.matches(record))
            .cloned()
            .collect();

        apply_sort(&mut results, criteria.sort_key, criteria.sort_direction);

        debug!(
            criteria = %criteria,
            scanned = records.len(),
            matched = results.len(),
            "Catalog query executed"
        );

        if let (Some(logger), Some(tracker)) = (&self.slow_queries, tracker) {
            logger.finish_query(tracker, results.len(), records.len());
        }

        results
    }

    /// Count records per theme over the unfiltered collection
    pub fn facet_counts(&self, records: &[DatasetRecord]) -> FacetCounts {
        facet_counts(records)
    }

    /// Run a query and bundle the result with facet counts
    pub fn query(&self, records: &[DatasetRecord], criteria: &QueryCriteria) -> CatalogView {
        CatalogView {
            records: self.filter_and_sort(records, criteria),
            facets: facet_counts(records),
            total: records.len(),
        }
    }
}

/// Filter and sort records with a default engine
pub fn filter_and_sort(records: &[DatasetRecord], criteria: &QueryCriteria) -> Vec<DatasetRecord> {
    CatalogQueryEngine::new().filter_and_sort(records, criteria)
}

/// Count records per theme, independent of any criteria
///
/// An empty theme is counted as its own bucket.
pub fn facet_counts(records: &[DatasetRecord]) -> FacetCounts {
    let mut counts = FacetCounts::new();
    for record in records {
        *counts.entry(record.theme.clone()).or_insert(0) += 1;
    }
    counts
}

/// Compare two records by a single sort key, ascending
pub fn compare_by(key: SortKey, a: &DatasetRecord, b: &DatasetRecord) -> CmpOrdering {
    match key {
        SortKey::Name => collation::compare(&a.name, &b.name),
        SortKey::Theme => collation::compare(&a.theme, &b.theme),
        SortKey::Access => collation::compare(a.access.as_str(), b.access.as_str()),
        SortKey::Records => a.quick.records().cmp(&b.quick.records()),
    }
}

/// Compare two records by key and direction
pub fn compare_records(
    key: SortKey,
    direction: SortDirection,
    a: &DatasetRecord,
    b: &DatasetRecord,
) -> CmpOrdering {
    let cmp = compare_by(key, a, b);
    match direction {
        SortDirection::Ascending => cmp,
        SortDirection::Descending => cmp.reverse(),
    }
}

// Stable: equal records keep their catalog order in both directions
fn apply_sort(records: &mut [DatasetRecord], key: SortKey, direction: SortDirection) {
    records.sort_by(|a, b| compare_records(key, direction, a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Access, QuickStats};
    use std::time::Duration;

    fn create_test_records() -> Vec<DatasetRecord> {
        let make = |id: &str, name: &str, theme: &str, access: Access, count: &str| DatasetRecord {
            id: id.to_string(),
            name: name.to_string(),
            theme: theme.to_string(),
            access,
            versions: vec!["2024".to_string()],
            description: format!("{} description", name),
            variables: vec!["state".to_string()],
            quick: QuickStats::new(count, "2024-01-01"),
        };

        vec![
            make("b1", "beta", "health", Access::Public, "2,000"),
            make("a1", "Alpha", "labour", Access::Premium, "10,000"),
            make("c1", "gamma", "health", Access::Public, "not counted"),
            make("d1", "Delta", "", Access::Public, "2,000"),
        ]
    }

    #[test]
    fn test_empty_criteria_returns_all_sorted_by_name() {
        let engine = CatalogQueryEngine::new();
        let results = engine.filter_and_sort(&create_test_records(), &QueryCriteria::new());

        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta", "Delta", "gamma"]);
    }

    #[test]
    fn test_empty_input() {
        let engine = CatalogQueryEngine::new();
        assert!(engine.filter_and_sort(&[], &QueryCriteria::new()).is_empty());
        assert!(engine.facet_counts(&[]).is_empty());
    }

    #[test]
    fn test_text_search_covers_id_and_description() {
        let records = create_test_records();
        let by_id = filter_and_sort(&records, &QueryCriteria::new().search("C1"));
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].id, "c1");

        let by_description = filter_and_sort(&records, &QueryCriteria::new().search("DELTA DESC"));
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, "d1");
    }

    #[test]
    fn test_theme_and_category_are_independent() {
        let records = create_test_records();

        let health = filter_and_sort(&records, &QueryCriteria::new().theme("health"));
        assert_eq!(health.len(), 2);

        let contradictory = QueryCriteria::new().theme("health").category("labour");
        assert!(filter_and_sort(&records, &contradictory).is_empty());

        let agreeing = QueryCriteria::new().theme("health").category("health");
        assert_eq!(filter_and_sort(&records, &agreeing).len(), 2);
    }

    #[test]
    fn test_access_filter() {
        let records = create_test_records();
        let premium = filter_and_sort(&records, &QueryCriteria::new().access("premium"));
        assert_eq!(premium.len(), 1);
        assert_eq!(premium[0].id, "a1");

        let unknown = filter_and_sort(&records, &QueryCriteria::new().access("gold"));
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_sort_by_records_treats_unparseable_as_zero() {
        let records = create_test_records();
        let criteria = QueryCriteria::new().sort(SortKey::Records, SortDirection::Ascending);
        let results = filter_and_sort(&records, &criteria);

        assert_eq!(results[0].id, "c1");
        assert_eq!(results[3].id, "a1");
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let records = create_test_records();

        // b1 and d1 share a record count and keep catalog order
        let asc_criteria = QueryCriteria::new().sort(SortKey::Records, SortDirection::Ascending);
        let asc = filter_and_sort(&records, &asc_criteria);
        let ids: Vec<&str> = asc.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "b1", "d1", "a1"]);

        let desc_criteria = QueryCriteria::new().sort(SortKey::Records, SortDirection::Descending);
        let desc = filter_and_sort(&records, &desc_criteria);
        let ids: Vec<&str> = desc.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b1", "d1", "c1"]);
    }

    #[test]
    fn test_sort_by_theme_descending() {
        let records = create_test_records();
        let criteria = QueryCriteria::new().sort(SortKey::Theme, SortDirection::Descending);
        let results = filter_and_sort(&records, &criteria);

        let themes: Vec<&str> = results.iter().map(|r| r.theme.as_str()).collect();
        assert_eq!(themes, vec!["labour", "health", "health", ""]);
    }

    #[test]
    fn test_facet_counts_include_empty_theme() {
        let facets = facet_counts(&create_test_records());
        assert_eq!(facets.get("health"), Some(&2));
        assert_eq!(facets.get("labour"), Some(&1));
        assert_eq!(facets.get(""), Some(&1));
    }

    #[test]
    fn test_query_view_keeps_full_facets() {
        let engine = CatalogQueryEngine::new();
        let records = create_test_records();
        let view = engine.query(&records, &QueryCriteria::new().search("zzz"));

        assert!(view.is_empty());
        assert_eq!(view.total, 4);
        assert_eq!(view.facets.values().sum::<usize>(), 4);
    }

    #[test]
    fn test_slow_query_logger_receives_queries() {
        let logger = SlowQueryLogger::new(Duration::ZERO, true);
        let engine = CatalogQueryEngine::new().with_slow_query_logger(logger.clone());

        engine.filter_and_sort(&create_test_records(), &QueryCriteria::new().theme("health"));

        let slow = logger.get_slow_queries(1);
        assert_eq!(slow.len(), 1);
        assert_eq!(slow[0].matched, 2);
        assert_eq!(slow[0].scanned, 4);
        assert!(slow[0].criteria.contains("theme=health"));
    }
}
