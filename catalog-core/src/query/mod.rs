//! Catalog query engine
//!
//! This module provides search, filtering, sorting and faceting over
//! dataset records

pub mod criteria;
pub mod executor;

pub use criteria::{FieldFilter, QueryCriteria, SortDirection, SortKey, WILDCARD};
pub use executor::{
    compare_by, compare_records, facet_counts, filter_and_sort, CatalogQueryEngine, CatalogView,
    FacetCounts,
};
