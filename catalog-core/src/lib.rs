//! Catalog Core - dataset catalog model and query engine
//!
//! This crate provides the building blocks of the microdata catalog:
//! - Dataset records and the shipped seed catalog
//! - Search, filter, sort and facet queries over records
//! - Dashboard statistics and display-only API request templates
//! - UI preference storage, configuration and logging

pub mod collation;
pub mod config;
pub mod dataset;
pub mod delay;
pub mod monitoring;
pub mod query;
pub mod request;
pub mod seed;
pub mod settings;
pub mod stats;

pub use config::*;
pub use dataset::*;
pub use delay::DelayedEngine;
pub use monitoring::*;
pub use query::*;
pub use request::{DownloadFormat, ExportTemplate, MockResponse, RequestError, RequestTemplate};
pub use seed::{seed_catalog, seed_records};
pub use settings::*;
pub use stats::CatalogStats;
