//! Artificial latency around the query engine
//!
//! Lets a demo front end simulate a remote catalog service. The engine call
//! itself stays synchronous; only the wrapper awaits.

use crate::dataset::DatasetRecord;
use crate::query::{CatalogQueryEngine, CatalogView, QueryCriteria};
use std::time::Duration;
use tracing::trace;

/// Query engine with a fixed simulated latency
#[derive(Debug, Clone, Default)]
pub struct DelayedEngine {
    engine: CatalogQueryEngine,
    latency: Duration,
}

impl DelayedEngine {
    pub fn new(engine: CatalogQueryEngine, latency: Duration) -> Self {
        Self { engine, latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Wait for the configured latency, then run the query
    pub async fn query(&self, records: &[DatasetRecord], criteria: &QueryCriteria) -> CatalogView {
        if !self.latency.is_zero() {
            trace!(latency_ms = self.latency.as_millis() as u64, "Simulating catalog latency");
            tokio::time::sleep(self.latency).await;
        }
        self.engine.query(records, criteria)
    }

    /// The wrapped synchronous engine
    pub fn engine(&self) -> &CatalogQueryEngine {
        &self.engine
    }
}
