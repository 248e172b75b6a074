use anyhow::{anyhow, Context, Result};
use catalog_core::{
    seed_catalog, Catalog, CatalogConfig, CatalogQueryEngine, CatalogView, DatasetRecord,
    DelayedEngine, PreferenceStore, QueryCriteria, SettingsManager, SlowQueryLogger,
    TomlFileStore,
};
use tracing::debug;

/// Everything a command needs: the catalog, the engine and the preferences
pub struct CatalogContext {
    catalog: Catalog,
    engine: DelayedEngine,
    settings: SettingsManager,
    config: CatalogConfig,
}

impl CatalogContext {
    /// Build a context backed by the configured preference file
    pub fn new(config: CatalogConfig, slow_queries: SlowQueryLogger) -> Result<Self> {
        let store = TomlFileStore::new(config.preferences.path.clone());
        Self::with_store(config, Box::new(store), slow_queries)
    }

    pub fn with_store(
        config: CatalogConfig,
        store: Box<dyn PreferenceStore>,
        slow_queries: SlowQueryLogger,
    ) -> Result<Self> {
        let catalog = seed_catalog().context("Shipped catalog is invalid")?;
        let engine = DelayedEngine::new(
            CatalogQueryEngine::new().with_slow_query_logger(slow_queries),
            config.engine.simulated_latency(),
        );
        let settings = SettingsManager::init(store, config.preferences.system_prefers_dark);

        debug!(
            datasets = catalog.len(),
            latency_ms = config.engine.simulated_latency_ms,
            "Catalog context ready"
        );

        Ok(Self {
            catalog,
            engine,
            settings,
            config,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Run a query against the full catalog
    pub async fn query(&self, criteria: &QueryCriteria) -> CatalogView {
        self.engine.query(self.catalog.records(), criteria).await
    }

    /// Look up a dataset, suggesting close ids when it does not exist
    pub fn find(&self, id: &str) -> Result<&DatasetRecord> {
        if let Some(record) = self.catalog.get(id) {
            return Ok(record);
        }

        let needle = id.to_lowercase();
        let suggestions: Vec<&str> = self
            .catalog
            .records()
            .iter()
            .filter(|r| r.id.contains(&needle) || needle.contains(&r.id))
            .map(|r| r.id.as_str())
            .collect();

        if suggestions.is_empty() {
            Err(anyhow!("Dataset not found: {}", id))
        } else {
            Err(anyhow!(
                "Dataset not found: {} (did you mean: {}?)",
                id,
                suggestions.join(", ")
            ))
        }
    }
}
