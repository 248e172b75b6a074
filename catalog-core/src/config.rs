//! Configuration management for the catalog
//!
//! This module provides:
//! - TOML configuration with defaults for every section
//! - Configuration validation
//! - Conversion into the query criteria and engine defaults

use crate::monitoring::LoggingConfig;
use crate::query::{QueryCriteria, SortDirection, SortKey};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for simulated latency
pub const MAX_SIMULATED_LATENCY_MS: u64 = 60_000;

/// Catalog configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Query engine settings
    pub engine: EngineSettings,
    /// Preference store settings
    pub preferences: PreferenceSettings,
    /// Request template settings
    pub request: RequestSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Simulated latency before each query, in milliseconds
    pub simulated_latency_ms: u64,
    /// Sort key used when none is given
    pub default_sort_key: SortKey,
    /// Sort direction used when none is given
    pub default_sort_direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceSettings {
    /// Preference file path
    pub path: PathBuf,
    /// Fallback when no theme was saved yet
    pub system_prefers_dark: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSettings {
    /// Origin prefixed to rendered API URLs
    pub origin: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            simulated_latency_ms: 0,
            default_sort_key: SortKey::Name,
            default_sort_direction: SortDirection::Ascending,
        }
    }
}

impl Default for PreferenceSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catalog-preferences.toml"),
            system_prefers_dark: false,
        }
    }
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
        }
    }
}

impl EngineSettings {
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    /// Criteria carrying the configured default ordering
    pub fn default_criteria(&self) -> QueryCriteria {
        QueryCriteria::new().sort(self.default_sort_key, self.default_sort_direction)
    }
}

impl CatalogConfig {
    /// Load configuration, falling back to defaults when the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: CatalogConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.engine.simulated_latency_ms > MAX_SIMULATED_LATENCY_MS {
            return Err(anyhow::anyhow!(
                "Simulated latency cannot exceed {} ms",
                MAX_SIMULATED_LATENCY_MS
            ));
        }

        if self.logging.slow_query_logging && self.logging.slow_query_threshold_ms == 0 {
            return Err(anyhow::anyhow!(
                "Slow query threshold cannot be 0 when slow query logging is enabled"
            ));
        }

        let origin = self.request.origin.as_str();
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(anyhow::anyhow!("Request origin must start with http:// or https://"));
        }

        if self.preferences.path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("Preference file path cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert_eq!(config.engine.simulated_latency_ms, 0);
        assert_eq!(config.engine.default_sort_key, SortKey::Name);
        assert!(!config.preferences.system_prefers_dark);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CatalogConfig::default();
        config.engine.simulated_latency_ms = MAX_SIMULATED_LATENCY_MS + 1;
        assert!(config.validate().is_err());

        let mut config = CatalogConfig::default();
        config.request.origin = "ftp://example.org".to_string();
        assert!(config.validate().is_err());

        let mut config = CatalogConfig::default();
        config.logging.slow_query_threshold_ms = 0;
        assert!(config.validate().is_err());
        config.logging.slow_query_logging = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = CatalogConfig::load(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("catalog.toml");

        let mut config = CatalogConfig::default();
        config.engine.default_sort_key = SortKey::Records;
        config.engine.default_sort_direction = SortDirection::Descending;
        config.logging.json_format = true;
        config.save(&path).unwrap();

        let loaded = CatalogConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.engine.default_criteria().sort_key, SortKey::Records);
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "[engine]\nsimulated_latency_ms = 250\ndefault_sort_key = \"theme\"\n",
        )
        .unwrap();

        let config = CatalogConfig::load(&path).unwrap();
        assert_eq!(config.engine.simulated_latency(), Duration::from_millis(250));
        assert_eq!(config.engine.default_sort_key, SortKey::Theme);
        assert_eq!(config.engine.default_sort_direction, SortDirection::Ascending);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.toml");
        std::fs::write(&path, "[request]\norigin = \"localhost\"\n").unwrap();

        assert!(CatalogConfig::load(&path).is_err());
    }
}
