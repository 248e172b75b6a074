//! Structured logging with tracing
//!
//! Provides configurable logging with JSON output and slow query logging

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Maximum number of slow queries retained for reporting
const MAX_RETAINED_SLOW_QUERIES: usize = 1000;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub level: String,

    /// Enable JSON format output
    pub json_format: bool,

    /// Enable slow query logging
    pub slow_query_logging: bool,

    /// Slow query threshold in milliseconds
    pub slow_query_threshold_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            json_format: false,
            slow_query_logging: true,
            slow_query_threshold_ms: 100,
        }
    }
}

impl LoggingConfig {
    /// Parse log level from string
    pub fn parse_level(&self) -> Level {
        match self.level.to_uppercase().as_str() {
            "ERROR" => Level::ERROR,
            "WARN" => Level::WARN,
            "INFO" => Level::INFO,
            "DEBUG" => Level::DEBUG,
            "TRACE" => Level::TRACE,
            _ => Level::INFO,
        }
    }

    /// Build the slow query logger described by this configuration
    pub fn slow_query_logger(&self) -> SlowQueryLogger {
        SlowQueryLogger::new(
            Duration::from_millis(self.slow_query_threshold_ms),
            self.slow_query_logging,
        )
    }
}

/// Initialize the logging system
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_logging(config: &LoggingConfig) -> Result<SlowQueryLogger> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.parse_level().as_str().to_lowercase()));

    let subscriber = Registry::default().with(env_filter);

    let init_result = if config.json_format {
        let json_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr);

        subscriber.with(json_layer).try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact();

        subscriber.with(fmt_layer).try_init()
    };

    init_result.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!(
        level = %config.level,
        json = config.json_format,
        slow_queries = config.slow_query_logging,
        "Logging initialized"
    );

    Ok(config.slow_query_logger())
}

/// Slow query record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlowQuery {
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub criteria: String,
    pub matched: usize,
    pub scanned: usize,
}

/// Slow query statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowQueryStats {
    pub total_count: usize,
    pub avg_duration_ms: u64,
    pub max_duration_ms: u64,
    pub threshold_ms: u64,
}

/// Catalog query execution tracker
pub struct QueryTracker {
    start_time: Instant,
    criteria: String,
}

/// Records catalog queries that exceed a latency threshold
#[derive(Debug, Clone)]
pub struct SlowQueryLogger {
    threshold: Duration,
    enabled: bool,
    queries: Arc<RwLock<Vec<SlowQuery>>>,
}

impl SlowQueryLogger {
    /// Create a new slow query logger
    pub fn new(threshold: Duration, enabled: bool) -> Self {
        Self {
            threshold,
            enabled,
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Logger that never records anything
    pub fn disabled() -> Self {
        Self::new(Duration::MAX, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start tracking a query
    pub fn start_query(&self, criteria: impl Into<String>) -> QueryTracker {
        QueryTracker {
            start_time: Instant::now(),
            criteria: criteria.into(),
        }
    }

    /// Finish tracking a query and log it if slow
    pub fn finish_query(&self, tracker: QueryTracker, matched: usize, scanned: usize) {
        self.record(tracker.criteria, tracker.start_time.elapsed(), matched, scanned);
    }

    fn record(&self, criteria: String, duration: Duration, matched: usize, scanned: usize) {
        if !self.enabled || duration < self.threshold {
            return;
        }

        let slow_query = SlowQuery {
            timestamp: Utc::now(),
            duration_ms: duration.as_millis() as u64,
            criteria,
            matched,
            scanned,
        };

        tracing::warn!(
            target: "slow_query",
            duration_ms = slow_query.duration_ms,
            criteria = %slow_query.criteria,
            matched = slow_query.matched,
            scanned = slow_query.scanned,
            "Slow catalog query detected"
        );

        let mut queries = self.queries.write();
        queries.push(slow_query);

        if queries.len() > MAX_RETAINED_SLOW_QUERIES {
            let len = queries.len();
            queries.drain(0..len - MAX_RETAINED_SLOW_QUERIES);
        }
    }

    /// Get recent slow queries, newest first
    pub fn get_slow_queries(&self, limit: usize) -> Vec<SlowQuery> {
        let queries = self.queries.read();
        queries.iter().rev().take(limit).cloned().collect()
    }

    /// Get slow query statistics
    pub fn get_stats(&self) -> SlowQueryStats {
        let queries = self.queries.read();
        let threshold_ms = self.threshold.as_millis().min(u64::MAX as u128) as u64;

        if queries.is_empty() {
            return SlowQueryStats {
                total_count: 0,
                avg_duration_ms: 0,
                max_duration_ms: 0,
                threshold_ms,
            };
        }

        let total_count = queries.len();
        let total_duration: u64 = queries.iter().map(|q| q.duration_ms).sum();
        let max_duration = queries.iter().map(|q| q.duration_ms).max().unwrap_or(0);

        SlowQueryStats {
            total_count,
            avg_duration_ms: total_duration / total_count as u64,
            max_duration_ms: max_duration,
            threshold_ms,
        }
    }
}

impl Default for SlowQueryLogger {
    fn default() -> Self {
        LoggingConfig::default().slow_query_logger()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        let mut config = LoggingConfig::default();
        assert_eq!(config.parse_level(), Level::INFO);

        config.level = "debug".to_string();
        assert_eq!(config.parse_level(), Level::DEBUG);

        config.level = "verbose".to_string();
        assert_eq!(config.parse_level(), Level::INFO);
    }

    #[test]
    fn test_zero_threshold_records_every_query() {
        let logger = SlowQueryLogger::new(Duration::ZERO, true);
        let tracker = logger.start_query("search=\"labour\"");
        logger.finish_query(tracker, 1, 6);

        let queries = logger.get_slow_queries(10);
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].matched, 1);
        assert_eq!(queries[0].scanned, 6);
        assert_eq!(logger.get_stats().total_count, 1);
    }

    #[test]
    fn test_fast_queries_not_recorded() {
        let logger = SlowQueryLogger::new(Duration::from_secs(60), true);
        let tracker = logger.start_query("fast");
        logger.finish_query(tracker, 6, 6);

        assert!(logger.get_slow_queries(10).is_empty());
        assert_eq!(logger.get_stats().threshold_ms, 60_000);
    }

    #[test]
    fn test_disabled_logger_ignores_queries() {
        let logger = SlowQueryLogger::new(Duration::ZERO, false);
        logger.record("q".to_string(), Duration::from_secs(5), 0, 0);
        assert_eq!(logger.get_stats().total_count, 0);
    }

    #[test]
    fn test_retention_is_bounded() {
        let logger = SlowQueryLogger::new(Duration::ZERO, true);
        for i in 0..(MAX_RETAINED_SLOW_QUERIES + 5) {
            logger.record(format!("q{}", i), Duration::from_millis(i as u64), 0, 0);
        }

        let newest = logger.get_slow_queries(1);
        assert_eq!(newest[0].criteria, format!("q{}", MAX_RETAINED_SLOW_QUERIES + 4));
        assert_eq!(logger.get_stats().total_count, MAX_RETAINED_SLOW_QUERIES);
    }
}
