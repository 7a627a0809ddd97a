use crate::datetime::parse_instant;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Main configuration structure for Crawl-Ledger
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Tunables of the record model itself
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Upper bound on the discovered-links FIFO of a single record
    #[serde(rename = "max-links-per-page", default = "default_max_links")]
    pub max_links_per_page: usize,

    /// Distances below this base earn a priority boost of `base - distance`
    #[serde(rename = "fetch-priority-depth-base", default = "default_depth_base")]
    pub fetch_priority_depth_base: i32,

    /// Priority assumed when a record carries none (stored value <= 0)
    #[serde(rename = "fetch-priority-default", default = "default_priority")]
    pub fetch_priority_default: i32,

    /// Earliest instant accepted as a plausible publish/modify time
    #[serde(rename = "min-publish-time", default = "default_min_publish_time")]
    pub min_publish_time: String,

    /// Number of instants kept in fetch/index time-history strings
    #[serde(rename = "time-history-cap", default = "default_history_cap")]
    pub time_history_cap: usize,
}

/// Storage backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

/// Link-listing endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// The well-known URL whose live links the listing reports
    #[serde(rename = "home-url", default = "default_home_url")]
    pub home_url: String,

    /// Maximum entries returned when the caller names no limit
    #[serde(rename = "default-limit", default = "default_limit")]
    pub default_limit: usize,
}

impl ModelConfig {
    /// The lower bound of the plausibility window as an instant
    ///
    /// Falls back to the built-in default when the configured string does not
    /// parse; [`crate::config::validate`] rejects such a config up front.
    pub fn min_publish_instant(&self) -> DateTime<Utc> {
        let fallback = Utc.with_ymd_and_hms(1995, 1, 1, 0, 0, 0).unwrap();
        parse_instant(&self.min_publish_time, fallback)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_links_per_page: default_max_links(),
            fetch_priority_depth_base: default_depth_base(),
            fetch_priority_default: default_priority(),
            min_publish_time: default_min_publish_time(),
            time_history_cap: default_history_cap(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            default_limit: default_limit(),
        }
    }
}

fn default_max_links() -> usize {
    1000
}

fn default_depth_base() -> i32 {
    10
}

fn default_priority() -> i32 {
    5
}

fn default_min_publish_time() -> String {
    "1995-01-01T00:00:00Z".to_string()
}

fn default_history_cap() -> usize {
    10
}

fn default_database_path() -> String {
    "crawl-ledger.db".to_string()
}

fn default_home_url() -> String {
    "https://internal.crawl-ledger/metrics".to_string()
}

fn default_limit() -> usize {
    1000
}
