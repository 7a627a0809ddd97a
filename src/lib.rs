//! Crawl-Ledger: the per-URL crawl-state record model
//!
//! This crate implements the record model shared by the stages of a crawling
//! pipeline: one record per discovered URL, carrying fetch scheduling state,
//! content, links, timestamps and derived signals. The fetch scheduler, parser
//! and indexer all mutate the same record in turn and hand it back to the
//! backing store between stages.

pub mod config;
pub mod datetime;
pub mod metrics;
pub mod record;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Crawl-Ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed reversed key: {0}")]
    MalformedKey(String),
}

/// Result type alias for Crawl-Ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::ModelConfig;
pub use record::{CrawlRecord, CrawlStatus, HyperLink, Mark, Sequencer};
pub use storage::{RecordDb, SqliteStore, Store};
pub use url::{reverse_url, reverse_url_or_empty, unreverse_url};
