//! Configuration handling
//!
//! The record model's tunables (link registry bound, priority depth base,
//! plausibility window, history cap) and the storage/metrics settings are
//! loaded from a TOML file. Every table and field has a default, so an empty
//! file yields a working configuration.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, MetricsConfig, ModelConfig, StorageConfig};
pub use validation::validate;
