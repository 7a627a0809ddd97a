use crate::config::types::Config;
use crate::datetime::{epoch, parse_instant};
use crate::ConfigError;

/// Validates a parsed configuration
///
/// Checks the structural constraints the record model relies on: the link
/// bound must survive oldest-third eviction, the priority depth base must be
/// positive, and the plausibility-window floor must be a real instant.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let model = &config.model;

    if model.max_links_per_page < 3 {
        return Err(ConfigError::Validation(format!(
            "max-links-per-page must be at least 3, got {}",
            model.max_links_per_page
        )));
    }

    if model.fetch_priority_depth_base <= 0 {
        return Err(ConfigError::Validation(format!(
            "fetch-priority-depth-base must be positive, got {}",
            model.fetch_priority_depth_base
        )));
    }

    if model.fetch_priority_default <= 0 {
        return Err(ConfigError::Validation(format!(
            "fetch-priority-default must be positive, got {}",
            model.fetch_priority_default
        )));
    }

    if model.time_history_cap == 0 {
        return Err(ConfigError::Validation(
            "time-history-cap must be at least 1".to_string(),
        ));
    }

    if parse_instant(&model.min_publish_time, epoch()) == epoch() {
        return Err(ConfigError::Validation(format!(
            "min-publish-time is not a valid instant: {}",
            model.min_publish_time
        )));
    }

    if config.metrics.default_limit == 0 {
        return Err(ConfigError::Validation(
            "metrics default-limit must be at least 1".to_string(),
        ));
    }

    if config.storage.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "storage database-path must not be empty".to_string(),
        ));
    }

    Ok(())
}
