use crate::config::types::{Config, CrawlerEntry, ImageServerConfig, LoggingConfig, WebServerConfig};
use crate::ConfigError;

/// Log levels accepted by `[logging] level`
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validates the entire configuration
///
/// Covers everything that can be checked without a crawler registry. Crawler
/// names and settings are checked when the pool is built.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_webserver_config(&config.webserver)?;
    validate_imageserver_config(&config.imageserver)?;
    validate_logging_config(&config.logging)?;
    validate_crawlers(&config.crawlers)?;
    Ok(())
}

fn validate_webserver_config(config: &WebServerConfig) -> Result<(), ConfigError> {
    if config.hostname.trim().is_empty() {
        return Err(ConfigError::Validation(
            "hostname cannot be empty".to_string(),
        ));
    }

    // u16 already caps the upper bound
    if config.port == 0 {
        return Err(ConfigError::Validation(
            "port must be between 1 and 65535, got 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_imageserver_config(config: &ImageServerConfig) -> Result<(), ConfigError> {
    if config.crawler_upkeep < 1 {
        return Err(ConfigError::Validation(format!(
            "crawler-upkeep must be >= 1, got {}",
            config.crawler_upkeep
        )));
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    if !LEVELS.contains(&config.level.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::Validation(format!(
            "logging level must be one of {}, got '{}'",
            LEVELS.join(", "),
            config.level
        )));
    }

    Ok(())
}

/// Validates crawler entries
fn validate_crawlers(crawlers: &[CrawlerEntry]) -> Result<(), ConfigError> {
    if crawlers.is_empty() {
        return Err(ConfigError::Validation(
            "at least one crawler must be configured".to_string(),
        ));
    }

    for entry in crawlers {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "crawler name cannot be empty".to_string(),
            ));
        }

        if !entry.weight.is_finite() || entry.weight <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "weight of crawler '{}' must be greater than 0, got {}",
                entry.name, entry.weight
            )));
        }
    }

    Ok(())
}
