use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// The built-in configuration, used when no file is given
pub const DEFAULT_CONFIG: &str = include_str!("defaults.toml");

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use image_soup::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Keeping {} images per crawler", config.imageserver.crawler_upkeep);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration content
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Parses the built-in configuration
pub fn default_config() -> Result<Config, ConfigError> {
    parse_config(DEFAULT_CONFIG)
}

/// Computes a hex-encoded SHA-256 hash of configuration content
pub fn hash_config(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads a configuration and returns both the config and its hash
///
/// Without a path the built-in configuration is used.
pub fn load_config_with_hash(path: Option<&Path>) -> Result<(Config, String), ConfigError> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok((parse_config(&content)?, hash_config(&content)))
        }
        None => Ok((default_config()?, hash_config(DEFAULT_CONFIG))),
    }
}
