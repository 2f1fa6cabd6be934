use crate::imagecrawler::CrawlerConfig;
use serde::{Deserialize, Serialize};

/// Main configuration structure for Image-Soup
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub webserver: WebServerConfig,
    pub imageserver: ImageServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub crawlers: Vec<CrawlerEntry>,
}

/// HTTP front end configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebServerConfig {
    /// Address to bind to
    pub hostname: String,

    /// Port to bind to
    pub port: u16,
}

/// Image server behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageServerConfig {
    /// Number of images every crawler is kept filled up to
    #[serde(rename = "crawler-upkeep", default = "default_crawler_upkeep")]
    pub crawler_upkeep: usize,

    /// Minimum seconds between two accepted resets
    #[serde(rename = "reset-timeout", default = "default_reset_timeout")]
    pub reset_timeout: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default level filter, overridden by `-v` / `-q` and `RUST_LOG`
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// One crawler to register with the pool
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerEntry {
    /// Registry name of the crawler
    pub name: String,

    /// Selection weight relative to the other crawlers
    #[serde(default = "default_weight")]
    pub weight: f64,

    #[serde(rename = "restart-at-front-when-exhausted", default)]
    pub restart_at_front_when_exhausted: bool,

    /// Settings handed to the crawler
    #[serde(default)]
    pub config: CrawlerConfig,
}

fn default_crawler_upkeep() -> usize {
    crate::server::KEEP_DEFAULT
}

fn default_reset_timeout() -> u64 {
    crate::server::RESET_TIMEOUT_DEFAULT
}

fn default_level() -> String {
    "info".to_string()
}

fn default_weight() -> f64 {
    1.0
}
