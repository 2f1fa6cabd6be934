//! Image-Soup: a randomized image pool fed by many sources
//!
//! This crate crawls images from heterogeneous sources into a shared,
//! deduplicated pool that is refilled in the background, and serves random
//! picks from that pool over HTTP.

pub mod config;
pub mod imagecrawler;
pub mod pool;
pub mod server;
pub mod webserver;

use thiserror::Error;

/// Main error type for Image-Soup operations
#[derive(Debug, Error)]
pub enum SoupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

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

    #[error("Unknown crawler name: {0}")]
    UnknownCrawler(String),

    #[error("Failed to set up crawler '{name}': {message}")]
    CrawlerSetup { name: String, message: String },

    #[error("Duplicate crawler '{name}' with config {config}")]
    DuplicateCrawler { name: String, config: String },
}

/// Errors raised by a single crawl attempt
///
/// These never leave a crawl source; they are logged and counted as an empty
/// batch.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Errors raised while registering sources with the pool
#[derive(Debug, Error, PartialEq)]
pub enum PoolError {
    #[error("Weight must be greater than 0, got {0}")]
    InvalidWeight(f64),

    #[error("Source already registered: {kind} {config}")]
    DuplicateSource { kind: String, config: String },
}

/// Misuse of the serving layer lifecycle
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServerError {
    #[error("Server is already running")]
    AlreadyRunning,

    #[error("Server is not running")]
    NotRunning,
}

/// Result type alias for Image-Soup operations
pub type Result<T> = std::result::Result<T, SoupError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for crawl attempts
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use imagecrawler::{ImageCrawler, Registry};
pub use pool::{Blacklist, CrawlSource, Image, Pool};
pub use server::Server;
