//! Configuration module for Image-Soup
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and turns a configuration into a ready-to-start server.
//!
//! # Example
//!
//! ```no_run
//! use image_soup::config::{build_server, load_config};
//! use image_soup::Registry;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! let server = build_server(&config, &Registry::builtin()).unwrap();
//! println!("Keeping {} images per crawler", server.keep());
//! ```

mod builder;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerEntry, ImageServerConfig, LoggingConfig, WebServerConfig};

// Re-export parser functions
pub use parser::{
    default_config, hash_config, load_config, load_config_with_hash, parse_config,
    DEFAULT_CONFIG,
};

pub use builder::{build_pool, build_server};
