//! Image crawler contract and the shipped crawler implementations
//!
//! Every source site is one [`ImageCrawler`] implementation. The pool treats
//! them uniformly: it asks for a batch, checks exhaustion and resets them.
//! Crawlers are looked up by name through an explicit [`Registry`].

mod echo;
mod fetcher;
mod picsum;
mod reddit;
mod registry;

pub use echo::Echo;
pub use fetcher::{build_http_client, fetch_string, path_is_image};
pub use picsum::Picsum;
pub use reddit::Reddit;
pub use registry::{Constructor, Registry};

use crate::pool::Image;
use crate::CrawlResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

/// Public configuration of a crawler instance
pub type CrawlerConfig = Map<String, Value>;

/// A pluggable image source
#[async_trait]
pub trait ImageCrawler: Send + Sync + fmt::Debug {
    /// Name of the concrete crawler type
    fn kind(&self) -> &'static str;

    /// Effective configuration; two crawlers of the same kind with equal
    /// configuration are considered the same source
    fn config(&self) -> CrawlerConfig;

    /// Whether the source has nothing new to offer until reset
    fn is_exhausted(&self) -> bool;

    /// Restarts the source at its front
    fn reset(&mut self);

    /// Fetches one batch of candidate images
    async fn crawl(&mut self) -> CrawlResult<Vec<Image>>;
}

/// Human readable description of a crawler type
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCrawlerInfo {
    /// Short description
    pub description: &'static str,

    /// Config keys and what they mean
    pub config: &'static [(&'static str, &'static str)],

    /// Url to an icon-like image of the source
    pub icon_url: Option<&'static str>,
}

/// Deserializes a crawler's typed settings from its config map
pub(crate) fn parse_settings<T: DeserializeOwned>(config: &CrawlerConfig) -> Result<T, String> {
    serde_json::from_value(Value::Object(config.clone())).map_err(|e| e.to_string())
}

/// Rejects empty strings in crawler settings
pub(crate) fn require_non_empty(key: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} cannot be empty", key));
    }
    Ok(())
}
