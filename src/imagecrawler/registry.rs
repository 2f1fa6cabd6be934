use super::{CrawlerConfig, Echo, ImageCrawler, ImageCrawlerInfo, Picsum, Reddit};
use crate::{ConfigError, ConfigResult};
use std::collections::BTreeMap;

/// Builds a crawler from its config, or explains why the config is unusable
pub type Constructor = fn(&CrawlerConfig) -> Result<Box<dyn ImageCrawler>, String>;

#[derive(Debug, Clone)]
struct Entry {
    info: ImageCrawlerInfo,
    constructor: Constructor,
}

/// Known crawler types, looked up by the name used in config files
///
/// Built once at startup and handed to whoever turns config into crawlers.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<&'static str, Entry>,
}

impl Registry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every crawler shipped with this crate
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Echo::NAME, Echo::info(), |config| {
            let crawler: Box<dyn ImageCrawler> = Box::new(Echo::from_config(config)?);
            Ok(crawler)
        });
        registry.register(Picsum::NAME, Picsum::info(), |config| {
            let crawler: Box<dyn ImageCrawler> = Box::new(Picsum::from_config(config)?);
            Ok(crawler)
        });
        registry.register(Reddit::NAME, Reddit::info(), |config| {
            let crawler: Box<dyn ImageCrawler> = Box::new(Reddit::from_config(config)?);
            Ok(crawler)
        });
        registry
    }

    /// Adds a crawler type, replacing any previous one with the same name
    pub fn register(
        &mut self,
        name: &'static str,
        info: ImageCrawlerInfo,
        constructor: Constructor,
    ) {
        if self
            .entries
            .insert(name, Entry { info, constructor })
            .is_some()
        {
            tracing::warn!("Crawler type {} registered twice, keeping the latest", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn info(&self, name: &str) -> Option<&ImageCrawlerInfo> {
        self.entries.get(name).map(|entry| &entry.info)
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Instantiates the crawler registered as `name`
    ///
    /// # Errors
    ///
    /// * `ConfigError::UnknownCrawler` - No crawler is registered as `name`
    /// * `ConfigError::CrawlerSetup` - The crawler rejected `config`
    pub fn create(
        &self,
        name: &str,
        config: &CrawlerConfig,
    ) -> ConfigResult<Box<dyn ImageCrawler>> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ConfigError::UnknownCrawler(name.to_string()))?;

        let crawler = (entry.constructor)(config).map_err(|message| ConfigError::CrawlerSetup {
            name: name.to_string(),
            message,
        })?;

        tracing::debug!("Crawler initialized: {} {:?}", name, crawler.config());
        Ok(crawler)
    }
}
