use crate::config::types::Config;
use crate::imagecrawler::Registry;
use crate::pool::Pool;
use crate::server::Server;
use crate::{ConfigError, PoolError};

/// Instantiates every configured crawler and registers it with a new pool
///
/// # Arguments
///
/// * `config` - A validated configuration
/// * `registry` - Where crawler names are looked up
///
/// # Errors
///
/// * `ConfigError::UnknownCrawler` - A crawler name is not registered
/// * `ConfigError::CrawlerSetup` - A crawler rejected its settings
/// * `ConfigError::DuplicateCrawler` - Two entries build equal crawlers
pub fn build_pool(config: &Config, registry: &Registry) -> Result<Pool, ConfigError> {
    let mut pool = Pool::new();

    for entry in &config.crawlers {
        let crawler = registry.create(&entry.name, &entry.config)?;
        pool.add_source(crawler, entry.weight, entry.restart_at_front_when_exhausted)
            .map_err(|e| match e {
                PoolError::DuplicateSource { config, .. } => ConfigError::DuplicateCrawler {
                    name: entry.name.clone(),
                    config,
                },
                PoolError::InvalidWeight(_) => ConfigError::Validation(e.to_string()),
            })?;
    }

    Ok(pool)
}

/// Builds a stopped server from a validated configuration
pub fn build_server(config: &Config, registry: &Registry) -> Result<Server, ConfigError> {
    let pool = build_pool(config, registry)?;
    Ok(Server::new(
        pool,
        config.imageserver.crawler_upkeep,
        config.imageserver.reset_timeout,
    ))
}
