//! Configuration to server, with the built-in and custom crawler registries

use async_trait::async_trait;
use image_soup::config::{build_server, parse_config};
use image_soup::imagecrawler::{CrawlerConfig, ImageCrawlerInfo};
use image_soup::{ConfigError, CrawlResult, Image, ImageCrawler, Registry};
use serde_json::json;
use std::time::Duration;

/// Counts upwards, one image per crawl, until `limit`
#[derive(Debug)]
struct Counter {
    next: u64,
    limit: u64,
}

#[async_trait]
impl ImageCrawler for Counter {
    fn kind(&self) -> &'static str {
        "Counter"
    }

    fn config(&self) -> CrawlerConfig {
        let mut config = CrawlerConfig::new();
        config.insert("limit".to_string(), json!(self.limit));
        config
    }

    fn is_exhausted(&self) -> bool {
        self.next >= self.limit
    }

    fn reset(&mut self) {
        self.next = 0;
    }

    async fn crawl(&mut self) -> CrawlResult<Vec<Image>> {
        let image = Image::new(format!("https://counter.test/{}.png", self.next));
        self.next += 1;
        Ok(vec![image])
    }
}

fn counter_registry() -> Registry {
    let mut registry = Registry::builtin();
    registry.register(
        "Counter",
        ImageCrawlerInfo {
            description: "Counts",
            config: &[("limit", "how many images to produce")],
            icon_url: None,
        },
        |config| {
            let limit = config
                .get("limit")
                .and_then(|limit| limit.as_u64())
                .ok_or_else(|| "limit must be a positive integer".to_string())?;
            let crawler: Box<dyn ImageCrawler> = Box::new(Counter { next: 0, limit });
            Ok(crawler)
        },
    );
    registry
}

const CONFIG: &str = r#"
[webserver]
hostname = "127.0.0.1"
port = 5000

[imageserver]
crawler-upkeep = 3
reset-timeout = 0

[[crawlers]]
name = "Counter"
weight = 1.0
[crawlers.config]
limit = 4

[[crawlers]]
name = "Picsum"
weight = 1.0
[crawlers.config]
width = 32
height = 32
"#;

#[tokio::test]
async fn test_custom_crawler_from_config() {
    let config = parse_config(CONFIG).unwrap();
    let server = build_server(&config, &counter_registry())
        .unwrap()
        .with_fill_delay(Duration::ZERO);

    server.refill().await;

    let counter = server.pool().sources().get(0).unwrap();
    let picsum = server.pool().sources().get(1).unwrap();
    assert_eq!(counter.kind(), "Counter");
    assert_eq!(counter.image_count(), 3);
    assert_eq!(picsum.image_count(), 10);

    // generic images never reach the blacklist
    assert_eq!(server.pool().blacklist().len(), 3);
}

#[tokio::test]
async fn test_exhausted_crawler_stays_exhausted_until_reset() {
    let config = parse_config(CONFIG).unwrap();
    let server = build_server(&config, &counter_registry())
        .unwrap()
        .with_fill_delay(Duration::ZERO);

    server.refill().await;
    let counter = server.pool().sources().get(0).unwrap();
    counter.clear_images();

    // one more image, then the counter is exhausted
    server.refill().await;
    assert_eq!(counter.image_count(), 1);
    server.refill().await;
    assert_eq!(counter.image_count(), 1);

    let response = server.request_reset().await;
    assert!(response.requested);
    server.refill().await;
    assert_eq!(counter.image_count(), 3);
    assert_eq!(server.server_status().images.crawled, 7);
}

#[test]
fn test_builtin_registry_rejects_custom_crawler() {
    let config = parse_config(CONFIG).unwrap();
    let result = build_server(&config, &Registry::builtin());
    assert!(matches!(result, Err(ConfigError::UnknownCrawler(name)) if name == "Counter"));
}
