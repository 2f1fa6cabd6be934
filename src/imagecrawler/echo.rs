use super::{parse_settings, require_non_empty, CrawlerConfig, ImageCrawler, ImageCrawlerInfo};
use crate::pool::Image;
use crate::CrawlResult;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EchoSettings {
    image_uri: String,
}

/// "Finds" the same image again and again
#[derive(Debug, Clone)]
pub struct Echo {
    image_uri: String,
}

impl Echo {
    pub const NAME: &'static str = "Echo";

    pub fn info() -> ImageCrawlerInfo {
        ImageCrawlerInfo {
            description: "\"Finds\" the same image ... again ... and again.",
            config: &[("image_uri", "the URI of the image to \"find\"")],
            icon_url: None,
        }
    }

    pub fn new(image_uri: impl Into<String>) -> Result<Self, String> {
        let image_uri = image_uri.into();
        require_non_empty("image_uri", &image_uri)?;
        Ok(Self { image_uri })
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self, String> {
        let settings: EchoSettings = parse_settings(config)?;
        Self::new(settings.image_uri)
    }
}

#[async_trait]
impl ImageCrawler for Echo {
    fn kind(&self) -> &'static str {
        Self::NAME
    }

    fn config(&self) -> CrawlerConfig {
        let mut config = CrawlerConfig::new();
        config.insert("image_uri".to_string(), json!(self.image_uri));
        config
    }

    fn is_exhausted(&self) -> bool {
        false
    }

    fn reset(&mut self) {}

    async fn crawl(&mut self) -> CrawlResult<Vec<Image>> {
        Ok(vec![Image::generic(&self.image_uri)
            .with_source(&self.image_uri)
            .with_extra("this_is_a_dummy", true)])
    }
}
