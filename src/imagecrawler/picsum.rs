use super::{parse_settings, CrawlerConfig, ImageCrawler, ImageCrawlerInfo};
use crate::pool::Image;
use crate::CrawlResult;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Images per crawl
const BUNCH: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PicsumSettings {
    width: i64,
    height: i64,
}

/// Random placeholder photos from picsum.photos
#[derive(Debug, Clone)]
pub struct Picsum {
    width: u32,
    height: u32,
}

impl Picsum {
    pub const NAME: &'static str = "Picsum";

    pub fn info() -> ImageCrawlerInfo {
        ImageCrawlerInfo {
            description: "Find images from https://picsum.photos",
            config: &[
                ("width", "how many pixels of the image to find should be wide"),
                ("height", "how many pixels of the image to find should be high"),
            ],
            icon_url: Some("https://picsum.photos/assets/images/favicon/favicon-32x32.png"),
        }
    }

    pub fn new(width: u32, height: u32) -> Result<Self, String> {
        if width == 0 {
            return Err(format!("width {} <= 0", width));
        }
        if height == 0 {
            return Err(format!("height {} <= 0", height));
        }
        Ok(Self { width, height })
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self, String> {
        let settings: PicsumSettings = parse_settings(config)?;
        let width = u32::try_from(settings.width)
            .map_err(|_| format!("width {} out of range", settings.width))?;
        let height = u32::try_from(settings.height)
            .map_err(|_| format!("height {} out of range", settings.height))?;
        Self::new(width, height)
    }

    fn image_uri(&self) -> String {
        format!("https://picsum.photos/{}/{}", self.width, self.height)
    }
}

#[async_trait]
impl ImageCrawler for Picsum {
    fn kind(&self) -> &'static str {
        Self::NAME
    }

    fn config(&self) -> CrawlerConfig {
        let mut config = CrawlerConfig::new();
        config.insert("width".to_string(), json!(self.width));
        config.insert("height".to_string(), json!(self.height));
        config
    }

    fn is_exhausted(&self) -> bool {
        false
    }

    fn reset(&mut self) {}

    async fn crawl(&mut self) -> CrawlResult<Vec<Image>> {
        let uri = self.image_uri();
        Ok((0..BUNCH)
            .map(|_| Image::generic(&uri).with_source(&uri))
            .collect())
    }
}
