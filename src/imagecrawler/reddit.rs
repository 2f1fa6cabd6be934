//! Crawler for a subreddit's JSON listing
//!
//! Pages through `/r/{subreddit}.json?after={cursor}` and keeps every post
//! whose url points directly at an image. The source is exhausted once the
//! listing reports no further page.

use super::fetcher::{build_http_client, fetch_string, path_is_image};
use super::{parse_settings, require_non_empty, CrawlerConfig, ImageCrawler, ImageCrawlerInfo};
use crate::pool::Image;
use crate::{CrawlError, CrawlResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://www.reddit.com/";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RedditSettings {
    subreddit: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    url: Option<String>,
    permalink: Option<String>,
    title: Option<String>,
}

/// A crawler for an arbitrary subreddit
#[derive(Debug)]
pub struct Reddit {
    subreddit: String,
    base_url: Url,
    client: Client,

    /// Cursor of the next page
    after: Option<String>,

    /// Whether the last listing had no further page
    at_end: bool,
}

impl Reddit {
    pub const NAME: &'static str = "Reddit";

    pub fn info() -> ImageCrawlerInfo {
        ImageCrawlerInfo {
            description: "A Crawler for an arbitrary SubReddit of https://www.reddit.com",
            config: &[("subreddit", "the SubReddit to crawl")],
            icon_url: Some(
                "https://www.redditstatic.com/desktop2x/img/favicon/apple-icon-120x120.png",
            ),
        }
    }

    pub fn new(subreddit: impl Into<String>) -> Result<Self, String> {
        let base_url = Url::parse(DEFAULT_BASE_URL).map_err(|e| e.to_string())?;
        Self::with_base_url(subreddit, base_url)
    }

    /// Creates a crawler that talks to `base_url` instead of reddit.com
    pub fn with_base_url(subreddit: impl Into<String>, base_url: Url) -> Result<Self, String> {
        let subreddit = subreddit.into();
        require_non_empty("subreddit", &subreddit)?;

        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let client = build_http_client(&user_agent).map_err(|e| e.to_string())?;

        Ok(Self {
            subreddit,
            base_url,
            client,
            after: None,
            at_end: false,
        })
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self, String> {
        let settings: RedditSettings = parse_settings(config)?;
        Self::new(settings.subreddit)
    }

    fn listing_url(&self) -> CrawlResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CrawlError::InvalidResponse {
                url: self.base_url.to_string(),
                message: "base url cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push("r")
            .push(&format!("{}.json", self.subreddit));
        url.query_pairs_mut()
            .append_pair("after", self.after.as_deref().unwrap_or(""));
        Ok(url)
    }
}

#[async_trait]
impl ImageCrawler for Reddit {
    fn kind(&self) -> &'static str {
        Self::NAME
    }

    fn config(&self) -> CrawlerConfig {
        let mut config = CrawlerConfig::new();
        config.insert("subreddit".to_string(), json!(self.subreddit));
        config
    }

    fn is_exhausted(&self) -> bool {
        self.at_end
    }

    fn reset(&mut self) {
        self.after = None;
        self.at_end = false;
    }

    async fn crawl(&mut self) -> CrawlResult<Vec<Image>> {
        let url = self.listing_url()?;
        let (body, final_url) = fetch_string(&self.client, url.as_str()).await?;
        let listing: Listing =
            serde_json::from_str(&body).map_err(|e| CrawlError::InvalidResponse {
                url: final_url.clone(),
                message: e.to_string(),
            })?;
        let page_url = Url::parse(&final_url)?;

        let mut images = Vec::new();
        for child in listing.data.children {
            let post = child.data;
            let Some(image_uri) = post.url.filter(|uri| path_is_image(uri)) else {
                continue;
            };

            let mut image = Image::new(image_uri);
            if let Some(permalink) = post.permalink {
                match page_url.join(&permalink) {
                    Ok(source) => image = image.with_source(source.to_string()),
                    Err(e) => tracing::debug!("Unusable permalink {:?}: {}", permalink, e),
                }
            }
            if let Some(title) = post.title {
                image = image.with_extra("title", title);
            }
            images.push(image);
        }

        match listing.data.after {
            Some(after) => self.after = Some(after),
            None => self.at_end = true,
        }

        tracing::debug!(
            "r/{} yielded {} images (exhausted: {})",
            self.subreddit,
            images.len(),
            self.at_end
        );

        Ok(images)
    }
}
