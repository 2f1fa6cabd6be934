//! HTTP plumbing shared by remote crawlers
//!
//! This module handles:
//! - Building HTTP clients with a proper user agent
//! - GET requests returning the body as text
//! - Mapping transport and status failures to crawl errors
//! - Recognizing uris that point at images

use crate::{CrawlError, CrawlResult};
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

/// Request timeout for a single fetch
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds an HTTP client identifying as `user_agent`
///
/// # Example
///
/// ```no_run
/// use image_soup::imagecrawler::build_http_client;
///
/// let client = build_http_client("image-soup/1.0").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(FETCH_TIMEOUT)
        .connect_timeout(Duration::from_secs(5))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches `url` and returns the body and the final url after redirects
///
/// # Errors
///
/// * `CrawlError::Http` - Transport failure or undecodable body
/// * `CrawlError::Status` - Non-success HTTP status
pub async fn fetch_string(client: &Client, url: &str) -> CrawlResult<(String, String)> {
    tracing::trace!("Fetching {}", url);

    let response = client.get(url).send().await.map_err(|e| CrawlError::Http {
        url: url.to_string(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let body = response.text().await.map_err(|e| CrawlError::Http {
        url: url.to_string(),
        source: e,
    })?;

    Ok((body, final_url))
}

fn image_path_regex() -> &'static Regex {
    static IMAGE_PATH: OnceLock<Regex> = OnceLock::new();
    IMAGE_PATH.get_or_init(|| {
        Regex::new(r"(?i)^.+\.(?:jpeg|jpg|png|gif|svg)(?:[?#].*)?$").expect("valid regex")
    })
}

/// Whether a uri looks like it points directly at an image file
pub fn path_is_image(uri: &str) -> bool {
    image_path_regex().is_match(uri)
}
