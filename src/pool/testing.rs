//! Scripted crawler for exercising the pool without network access

use crate::imagecrawler::{CrawlerConfig, ImageCrawler};
use crate::pool::Image;
use crate::{CrawlError, CrawlResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct Script {
    exhausted: AtomicBool,
    failing: AtomicBool,
    crawl_calls: AtomicUsize,
    reset_calls: AtomicUsize,
}

/// Returns the same batch on every crawl; clones share their counters
#[derive(Debug, Clone)]
pub(crate) struct ScriptedCrawler {
    uris: Vec<String>,
    generic: Option<usize>,
    delay: Duration,
    script: Arc<Script>,
}

impl ScriptedCrawler {
    /// Yields non-generic images with `uris`
    pub(crate) fn new(uris: &[&str]) -> Self {
        Self {
            uris: uris.iter().map(|uri| uri.to_string()).collect(),
            generic: None,
            delay: Duration::ZERO,
            script: Arc::default(),
        }
    }

    /// Yields `count` fresh generic images
    pub(crate) fn generic(count: usize) -> Self {
        Self {
            uris: Vec::new(),
            generic: Some(count),
            delay: Duration::ZERO,
            script: Arc::default(),
        }
    }

    /// Sleeps `delay` inside every crawl
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn set_exhausted(&self, exhausted: bool) {
        self.script.exhausted.store(exhausted, Ordering::SeqCst);
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.script.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn crawl_calls(&self) -> usize {
        self.script.crawl_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn reset_calls(&self) -> usize {
        self.script.reset_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageCrawler for ScriptedCrawler {
    fn kind(&self) -> &'static str {
        "Scripted"
    }

    fn config(&self) -> CrawlerConfig {
        let mut config = CrawlerConfig::new();
        config.insert("uris".to_string(), json!(self.uris));
        config.insert("generic".to_string(), json!(self.generic));
        config
    }

    fn is_exhausted(&self) -> bool {
        self.script.exhausted.load(Ordering::SeqCst)
    }

    fn reset(&mut self) {
        self.script.reset_calls.fetch_add(1, Ordering::SeqCst);
        self.script.exhausted.store(false, Ordering::SeqCst);
    }

    async fn crawl(&mut self) -> CrawlResult<Vec<Image>> {
        self.script.crawl_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.script.failing.load(Ordering::SeqCst) {
            return Err(CrawlError::InvalidResponse {
                url: "scripted://".to_string(),
                message: "scripted failure".to_string(),
            });
        }

        Ok(match self.generic {
            Some(count) => (0..count)
                .map(|i| Image::generic(format!("scripted://generic/{}", i)))
                .collect(),
            None => self.uris.iter().map(Image::new).collect(),
        })
    }
}
