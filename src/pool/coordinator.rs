//! Pool coordinator - owns all sources and the shared blacklist
//!
//! This module coordinates the sources of the pool, including:
//! - Registering crawlers wired to the shared blacklist
//! - Refilling every source concurrently
//! - Resetting every source concurrently along with the blacklist

use crate::imagecrawler::ImageCrawler;
use crate::pool::{Blacklist, CrawlSource, Image, OnFill, SourceCollection};
use crate::PoolError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// All crawl sources plus the blacklist they share
#[derive(Debug, Default)]
pub struct Pool {
    sources: SourceCollection,
    blacklist: Arc<Blacklist>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &SourceCollection {
        &self.sources
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    /// Whether a crawler of the same kind and config is registered
    pub fn has_source(&self, crawler: &dyn ImageCrawler) -> bool {
        self.sources
            .iter()
            .any(|source| source.has_same_crawler(crawler))
    }

    /// Registers a crawler as a new source
    ///
    /// The source only accepts images whose uri is not blacklisted, and puts
    /// every accepted non-generic image on the blacklist.
    ///
    /// # Errors
    ///
    /// * `PoolError::InvalidWeight` - `weight` is not a positive finite number,
    ///   or the total weight of all sources would no longer be finite
    /// * `PoolError::DuplicateSource` - An equal crawler is already registered
    ///
    /// The pool is unchanged on error.
    pub fn add_source(
        &mut self,
        crawler: Box<dyn ImageCrawler>,
        weight: f64,
        restart_at_front_when_exhausted: bool,
    ) -> Result<Arc<CrawlSource>, PoolError> {
        if self.has_source(crawler.as_ref()) {
            return Err(PoolError::DuplicateSource {
                kind: crawler.kind().to_string(),
                config: serde_json::Value::Object(crawler.config()).to_string(),
            });
        }

        if !(self.sources.total_weight() + weight).is_finite() {
            return Err(PoolError::InvalidWeight(weight));
        }

        let gate = Arc::clone(&self.blacklist);
        let recorder = Arc::clone(&self.blacklist);
        let source = CrawlSource::new(
            self.sources.len(),
            crawler,
            weight,
            restart_at_front_when_exhausted,
        )?
        .with_is_image_addable(Box::new(move |image: &Image| !gate.contains(image.uri())))
        .with_on_image_added(Box::new(move |image: &Image| {
            if !image.is_generic() {
                recorder.insert(image.uri());
            }
        }));

        let source = Arc::new(source);
        tracing::debug!("Registered source {} with weight {}", source, weight);
        self.sources.push(Arc::clone(&source));
        Ok(source)
    }

    /// Refills every source up to `target` images, one task per source
    ///
    /// Slow sources do not hold up the others, but the call only returns once
    /// every source had its chance.
    ///
    /// # Returns
    ///
    /// The number of images accepted over all sources
    pub async fn fill_all_up_to(
        &self,
        target: usize,
        on_fill: Option<OnFill>,
        delay: Duration,
    ) -> usize {
        let mut tasks = JoinSet::new();
        for source in self.sources.iter() {
            let source = Arc::clone(source);
            let on_fill = on_fill.clone();
            tasks.spawn(async move { source.fill_up_to(target, on_fill.as_ref(), delay).await });
        }

        let mut total = 0;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(filled) => total += filled,
                Err(e) => tracing::error!("Fill-up task failed: {}", e),
            }
        }
        total
    }

    /// Empties every source, restarts every crawler and clears the blacklist
    ///
    /// # Returns
    ///
    /// The size of the blacklist right before it was cleared
    pub async fn reset(&self) -> usize {
        let mut tasks = JoinSet::new();
        for source in self.sources.iter() {
            let source = Arc::clone(source);
            tasks.spawn(async move { source.reset().await });
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!("Reset task failed: {}", e);
            }
        }

        // after the sources, so a crawl finishing mid-reset is flushed too
        let blacklisted = self.blacklist.clear();

        tracing::debug!("Pool reset, {} uris left the blacklist", blacklisted);
        blacklisted
    }

    /// Selects a source with probability proportional to its weight
    pub fn get_random_source(&self) -> Option<&Arc<CrawlSource>> {
        self.sources.get_random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::testing::ScriptedCrawler;

    #[test]
    fn test_add_source() {
        let mut pool = Pool::new();
        let crawler = ScriptedCrawler::new(&["a"]);

        assert!(!pool.has_source(&crawler));
        let source = pool.add_source(Box::new(crawler.clone()), 2.0, true).unwrap();

        assert!(pool.has_source(&crawler));
        assert_eq!(source.id(), 0);
        assert_eq!(source.weight(), 2.0);
        assert!(source.restart_at_front_when_exhausted());
        assert_eq!(pool.sources().len(), 1);
    }

    #[test]
    fn test_add_source_rejects_invalid_weight() {
        let mut pool = Pool::new();
        let result = pool.add_source(Box::new(ScriptedCrawler::new(&["a"])), 0.0, false);

        assert_eq!(result.unwrap_err(), PoolError::InvalidWeight(0.0));
        assert!(pool.sources().is_empty());
    }

    #[test]
    fn test_add_source_rejects_overflowing_total_weight() {
        let mut pool = Pool::new();
        pool.add_source(Box::new(ScriptedCrawler::new(&["a"])), f64::MAX, false)
            .unwrap();

        let result = pool.add_source(Box::new(ScriptedCrawler::new(&["b"])), f64::MAX, false);
        assert_eq!(result.unwrap_err(), PoolError::InvalidWeight(f64::MAX));
        assert_eq!(pool.sources().len(), 1);
        assert_eq!(pool.get_random_source().unwrap().id(), 0);
    }

    #[test]
    fn test_add_source_rejects_duplicate() {
        let mut pool = Pool::new();
        pool.add_source(Box::new(ScriptedCrawler::new(&["a"])), 1.0, false)
            .unwrap();

        let result = pool.add_source(Box::new(ScriptedCrawler::new(&["a"])), 5.0, false);
        assert!(matches!(result, Err(PoolError::DuplicateSource { .. })));
        assert_eq!(pool.sources().len(), 1);

        pool.add_source(Box::new(ScriptedCrawler::new(&["b"])), 1.0, false)
            .unwrap();
        assert_eq!(pool.sources().len(), 2);
    }

    #[tokio::test]
    async fn test_fill_all_up_to_populates_sources_and_blacklist() {
        let mut pool = Pool::new();
        let source = pool
            .add_source(Box::new(ScriptedCrawler::new(&["uriA", "uriB"])), 1.0, false)
            .unwrap();

        let filled = pool.fill_all_up_to(2, None, Duration::ZERO).await;

        assert_eq!(filled, 2);
        let mut uris: Vec<_> = source.images().iter().map(|i| i.uri().to_string()).collect();
        uris.sort();
        assert_eq!(uris, vec!["uriA", "uriB"]);
        assert!(pool.blacklist().contains("uriA"));
        assert!(pool.blacklist().contains("uriB"));
    }

    #[tokio::test]
    async fn test_blacklist_is_shared_between_sources() {
        let mut pool = Pool::new();
        let first = pool
            .add_source(Box::new(ScriptedCrawler::new(&["shared", "x"])), 1.0, false)
            .unwrap();
        let second = pool
            .add_source(Box::new(ScriptedCrawler::new(&["shared", "y"])), 1.0, false)
            .unwrap();

        assert_eq!(first.crawl().await, 2);
        assert_eq!(second.crawl().await, 1);

        assert!(second.images().iter().all(|image| image.uri() != "shared"));
        assert_eq!(pool.blacklist().len(), 3);
    }

    #[tokio::test]
    async fn test_served_images_are_not_crawled_again() {
        let mut pool = Pool::new();
        let source = pool
            .add_source(Box::new(ScriptedCrawler::new(&["a"])), 1.0, false)
            .unwrap();

        source.crawl().await;
        assert!(source.pop_random_image().is_some());

        assert_eq!(source.crawl().await, 0);
        assert_eq!(source.image_count(), 0);
        assert!(pool.blacklist().contains("a"));
    }

    #[tokio::test]
    async fn test_generic_images_stay_off_the_blacklist() {
        let mut pool = Pool::new();
        let source = pool
            .add_source(Box::new(ScriptedCrawler::generic(4)), 1.0, false)
            .unwrap();

        pool.fill_all_up_to(8, None, Duration::ZERO).await;

        assert_eq!(source.image_count(), 8);
        assert!(pool.blacklist().is_empty());
    }

    #[tokio::test]
    async fn test_fill_all_up_to_runs_sources_concurrently() {
        let mut pool = Pool::new();
        for i in 0..4 {
            let crawler = ScriptedCrawler::new(&[format!("uri-{}", i).as_str()])
                .with_delay(Duration::from_millis(200));
            pool.add_source(Box::new(crawler), 1.0, false).unwrap();
        }

        let started = std::time::Instant::now();
        pool.fill_all_up_to(1, None, Duration::ZERO).await;

        // sequential crawling would take at least 800ms
        assert!(started.elapsed() < Duration::from_millis(700));
        assert!(pool.sources().iter().all(|source| source.image_count() == 1));
    }

    #[tokio::test]
    async fn test_fill_all_up_to_reports_every_attempt() {
        let mut pool = Pool::new();
        pool.add_source(Box::new(ScriptedCrawler::new(&["a"])), 1.0, false)
            .unwrap();
        let observed = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = Arc::clone(&observed);
        let on_fill: OnFill = Arc::new(move |source: &CrawlSource, refilled: usize| {
            log.lock().unwrap().push((source.id(), refilled));
        });

        pool.fill_all_up_to(3, Some(on_fill), Duration::ZERO).await;

        assert_eq!(*observed.lock().unwrap(), vec![(0, 1), (0, 0)]);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let mut pool = Pool::new();
        let first_crawler = ScriptedCrawler::new(&["a", "b"]);
        let first = pool
            .add_source(Box::new(first_crawler.clone()), 1.0, false)
            .unwrap();
        let second = pool
            .add_source(Box::new(ScriptedCrawler::new(&["c"])), 1.0, false)
            .unwrap();
        pool.fill_all_up_to(5, None, Duration::ZERO).await;
        first.pop_random_image();

        let blacklisted = pool.reset().await;

        assert_eq!(blacklisted, 3);
        assert!(pool.blacklist().is_empty());
        assert_eq!(first.image_count(), 0);
        assert_eq!(second.image_count(), 0);
        assert_eq!(first_crawler.reset_calls(), 1);

        // everything is crawlable again
        assert_eq!(first.crawl().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_crawl_leaves_pool_empty() {
        let mut pool = Pool::new();
        let crawler = ScriptedCrawler::new(&["a", "b"]).with_delay(Duration::from_millis(300));
        let source = pool.add_source(Box::new(crawler), 1.0, false).unwrap();

        let crawling = Arc::clone(&source);
        let crawl = tokio::spawn(async move { crawling.crawl().await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let blacklisted = pool.reset().await;
        assert_eq!(crawl.await.unwrap(), 2);

        assert_eq!(blacklisted, 2);
        assert_eq!(source.image_count(), 0);
        assert!(pool.blacklist().is_empty());
    }

    #[tokio::test]
    async fn test_random_source_on_empty_pool() {
        let pool = Pool::new();
        assert!(pool.get_random_source().is_none());
        assert_eq!(pool.reset().await, 0);
        assert_eq!(pool.fill_all_up_to(3, None, Duration::ZERO).await, 0);
    }
}
