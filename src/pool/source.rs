use crate::imagecrawler::{CrawlerConfig, ImageCrawler};
use crate::pool::Image;
use crate::PoolError;
use rand::seq::IteratorRandom;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

/// Decides whether a crawled image may enter a source
pub type IsImageAddable = Box<dyn Fn(&Image) -> bool + Send + Sync>;

/// Notified for every image that entered a source
pub type OnImageAdded = Box<dyn Fn(&Image) + Send + Sync>;

/// Notified after every crawl attempt during a fill-up, with the number of
/// images that were accepted
pub type OnFill = Arc<dyn Fn(&CrawlSource, usize) + Send + Sync>;

/// Delay between two crawl attempts of one fill-up
pub const FILL_UP_DELAY_DEFAULT: Duration = Duration::from_secs(1);

/// Crawl state of one registered source
///
/// Owns one crawler, its selection weight, its restart policy and the images
/// crawled from it that were not served yet.
pub struct CrawlSource {
    /// Stable id, assigned in registration order
    id: usize,

    kind: &'static str,

    /// Crawler config, captured at registration
    config: CrawlerConfig,

    crawler: tokio::sync::Mutex<Box<dyn ImageCrawler>>,

    weight: RwLock<f64>,

    restart_at_front_when_exhausted: bool,

    /// Crawled but not yet served
    images: Mutex<HashSet<Image>>,

    is_image_addable: Option<IsImageAddable>,

    on_image_added: Option<OnImageAdded>,
}

fn check_weight(weight: f64) -> Result<f64, PoolError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(weight)
    } else {
        Err(PoolError::InvalidWeight(weight))
    }
}

impl CrawlSource {
    /// Creates a new source without admission hooks
    ///
    /// # Errors
    ///
    /// * `PoolError::InvalidWeight` - `weight` is not a positive finite number
    pub fn new(
        id: usize,
        crawler: Box<dyn ImageCrawler>,
        weight: f64,
        restart_at_front_when_exhausted: bool,
    ) -> Result<Self, PoolError> {
        let weight = check_weight(weight)?;
        Ok(Self {
            id,
            kind: crawler.kind(),
            config: crawler.config(),
            crawler: tokio::sync::Mutex::new(crawler),
            weight: RwLock::new(weight),
            restart_at_front_when_exhausted,
            images: Mutex::new(HashSet::new()),
            is_image_addable: None,
            on_image_added: None,
        })
    }

    /// Sets the gate every crawled image has to pass
    pub fn with_is_image_addable(mut self, is_image_addable: IsImageAddable) -> Self {
        self.is_image_addable = Some(is_image_addable);
        self
    }

    /// Sets the hook called for every accepted image
    pub fn with_on_image_added(mut self, on_image_added: OnImageAdded) -> Self {
        self.on_image_added = Some(on_image_added);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn restart_at_front_when_exhausted(&self) -> bool {
        self.restart_at_front_when_exhausted
    }

    pub fn weight(&self) -> f64 {
        *self.weight.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Changes the selection weight
    ///
    /// # Errors
    ///
    /// * `PoolError::InvalidWeight` - `weight` is not a positive finite number;
    ///   the previous weight is kept
    pub fn set_weight(&self, weight: f64) -> Result<(), PoolError> {
        let weight = check_weight(weight)?;
        *self.weight.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = weight;
        Ok(())
    }

    /// Whether `crawler` is of the same kind and config as this source's
    ///
    /// This is the one notion of crawler equality; duplicate registration is
    /// judged by it.
    pub fn has_same_crawler(&self, crawler: &dyn ImageCrawler) -> bool {
        self.kind == crawler.kind() && self.config == crawler.config()
    }

    fn lock_images(&self) -> MutexGuard<'_, HashSet<Image>> {
        self.images.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of images waiting to be served
    pub fn image_count(&self) -> usize {
        self.lock_images().len()
    }

    /// Snapshot of the images waiting to be served
    pub fn images(&self) -> Vec<Image> {
        self.lock_images().iter().cloned().collect()
    }

    /// Crawls one batch and keeps the images that pass the admission gate
    ///
    /// An exhausted crawler is only crawled again if the source restarts at
    /// front when exhausted. Crawl failures are logged and count as an empty
    /// batch.
    ///
    /// # Returns
    ///
    /// The number of images that were actually accepted
    pub async fn crawl(&self) -> usize {
        // held until the batch is stored, so a reset never interleaves
        let mut crawler = self.crawler.lock().await;

        if crawler.is_exhausted() {
            if !self.restart_at_front_when_exhausted {
                tracing::trace!("{} is exhausted", self);
                return 0;
            }
            tracing::debug!("{} is exhausted, restarting at front", self);
            crawler.reset();
        }

        match crawler.crawl().await {
            Ok(batch) => self.add_images(batch),
            Err(e) => {
                tracing::warn!("Handled an error during crawling {}: {}", self, e);
                0
            }
        }
    }

    fn add_images(&self, batch: Vec<Image>) -> usize {
        let mut added = 0;

        for image in batch {
            if let Some(is_image_addable) = &self.is_image_addable {
                if !is_image_addable(&image) {
                    continue;
                }
            }

            if !self.lock_images().insert(image.clone()) {
                continue;
            }

            if let Some(on_image_added) = &self.on_image_added {
                on_image_added(&image);
            }
            added += 1;
        }

        added
    }

    /// Crawls until `target` images are waiting or a crawl yields nothing new
    ///
    /// Sleeps `delay` between two attempts, never before the first.
    ///
    /// # Returns
    ///
    /// The number of images accepted over all attempts
    pub async fn fill_up_to(
        &self,
        target: usize,
        on_fill: Option<&OnFill>,
        delay: Duration,
    ) -> usize {
        let mut total = 0;

        while self.image_count() < target {
            let refilled = self.crawl().await;
            if let Some(on_fill) = on_fill {
                on_fill(self, refilled);
            }
            if refilled == 0 {
                break;
            }
            total += refilled;

            if self.image_count() < target && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        total
    }

    /// Picks a random waiting image without removing it
    pub fn get_random_image(&self) -> Option<Image> {
        self.lock_images().iter().choose(&mut rand::rng()).cloned()
    }

    /// Picks a random waiting image and removes it
    pub fn pop_random_image(&self) -> Option<Image> {
        let mut images = self.lock_images();
        let image = images.iter().choose(&mut rand::rng()).cloned()?;
        images.remove(&image);
        Some(image)
    }

    /// Drops all waiting images
    pub fn clear_images(&self) {
        self.lock_images().clear();
    }

    /// Drops all waiting images and restarts the crawler at front
    pub async fn reset(&self) {
        let mut crawler = self.crawler.lock().await;
        self.clear_images();
        crawler.reset();
        tracing::debug!("{} reset", self);
    }
}

impl fmt::Display for CrawlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} #{} {}>", self.kind, self.id, serde_json::Value::Object(self.config.clone()))
    }
}

impl fmt::Debug for CrawlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlSource")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("config", &self.config)
            .field("weight", &self.weight())
            .field("restart_at_front_when_exhausted", &self.restart_at_front_when_exhausted)
            .field("images", &self.image_count())
            .finish()
    }
}
