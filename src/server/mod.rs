//! Serving layer on top of the image pool
//!
//! This module provides:
//! - Random image serving with a served counter
//! - Lifecycle control (start, stop) of the background refiller
//! - Cooldown-guarded reset requests
//! - Status snapshots of the server, the blacklist and every source

mod refiller;
mod stats;
mod status;

pub use stats::{ServerStatistics, Timestamp};
pub use status::{
    BlacklistStatus, CrawlerStatus, ImagesStatus, ResetStatus, ServerStatus, SourceImagesStatus,
    SourceStatus,
};

use crate::pool::{CrawlSource, Image, Pool, FILL_UP_DELAY_DEFAULT};
use crate::ServerError;
use refiller::{RefillJob, Refiller};
use stats::ResetRecord;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Number of images each source is kept filled up to, by default
pub const KEEP_DEFAULT: usize = 30;

/// Seconds between two accepted resets, by default
pub const RESET_TIMEOUT_DEFAULT: u64 = 3600;

/// Interval of the background refiller, by default
pub const REFILL_INTERVAL_DEFAULT: Duration = Duration::from_secs(1);

/// An image handed out together with the source it was crawled from
#[derive(Debug, Clone)]
pub struct ImageResponse {
    pub image: Image,
    pub source: Arc<CrawlSource>,
}

/// Outcome of a reset request
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ResetResponse {
    /// Whether the reset was performed
    pub requested: bool,

    /// Seconds until the next reset will be accepted
    pub timeout: u64,
}

/// Serves random images from a pool and keeps the pool filled
pub struct Server {
    pool: Arc<Pool>,
    keep: usize,
    reset_timeout: u64,
    refill_interval: Duration,
    refill_job: RefillJob,

    /// `Some` while running; also serializes start and stop
    refiller: tokio::sync::Mutex<Option<Refiller>>,
    running: AtomicBool,
    time_started: Mutex<Option<Timestamp>>,

    served: Mutex<u64>,

    /// Held across the cooldown check and the reset itself
    reset_lock: tokio::sync::Mutex<()>,
    resets: Mutex<ResetRecord>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Server {
    /// Creates a stopped server
    ///
    /// # Arguments
    ///
    /// * `pool` - The pool to serve from, with all sources registered
    /// * `keep` - Number of images every source is kept filled up to
    /// * `reset_timeout` - Seconds between two accepted resets
    pub fn new(pool: Pool, keep: usize, reset_timeout: u64) -> Self {
        let pool = Arc::new(pool);
        let refill_job = RefillJob::new(Arc::clone(&pool), keep, FILL_UP_DELAY_DEFAULT);
        Self {
            pool,
            keep,
            reset_timeout,
            refill_interval: REFILL_INTERVAL_DEFAULT,
            refill_job,
            refiller: tokio::sync::Mutex::new(None),
            running: AtomicBool::new(false),
            time_started: Mutex::new(None),
            served: Mutex::new(0),
            reset_lock: tokio::sync::Mutex::new(()),
            resets: Mutex::new(ResetRecord::default()),
        }
    }

    /// Sets the delay between two crawl attempts of one source during a refill
    pub fn with_fill_delay(mut self, delay: Duration) -> Self {
        self.refill_job = RefillJob::new(Arc::clone(&self.pool), self.keep, delay);
        self
    }

    /// Sets the interval of the background refiller
    pub fn with_refill_interval(mut self, interval: Duration) -> Self {
        self.refill_interval = interval;
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn keep(&self) -> usize {
        self.keep
    }

    pub fn reset_timeout(&self) -> u64 {
        self.reset_timeout
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Hands out one random image and removes it from its source
    ///
    /// A source is picked by weight first. If that source is empty, nothing
    /// is served even when other sources still hold images.
    pub fn get_image(&self) -> Option<ImageResponse> {
        let source = self.pool.get_random_source()?;
        let image = source.pop_random_image()?;
        *lock(&self.served) += 1;
        Some(ImageResponse {
            image,
            source: Arc::clone(source),
        })
    }

    /// Fills every source up to the keep target
    ///
    /// Never runs concurrently with the background refiller.
    ///
    /// # Returns
    ///
    /// The number of images accepted
    pub async fn refill(&self) -> usize {
        self.refill_job.run().await
    }

    /// Performs an initial refill, then starts the background refiller
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The server is running
    /// * `Err(ServerError::AlreadyRunning)` - It was running already
    pub async fn start(&self) -> Result<(), ServerError> {
        let mut refiller = self.refiller.lock().await;
        if refiller.is_some() {
            return Err(ServerError::AlreadyRunning);
        }

        tracing::info!("Fill all crawlers up to {}", self.keep);
        let filled = self.refill().await;
        tracing::info!("Initially crawled {} images", filled);

        *refiller = Some(Refiller::start(
            self.refill_job.clone(),
            self.refill_interval,
        ));
        *lock(&self.time_started) = Some(stats::now());
        self.running.store(true, Ordering::SeqCst);
        tracing::info!("Server started");
        Ok(())
    }

    /// Stops the background refiller
    ///
    /// A refill in progress is not interrupted.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The server is stopped
    /// * `Err(ServerError::NotRunning)` - It was not running
    pub async fn stop(&self) -> Result<(), ServerError> {
        let mut refiller = self.refiller.lock().await;
        let running = refiller.take().ok_or(ServerError::NotRunning)?;
        drop(running.stop());
        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Server stopped");
        Ok(())
    }

    /// Resets the pool if the cooldown since the last reset has passed
    ///
    /// A stopped server is always reset. A running server measures the
    /// cooldown from the later of its start and its last reset. A refill in
    /// progress finishes before the reset starts.
    pub async fn request_reset(&self) -> ResetResponse {
        let _guard = self.reset_lock.lock().await;

        if !self.is_running() {
            self.reset().await;
            return ResetResponse {
                requested: true,
                timeout: 0,
            };
        }

        let now = stats::now();
        let last_reset = lock(&self.resets).time_last_reset;
        let started = *lock(&self.time_started);
        let since = last_reset.max(started).unwrap_or(now);
        let reset_after = since + self.reset_timeout as i64;

        if now >= reset_after {
            self.reset().await;
            ResetResponse {
                requested: true,
                timeout: self.reset_timeout,
            }
        } else {
            tracing::debug!("Reset refused, {}s of cooldown left", reset_after - now);
            ResetResponse {
                requested: false,
                timeout: (reset_after - now) as u64,
            }
        }
    }

    async fn reset(&self) {
        let _refill = self.refill_job.hold().await;
        tracing::info!("Resetting all sources");
        let blacklisted = self.pool.reset().await;
        lock(&self.resets).record(blacklisted, stats::now());
    }

    /// Takes a snapshot of all counters
    pub fn stats(&self) -> ServerStatistics {
        let resets = lock(&self.resets).clone();
        ServerStatistics {
            time_started: *lock(&self.time_started),
            count_images_served: *lock(&self.served),
            count_reset: resets.count,
            time_last_reset: resets.time_last_reset,
            cum_blacklist_on_flush: resets.cum_blacklist_on_flush,
        }
    }

    pub fn server_status(&self) -> ServerStatus {
        ServerStatus::of(self)
    }

    pub fn blacklist_status(&self) -> BlacklistStatus {
        BlacklistStatus::of(self.pool.blacklist())
    }

    pub fn crawler_status(&self) -> CrawlerStatus {
        CrawlerStatus::of(&self.pool)
    }
}
