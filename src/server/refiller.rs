//! Periodic background refill of the pool

use crate::pool::{CrawlSource, OnFill, Pool};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// One refill of every source up to the keep target
///
/// Clones share the lock, so the periodic refiller and manual refills never
/// run at the same time.
#[derive(Clone)]
pub(crate) struct RefillJob {
    pool: Arc<Pool>,
    keep: usize,
    fill_delay: Duration,
    lock: Arc<Mutex<()>>,
}

impl RefillJob {
    pub fn new(pool: Arc<Pool>, keep: usize, fill_delay: Duration) -> Self {
        Self {
            pool,
            keep,
            fill_delay,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Waits for a running refill to finish and keeps further ones out
    pub async fn hold(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    pub async fn run(&self) -> usize {
        let _guard = self.lock.lock().await;
        let on_fill: OnFill = Arc::new(log_refill);
        self.pool
            .fill_all_up_to(self.keep, Some(on_fill), self.fill_delay)
            .await
    }
}

fn log_refill(source: &CrawlSource, refilled: usize) {
    if refilled > 0 {
        tracing::info!("Refilled by {} via {}", refilled, source);
    }
}

/// Handle to the running background refill task
pub(crate) struct Refiller {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Refiller {
    /// Spawns a task running `job` every `interval`
    pub fn start(job: RefillJob, interval: Duration) -> Self {
        tracing::info!("Starting refiller, interval {:?}", interval);
        let (stop, stopped) = watch::channel(false);
        let task = tokio::spawn(run(job, interval, stopped));
        Self { stop, task }
    }

    /// Signals the task to stop
    ///
    /// A refill in progress is finished first. The returned handle resolves
    /// once the task is gone.
    pub fn stop(self) -> JoinHandle<()> {
        tracing::info!("Stopping refiller");
        // the receiver only disappears once the task is already gone
        let _ = self.stop.send(true);
        self.task
    }
}

async fn run(job: RefillJob, interval: Duration, mut stopped: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = stopped.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        if *stopped.borrow() {
            break;
        }
        job.run().await;
    }
    tracing::debug!("Refiller stopped");
}
