//! Usage statistics of the serving layer

use chrono::Utc;

/// Seconds since the Unix epoch
pub type Timestamp = i64;

pub(crate) fn now() -> Timestamp {
    Utc::now().timestamp()
}

/// Reset bookkeeping, guarded apart from the served counter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResetRecord {
    pub count: u64,
    pub time_last_reset: Option<Timestamp>,

    /// Blacklist sizes summed over all resets; the blacklist itself is
    /// emptied on every reset
    pub cum_blacklist_on_flush: u64,
}

impl ResetRecord {
    pub fn record(&mut self, blacklisted: usize, at: Timestamp) {
        self.count += 1;
        self.time_last_reset = Some(at);
        self.cum_blacklist_on_flush += blacklisted as u64;
    }
}

/// Point-in-time copy of the server's counters
///
/// All counters only grow within one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStatistics {
    /// When the server was started, if ever
    pub time_started: Option<Timestamp>,

    /// Images handed out
    pub count_images_served: u64,

    /// Resets performed
    pub count_reset: u64,

    /// When the last reset happened, if ever
    pub time_last_reset: Option<Timestamp>,

    /// Blacklist sizes summed over all resets
    pub cum_blacklist_on_flush: u64,
}

impl ServerStatistics {
    /// Every image that was ever accepted into the pool, given the current
    /// blacklist size
    pub fn images_crawled(&self, blacklist_len: usize) -> u64 {
        self.cum_blacklist_on_flush + blacklist_len as u64
    }
}
