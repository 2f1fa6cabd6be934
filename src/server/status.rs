//! Serializable status snapshots

use super::stats::{self, Timestamp};
use super::Server;
use crate::imagecrawler::CrawlerConfig;
use crate::pool::{Blacklist, Pool};
use serde::Serialize;
use std::collections::BTreeMap;

/// Overall server status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    pub version: &'static str,

    /// Seconds since start, 0 when not running
    pub uptime: u64,

    pub reset: ResetStatus,
    pub images: ImagesStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetStatus {
    pub count: u64,

    /// Seconds since the last reset, or since start if there was none
    pub since: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagesStatus {
    pub served: u64,
    pub crawled: u64,
}

impl ServerStatus {
    pub fn of(server: &Server) -> Self {
        let stats = server.stats();
        let now = stats::now();
        let elapsed = |since: Timestamp| now.saturating_sub(since).max(0) as u64;

        let uptime = match stats.time_started {
            Some(started) if server.is_running() => elapsed(started),
            _ => 0,
        };

        Self {
            version: env!("CARGO_PKG_VERSION"),
            uptime,
            reset: ResetStatus {
                count: stats.count_reset,
                since: stats.time_last_reset.map_or(uptime, elapsed),
            },
            images: ImagesStatus {
                served: stats.count_images_served,
                crawled: stats.images_crawled(server.pool().blacklist().len()),
            },
        }
    }
}

/// Blacklist status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlacklistStatus {
    pub len: usize,
}

impl BlacklistStatus {
    pub fn of(blacklist: &Blacklist) -> Self {
        Self {
            len: blacklist.len(),
        }
    }
}

/// Status of every source, keyed by source id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CrawlerStatus(pub BTreeMap<usize, SourceStatus>);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStatus {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub weight: f64,
    pub restart_at_front_when_exhausted: bool,
    pub config: CrawlerConfig,
    pub images: SourceImagesStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceImagesStatus {
    pub len: usize,
}

impl CrawlerStatus {
    pub fn of(pool: &Pool) -> Self {
        let sources = pool
            .sources()
            .iter()
            .map(|source| {
                let status = SourceStatus {
                    kind: source.kind(),
                    weight: source.weight(),
                    restart_at_front_when_exhausted: source.restart_at_front_when_exhausted(),
                    config: source.config().clone(),
                    images: SourceImagesStatus {
                        len: source.image_count(),
                    },
                };
                (source.id(), status)
            })
            .collect();
        Self(sources)
    }
}
