//! Image pool: crawl sources, the shared blacklist and their coordination
//!
//! This module contains the crawling/caching core:
//! - Image values and their identity rules
//! - Per-source crawl state with exhaustion and restart policy
//! - The blacklist shared by all sources
//! - Weighted random source selection
//! - Concurrent refill and reset of all sources

mod blacklist;
mod collection;
mod coordinator;
mod image;
mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use blacklist::Blacklist;
pub use collection::SourceCollection;
pub use coordinator::Pool;
pub use image::{Image, ImageExtra};
pub use source::{CrawlSource, IsImageAddable, OnFill, OnImageAdded, FILL_UP_DELAY_DEFAULT};
