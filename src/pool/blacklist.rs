use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Uris of every non-generic image that entered the pool
///
/// Shared by all crawl sources. Grows while crawling and is only emptied by a
/// pool reset.
#[derive(Debug, Default)]
pub struct Blacklist {
    uris: Mutex<HashSet<String>>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // a panicking holder cannot leave the set half-updated
        self.uris.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.lock().contains(uri)
    }

    /// Inserts a uri, returning whether it was new
    pub fn insert(&self, uri: impl Into<String>) -> bool {
        self.lock().insert(uri.into())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Empties the blacklist and returns how many uris it held
    pub fn clear(&self) -> usize {
        let mut uris = self.lock();
        let len = uris.len();
        uris.clear();
        len
    }
}
