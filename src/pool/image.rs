//! Crawled image values and their identity rules

use serde::Serialize;
use serde_json::{Map, Value};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Crawler-specific metadata attached to an image
pub type ImageExtra = Map<String, Value>;

/// How an image is told apart from others
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Identity {
    /// Identified by its uri
    Uri,
    /// Unique per construction, regardless of uri
    Generic(Uuid),
}

/// One crawled item
///
/// Equality and hashing only look at `uri`, unless the image is generic:
/// a generic image gets a fresh random identity on construction, so any
/// number of generic images with the same uri can live in one set.
/// Clones share the identity of the original.
#[derive(Debug, Clone, Serialize)]
pub struct Image {
    uri: String,
    is_generic: bool,
    source: Option<String>,
    extra: ImageExtra,
    #[serde(skip)]
    identity: Identity,
}

impl Image {
    /// Creates a non-generic image identified by `uri`
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            is_generic: false,
            source: None,
            extra: ImageExtra::new(),
            identity: Identity::Uri,
        }
    }

    /// Creates a generic image; it never equals any other constructed image
    pub fn generic(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            is_generic: true,
            source: None,
            extra: ImageExtra::new(),
            identity: Identity::Generic(Uuid::new_v4()),
        }
    }

    /// Sets the human-navigable origin of the image
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches one metadata entry
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_generic(&self) -> bool {
        self.is_generic
    }

    pub fn extra(&self) -> &ImageExtra {
        &self.extra
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        match (&self.identity, &other.identity) {
            (Identity::Uri, Identity::Uri) => self.uri == other.uri,
            (Identity::Generic(a), Identity::Generic(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Image {}

impl Hash for Image {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.identity {
            Identity::Uri => self.uri.hash(state),
            Identity::Generic(id) => id.hash(state),
        }
    }
}
