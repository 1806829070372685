//! Document cache
//!
//! HashMap-based cache with RwLock for concurrency.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::document::Document;

/// In-memory mirror of durable values
///
/// Only the owning store mutates it, and only while holding the key's
/// writer slot, so an entry never regresses to an older value.
#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: RwLock<HashMap<String, Document>>,
}

impl DocumentCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the cached value (read lock)
    pub fn get(&self, key: &str) -> Option<Document> {
        self.entries.read().get(key).cloned()
    }

    /// Insert or replace a value (write lock)
    pub fn insert(&self, key: &str, document: Document) {
        self.entries.write().insert(key.to_string(), document);
    }

    /// Evict a key (write lock)
    pub fn evict(&self, key: &str) -> Option<Document> {
        self.entries.write().remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
