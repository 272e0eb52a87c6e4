//! Content-addressed blob cache.
//!
//! Keys combine the caller's content intent with the provider blob id,
//! so the text and binary representations of one blob cache
//! independently. Blob ids are immutable, so entries never go stale and
//! no TTL is needed; capacity eviction is left to Moka. The cache is
//! advisory: a miss is always satisfiable by re-fetching, and it is
//! never consulted for writes.

use std::sync::Arc;

use moka::future::Cache;

use quarry_core::{ContentIntent, FileDescriptor, Payload};

/// Default maximum number of cached payloads.
const DEFAULT_CAPACITY: u64 = 2048;

/// A cache of decoded file payloads keyed by content identifier.
#[derive(Clone)]
pub struct BlobCache {
    inner: Cache<String, Arc<Payload>>,
}

impl BlobCache {
    /// Creates a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a cache bounded to `capacity` entries.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Returns the cached payload for a descriptor under the given
    /// intent. Descriptors without a content identifier never hit.
    pub async fn get(&self, file: &FileDescriptor, intent: ContentIntent) -> Option<Arc<Payload>> {
        let key = file.cache_key(intent)?;
        self.inner.get(&key).await
    }

    /// Stores a payload for a descriptor. Descriptors without a content
    /// identifier are not cacheable and are silently skipped.
    pub async fn insert(&self, file: &FileDescriptor, payload: Payload) {
        if let Some(key) = file.cache_key(payload.intent()) {
            self.inner.insert(key, Arc::new(payload)).await;
        }
    }

    /// Returns the approximate number of cached entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for BlobCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BlobCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobCache")
            .field("entries", &self.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = BlobCache::new();
        let file = FileDescriptor::new("posts/a.md").with_id("sha1");

        cache
            .insert(&file, Payload::Text("hello".to_string()))
            .await;

        let hit = cache.get(&file, ContentIntent::Text).await;
        assert_eq!(hit.unwrap().as_text(), Some("hello"));
    }

    #[tokio::test]
    async fn test_intents_cache_independently() {
        let cache = BlobCache::new();
        let file = FileDescriptor::new("media/logo.png").with_id("sha2");

        cache
            .insert(&file, Payload::Binary(vec![1, 2, 3]))
            .await;

        // The binary representation is cached; the text one is not.
        assert!(cache.get(&file, ContentIntent::Binary).await.is_some());
        assert!(cache.get(&file, ContentIntent::Text).await.is_none());
    }

    #[tokio::test]
    async fn test_descriptor_without_id_never_caches() {
        let cache = BlobCache::new();
        let file = FileDescriptor::new("posts/a.md");

        cache.insert(&file, Payload::Text("x".to_string())).await;
        assert!(cache.get(&file, ContentIntent::Text).await.is_none());
    }
}
