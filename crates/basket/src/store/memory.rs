//! In-process cache backend built on `moka`.
//!
//! Used for local development (`BASKET_STORE_URL=memory://`) and tests.
//! The cache has no capacity bound and no TTL, so an entry only goes away
//! through `delete`. Memory grows with the number of buyers.

use moka::future::Cache;

use super::{CacheClient, StoreError};

/// In-process string cache.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, String>,
}

impl MemoryCache {
    /// Create an empty, unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    /// Approximate number of entries currently held.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.entry_count())
            .finish_non_exhaustive()
    }
}

impl CacheClient for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).await)
    }

    async fn set(&self, key: &str, value: String) -> Result<bool, StoreError> {
        self.entries.insert(key.to_owned(), value).await;
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).await.is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();

        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.set("k", "v1".to_string()).await.unwrap());
        assert!(cache.set("k", "v2".to_string()).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v2"));

        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_are_never_evicted() {
        let cache = MemoryCache::new();

        for i in 0..2_000 {
            cache.set(&format!("/basket/u{i}"), "{}".to_string()).await.unwrap();
        }
        cache.entries.run_pending_tasks().await;

        assert_eq!(cache.entry_count(), 2_000);
        for i in 0..2_000 {
            assert!(cache.get(&format!("/basket/u{i}")).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = MemoryCache::new();
        let other = cache.clone();

        cache.set("k", "v".to_string()).await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
