//! Basket persistence in a key-value cache.
//!
//! One basket per buyer, stored under `"/basket/" + buyer_id` as the JSON
//! document produced by [`eshop_core::codec`]. The cache provides per-key
//! atomicity; nothing here locks. A replace is a blind overwrite, so two
//! concurrent replaces for the same buyer leave whichever completed last.
//!
//! # Backends
//!
//! - [`RedisCache`] - production, one shared auto-reconnecting connection
//! - [`MemoryCache`] - in-process `moka` cache for development and tests
//! - [`CacheBackend`] - picks one of the above from configuration

mod backend;
mod memory;
mod redis_cache;

use std::future::Future;

use eshop_core::{BuyerId, CodecError, CustomerBasket, codec};
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub use backend::{CacheBackend, MEMORY_SCHEME, is_redis_url};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Namespace prefix for basket keys.
pub const BASKET_KEY_PREFIX: &str = "/basket/";

/// Derive the cache key for a buyer's basket.
#[must_use]
pub fn basket_key(buyer_id: &BuyerId) -> String {
    format!("{BASKET_KEY_PREFIX}{buyer_id}")
}

/// Errors from the basket store.
///
/// A missing basket is not an error; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The cache could not be reached or rejected the command.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be encoded or decoded.
    #[error("corrupt basket at {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: CodecError,
    },
}

/// Minimal string key-value operations the basket store needs.
pub trait CacheClient: Send + Sync {
    /// Read a value. `None` when the key does not exist.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Write a value, replacing any previous one. Returns whether the write applied.
    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Remove a key. Returns whether a key was removed.
    fn delete(&self, key: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Check that the cache is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Store of one [`CustomerBasket`] per buyer.
#[derive(Debug, Clone)]
pub struct BasketStore<C> {
    cache: C,
}

impl<C: CacheClient> BasketStore<C> {
    /// Create a store over `cache`.
    #[must_use]
    pub const fn new(cache: C) -> Self {
        Self { cache }
    }

    /// Get the underlying cache client.
    #[must_use]
    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// Get the basket for `buyer_id`, or `None` if the buyer has none.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the cache cannot be reached and
    /// `StoreError::Corrupt` if the stored value does not decode.
    #[instrument(skip(self), fields(buyer_id = %buyer_id))]
    pub async fn get(&self, buyer_id: &BuyerId) -> Result<Option<CustomerBasket>, StoreError> {
        let key = basket_key(buyer_id);

        let Some(data) = self.cache.get(&key).await? else {
            debug!("No basket stored");
            return Ok(None);
        };

        if data.is_empty() {
            debug!("Empty value stored, treating as no basket");
            return Ok(None);
        }

        codec::decode(&data)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { key, source })
    }

    /// Replace the stored basket for `basket.buyer_id`.
    ///
    /// Returns the basket as read back after the write, or `None` if the
    /// write did not apply.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the cache cannot be reached and
    /// `StoreError::Corrupt` if the basket cannot be encoded or the stored
    /// value does not decode on read-back.
    #[instrument(skip(self, basket), fields(buyer_id = %basket.buyer_id, items = basket.items.len()))]
    pub async fn replace(
        &self,
        basket: &CustomerBasket,
    ) -> Result<Option<CustomerBasket>, StoreError> {
        let key = basket_key(&basket.buyer_id);
        let data = codec::encode(basket).map_err(|source| StoreError::Corrupt {
            key: key.clone(),
            source,
        })?;

        if !self.cache.set(&key, data).await? {
            warn!("Basket write did not apply");
            return Ok(None);
        }

        debug!("Basket persisted");
        self.get(&basket.buyer_id).await
    }

    /// Delete the basket for `buyer_id`.
    ///
    /// Returns `true` if a basket existed and was removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the cache cannot be reached.
    #[instrument(skip(self), fields(buyer_id = %buyer_id))]
    pub async fn delete(&self, buyer_id: &BuyerId) -> Result<bool, StoreError> {
        self.cache.delete(&basket_key(buyer_id)).await
    }

    /// Check that the underlying cache is reachable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if it is not.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.cache.ping().await
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use eshop_core::{BasketItem, ProductId};

    use super::test_support::{DownCache, RejectingCache};
    use super::*;

    fn buyer(id: &str) -> BuyerId {
        BuyerId::parse(id).unwrap()
    }

    fn memory_store() -> BasketStore<MemoryCache> {
        BasketStore::new(MemoryCache::new())
    }

    fn basket(id: &str, items: &[(i32, i32)]) -> CustomerBasket {
        CustomerBasket::with_items(
            buyer(id),
            items
                .iter()
                .map(|&(product, quantity)| BasketItem::new(ProductId::new(product), quantity))
                .collect(),
        )
    }

    #[test]
    fn test_basket_key_uses_namespace() {
        assert_eq!(basket_key(&buyer("u1")), "/basket/u1");
    }

    #[test]
    fn test_basket_key_is_injective() {
        let ids = ["u1", "U1", "u1 ", "u/1", "basket/u1", "u", "1u"];
        let keys: HashSet<String> = ids.iter().map(|id| basket_key(&buyer(id))).collect();
        assert_eq!(keys.len(), ids.len());
    }

    #[tokio::test]
    async fn test_get_never_written_is_absent() {
        let store = memory_store();
        assert!(store.get(&buyer("u1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_then_get_roundtrips() {
        let store = memory_store();
        let written = basket("u1", &[(42, 3), (7, 10_000), (1, 0)]);

        let stored = store.replace(&written).await.unwrap();
        assert_eq!(stored.as_ref(), Some(&written));

        let read = store.get(&buyer("u1")).await.unwrap();
        assert_eq!(read, Some(written));
    }

    #[tokio::test]
    async fn test_replace_overwrites_whole_basket() {
        let store = memory_store();
        store.replace(&basket("u1", &[(1, 1), (2, 2)])).await.unwrap();
        store.replace(&basket("u1", &[(3, 3)])).await.unwrap();

        let read = store.get(&buyer("u1")).await.unwrap().unwrap();
        assert_eq!(read, basket("u1", &[(3, 3)]));
    }

    #[tokio::test]
    async fn test_replace_with_empty_items() {
        let store = memory_store();
        store.replace(&basket("u1", &[])).await.unwrap();

        let read = store.get(&buyer("u1")).await.unwrap().unwrap();
        assert!(read.is_empty());
    }

    #[tokio::test]
    async fn test_baskets_are_isolated_per_buyer() {
        let store = memory_store();
        store.replace(&basket("u1", &[(1, 1)])).await.unwrap();
        store.replace(&basket("u2", &[(2, 2)])).await.unwrap();

        assert_eq!(
            store.get(&buyer("u1")).await.unwrap(),
            Some(basket("u1", &[(1, 1)]))
        );
        assert!(store.delete(&buyer("u2")).await.unwrap());
        assert!(store.get(&buyer("u1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = memory_store();
        store.replace(&basket("u1", &[(1, 1)])).await.unwrap();

        assert!(store.delete(&buyer("u1")).await.unwrap());
        assert!(!store.delete(&buyer("u1")).await.unwrap());
        assert!(store.get(&buyer("u1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_never_written() {
        let store = memory_store();
        assert!(!store.delete(&buyer("ghost")).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_not_applied_returns_none() {
        let store = BasketStore::new(RejectingCache);
        let result = store.replace(&basket("u1", &[(1, 1)])).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_is_distinct_from_absent() {
        let store = BasketStore::new(DownCache);

        assert!(matches!(
            store.get(&buyer("u1")).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.replace(&basket("u1", &[])).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.delete(&buyer("u1")).await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_value_is_reported() {
        let cache = MemoryCache::new();
        cache.set("/basket/u1", "{not json".to_string()).await.unwrap();
        let store = BasketStore::new(cache);

        let err = store.get(&buyer("u1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "/basket/u1"));
    }

    #[tokio::test]
    async fn test_empty_value_is_absent() {
        let cache = MemoryCache::new();
        cache.set("/basket/u1", String::new()).await.unwrap();
        let store = BasketStore::new(cache);

        assert!(store.get(&buyer("u1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_pascal_case_documents() {
        let cache = MemoryCache::new();
        cache
            .set(
                "/basket/u1",
                r#"{"BuyerId":"u1","Items":[{"ProductId":42,"Quantity":3}]}"#.to_string(),
            )
            .await
            .unwrap();
        let store = BasketStore::new(cache);

        let read = store.get(&buyer("u1")).await.unwrap();
        assert_eq!(read, Some(basket("u1", &[(42, 3)])));
    }

    #[tokio::test]
    async fn test_concurrent_replace_keeps_one_value() {
        let store = memory_store();
        let first = basket("u1", &[(1, 1), (2, 2), (3, 3)]);
        let second = basket("u1", &[(9, 9)]);

        let (a, b) = tokio::join!(store.replace(&first), store.replace(&second));
        a.unwrap();
        b.unwrap();

        let read = store.get(&buyer("u1")).await.unwrap().unwrap();
        assert!(read == first || read == second, "interleaved basket: {read:?}");
    }

    #[tokio::test]
    async fn test_concurrent_replace_across_tasks() {
        let store = memory_store();
        let written: Vec<CustomerBasket> = (0..16)
            .map(|n| basket("u1", &[(n, n), (n + 100, 1)]))
            .collect();

        let handles: Vec<_> = written
            .iter()
            .cloned()
            .map(|b| {
                let store = store.clone();
                tokio::spawn(async move { store.replace(&b).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let read = store.get(&buyer("u1")).await.unwrap().unwrap();
        assert!(written.contains(&read));
    }
}
