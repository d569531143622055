//! Runtime selection between cache backends.

use secrecy::{ExposeSecret, SecretString};

use super::{CacheClient, MemoryCache, RedisCache, StoreError};

/// URL scheme selecting the in-process backend.
pub const MEMORY_SCHEME: &str = "memory://";

/// The cache backend chosen at startup.
#[derive(Debug, Clone)]
pub enum CacheBackend {
    Redis(RedisCache),
    Memory(MemoryCache),
}

impl CacheBackend {
    /// Build the backend named by `url`.
    ///
    /// `memory://` selects an in-process [`MemoryCache`]; `redis://` and
    /// `rediss://` connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` for an unsupported scheme or if
    /// Redis cannot be reached.
    pub async fn from_url(url: &SecretString) -> Result<Self, StoreError> {
        let raw = url.expose_secret();

        if raw.starts_with(MEMORY_SCHEME) {
            return Ok(Self::Memory(MemoryCache::new()));
        }

        if is_redis_url(raw) {
            return RedisCache::connect(url).await.map(Self::Redis);
        }

        Err(StoreError::Unavailable(
            "unsupported store URL scheme (expected redis://, rediss:// or memory://)".to_string(),
        ))
    }

    /// Short name of the backend, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Redis(_) => "redis",
            Self::Memory(_) => "memory",
        }
    }
}

/// Returns true if `url` names a Redis server.
#[must_use]
pub fn is_redis_url(url: &str) -> bool {
    url.starts_with("redis://") || url.starts_with("rediss://")
}

impl From<MemoryCache> for CacheBackend {
    fn from(cache: MemoryCache) -> Self {
        Self::Memory(cache)
    }
}

impl From<RedisCache> for CacheBackend {
    fn from(cache: RedisCache) -> Self {
        Self::Redis(cache)
    }
}

impl CacheClient for CacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::Redis(cache) => cache.get(key).await,
            Self::Memory(cache) => cache.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<bool, StoreError> {
        match self {
            Self::Redis(cache) => cache.set(key, value).await,
            Self::Memory(cache) => cache.set(key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        match self {
            Self::Redis(cache) => cache.delete(key).await,
            Self::Memory(cache) => cache.delete(key).await,
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Self::Redis(cache) => cache.ping().await,
            Self::Memory(cache) => cache.ping().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_url_selects_memory_backend() {
        let backend = CacheBackend::from_url(&SecretString::from("memory://"))
            .await
            .unwrap();
        assert_eq!(backend.kind(), "memory");
        assert!(backend.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_scheme_rejected() {
        let result = CacheBackend::from_url(&SecretString::from("memcached://localhost")).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_is_redis_url() {
        assert!(is_redis_url("redis://localhost:6379"));
        assert!(is_redis_url("rediss://cache.internal:6380/0"));
        assert!(!is_redis_url("memory://"));
        assert!(!is_redis_url("http://localhost"));
    }
}
