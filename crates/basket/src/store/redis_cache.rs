//! Redis cache backend.
//!
//! Holds a single [`ConnectionManager`]: a multiplexed connection that
//! reconnects on failure and is cheap to clone, so every request shares it.
//! Each basket operation is one command (`GET`, `SET`, `DEL`), which Redis
//! applies atomically.

use redis::Client;
use redis::aio::ConnectionManager;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use super::{CacheClient, StoreError};

/// Redis-backed string cache.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis at `url` (`redis://` or `rediss://`).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the URL is invalid or the
    /// initial connection fails.
    pub async fn connect(url: &SecretString) -> Result<Self, StoreError> {
        let client = Client::open(url.expose_secret())
            .map_err(|e| StoreError::Unavailable(format!("Failed to create Redis client: {e}")))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect to Redis: {e}")))?;

        info!("Connected to Redis");
        Ok(Self { connection })
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

impl CacheClient for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection.clone();

        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Redis GET failed: {e}")))
    }

    async fn set(&self, key: &str, value: String) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();

        // Plain SET replies OK; nil means the write was not performed.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Redis SET failed: {e}")))?;

        Ok(reply.is_some_and(|r| r == "OK"))
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();

        let removed: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Redis DEL failed: {e}")))?;

        Ok(removed > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Redis PING failed: {e}")))?;

        Ok(())
    }
}
