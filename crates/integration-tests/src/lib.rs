//! Integration tests for the eShop basket service.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (in-memory store, no external services)
//! cargo test -p eshop-integration-tests
//!
//! # Include tests against Redis
//! BASKET_TEST_REDIS_URL=redis://127.0.0.1:6379 \
//!     cargo test -p eshop-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `basket_api` - Basket endpoints over HTTP
//! - `order_events` - Signed integration event webhooks
//! - `redis_store` - Store behavior against a live Redis

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use eshop_basket::auth::{AuthError, TokenIssuer};
use eshop_basket::config::{AuthConfig, BasketConfig, StoreConfig};
use eshop_basket::events::{EventError, EventVerifier};
use eshop_basket::routes;
use eshop_basket::state::AppState;
use eshop_basket::store::{CacheBackend, MemoryCache, StoreError};
use eshop_core::BuyerId;
use secrecy::SecretString;

/// Bearer token secret shared by the test server and clients.
pub const JWT_SECRET: &str = "Rw5Kc9Tz2Hm7Qb4Xn1Vf8Lj3Gd6Ps0Ya";
/// Webhook signing secret shared by the test server and clients.
pub const SIGNING_SECRET: &str = "Mb2Xq7Fw4Zr9Kt1Nc6Hv3Jp8Ld5Gs0Ue";

/// Env var naming the Redis server used by ignored tests.
pub const REDIS_URL_VAR: &str = "BASKET_TEST_REDIS_URL";

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SecretString::from(JWT_SECRET),
        issuer: None,
        audience: None,
    }
}

/// Test configuration bound to an ephemeral local port.
#[must_use]
pub fn test_config(store_url: &str) -> BasketConfig {
    BasketConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        store: StoreConfig {
            url: SecretString::from(store_url),
        },
        auth: auth_config(),
        event_signing_secret: Some(SecretString::from(SIGNING_SECRET)),
        request_timeout: Duration::from_secs(5),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A basket server running on a background task.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Start a server over a fresh in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let cache = CacheBackend::Memory(MemoryCache::new());
        Self::start_with(test_config("memory://"), cache).await
    }

    /// Start a server over `cache`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start_with(config: BasketConfig, cache: CacheBackend) -> Self {
        let listener = tokio::net::TcpListener::bind(config.socket_addr())
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = routes::app(AppState::new(config, cache));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            client: reqwest::Client::new(),
        }
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

/// A bearer token for `buyer` signed with [`JWT_SECRET`].
///
/// # Errors
///
/// Returns `AuthError` if `buyer` is not a valid buyer id or signing fails.
pub fn token_for(buyer: &str) -> Result<String, AuthError> {
    let buyer_id = BuyerId::parse(buyer).map_err(|_| AuthError::InvalidSubject)?;
    TokenIssuer::new(&auth_config()).issue(&buyer_id, Duration::from_secs(300))
}

/// Signature header value for `body` at `timestamp`.
///
/// # Errors
///
/// Returns `EventError` if the HMAC cannot be keyed.
pub fn sign_event(timestamp: i64, body: &str) -> Result<String, EventError> {
    EventVerifier::new(SecretString::from(SIGNING_SECRET)).sign(timestamp, body)
}

/// Connect to the Redis named by [`REDIS_URL_VAR`], if set.
///
/// # Errors
///
/// Returns `StoreError` if the server cannot be reached.
pub async fn redis_backend() -> Option<Result<CacheBackend, StoreError>> {
    let url = std::env::var(REDIS_URL_VAR).ok()?;
    Some(CacheBackend::from_url(&SecretString::from(url)).await)
}
