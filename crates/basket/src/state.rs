//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::BasketConfig;
use crate::events::EventVerifier;
use crate::rpc::BasketService;
use crate::store::{BasketStore, CacheBackend};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The only shared resource is
/// the cache handle inside the basket service; there is no other mutable
/// state between requests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BasketConfig,
    baskets: BasketService<CacheBackend>,
    tokens: TokenVerifier,
    events: Option<EventVerifier>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Basket service configuration
    /// * `cache` - Connected cache backend
    #[must_use]
    pub fn new(config: BasketConfig, cache: CacheBackend) -> Self {
        let baskets = BasketService::new(BasketStore::new(cache));
        let tokens = TokenVerifier::new(&config.auth);
        let events = config.event_signing_secret.clone().map(EventVerifier::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                baskets,
                tokens,
                events,
            }),
        }
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &BasketConfig {
        &self.inner.config
    }

    /// Get a reference to the basket RPC service.
    #[must_use]
    pub fn baskets(&self) -> &BasketService<CacheBackend> {
        &self.inner.baskets
    }

    /// Get a reference to the bearer token verifier.
    #[must_use]
    pub fn tokens(&self) -> &TokenVerifier {
        &self.inner.tokens
    }

    /// Get the event webhook verifier, if webhooks are enabled.
    #[must_use]
    pub fn events(&self) -> Option<&EventVerifier> {
        self.inner.events.as_ref()
    }
}
