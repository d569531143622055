//! HTTP route handlers for the basket service.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Liveness check
//! GET    /health/ready               - Readiness check (pings the cache)
//!
//! # Basket (bearer token required)
//! GET    /api/basket                 - GetBasket
//! PUT    /api/basket                 - UpdateBasket
//! DELETE /api/basket                 - DeleteBasket
//!
//! # Integration events (signed webhooks)
//! POST   /api/events/order-started   - Clear the buyer's basket
//! ```

pub mod basket;
pub mod events;
pub mod health;

use axum::{
    Router,
    extract::Request,
    middleware,
    routing::{get, post},
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the basket routes router.
pub fn basket_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(basket::get_basket)
            .put(basket::update_basket)
            .delete(basket::delete_basket),
    )
}

/// Create the integration event routes router.
pub fn event_routes() -> Router<AppState> {
    Router::new().route("/order-started", post(events::order_started))
}

/// Create all routes for the basket service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/basket", basket_routes())
        .nest("/api/events", event_routes())
}

/// Build the full application with its middleware stack.
pub fn app(state: AppState) -> Router {
    let timeout = state.config().request_timeout;

    routes()
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                buyer_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
