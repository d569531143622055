//! Caller identity extractor.
//!
//! Resolves the bearer token once per request. Extraction never rejects:
//! a request without a usable token yields `Caller(None)`, and the RPC
//! service turns that into `Unauthenticated`.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use eshop_core::BuyerId;
use tracing::debug;

use crate::error::set_sentry_user;
use crate::state::AppState;

/// The authenticated buyer making the call, if any.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(State(state): State<AppState>, Caller(caller): Caller) -> Result<Json<_>> {
///     Ok(Json(state.baskets().get_basket(caller).await?))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller(pub Option<BuyerId>);

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match state.tokens().identify(&parts.headers) {
            Ok(buyer_id) => {
                set_sentry_user(&buyer_id);
                Ok(Self(Some(buyer_id)))
            }
            Err(reason) => {
                debug!(%reason, "No caller identity");
                Ok(Self(None))
            }
        }
    }
}
