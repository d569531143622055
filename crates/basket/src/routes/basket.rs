//! Basket route handlers.
//!
//! Thin adapters from HTTP to [`BasketService`](crate::rpc::BasketService):
//! the caller comes from the [`Caller`] extractor and the service decides
//! whether an anonymous call is allowed.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::error::{AppError, Result};
use crate::middleware::Caller;
use crate::rpc::{CustomerBasketResponse, DeleteBasketResponse, UpdateBasketRequest};
use crate::state::AppState;

/// `GET /api/basket`
pub async fn get_basket(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<CustomerBasketResponse>> {
    let basket = state.baskets().get_basket(caller).await?;
    Ok(Json(basket))
}

/// `PUT /api/basket`
///
/// Body: `{"items": [{"productId": 42, "quantity": 3}]}`
pub async fn update_basket(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: std::result::Result<Json<UpdateBasketRequest>, JsonRejection>,
) -> Result<Json<CustomerBasketResponse>> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let basket = state.baskets().update_basket(caller, request).await?;
    Ok(Json(basket))
}

/// `DELETE /api/basket`
pub async fn delete_basket(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<DeleteBasketResponse>> {
    let response = state.baskets().delete_basket(caller).await?;
    Ok(Json(response))
}
