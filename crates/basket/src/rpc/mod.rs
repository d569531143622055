//! Basket RPC service.
//!
//! Mediates between an authenticated caller and the [`BasketStore`]. Each
//! call runs the same sequence:
//!
//! ```text
//! Received -> AuthenticateCaller -> Unauthenticated (terminal)
//!                                -> ValidateRequest -> InvalidRequest (terminal)
//!                                                   -> InvokeStore -> Success | StoreFailure
//! ```
//!
//! The transport resolves the caller once per request and passes it in as
//! `Option<BuyerId>`; nothing here reads request context.

pub mod messages;

use eshop_core::{BasketItem, BuyerId, CustomerBasket, ProductId, Quantity};
use tracing::{Span, debug, info, instrument};

use crate::error::BasketError;
use crate::store::{BasketStore, CacheClient};

pub use messages::{
    BasketItemMessage, CustomerBasketResponse, DeleteBasketResponse, UpdateBasketRequest,
};

/// The basket RPC operations over a store.
#[derive(Debug, Clone)]
pub struct BasketService<C> {
    store: BasketStore<C>,
}

impl<C: CacheClient> BasketService<C> {
    /// Create a service over `store`.
    #[must_use]
    pub const fn new(store: BasketStore<C>) -> Self {
        Self { store }
    }

    /// Get the underlying store.
    #[must_use]
    pub const fn store(&self) -> &BasketStore<C> {
        &self.store
    }

    /// `GetBasket`: the caller's basket, or an empty one if none exists yet.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if `caller` is `None`
    /// - `StoreUnavailable` / `Internal` if the store fails
    #[instrument(skip_all, fields(buyer_id))]
    pub async fn get_basket(
        &self,
        caller: Option<BuyerId>,
    ) -> Result<CustomerBasketResponse, BasketError> {
        let buyer_id = authenticate(caller)?;
        debug!("Begin GetBasket");

        let basket = self.store.get(&buyer_id).await?;

        Ok(basket
            .as_ref()
            .map(CustomerBasketResponse::from)
            .unwrap_or_default())
    }

    /// `UpdateBasket`: replace the caller's basket with `request.items`.
    ///
    /// Returns the basket as stored.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if `caller` is `None`
    /// - `InvalidArgument` if any quantity is outside 0..=10000
    /// - `NotFound` if the write did not apply
    /// - `StoreUnavailable` / `Internal` if the store fails
    #[instrument(skip_all, fields(buyer_id, items = request.items.len()))]
    pub async fn update_basket(
        &self,
        caller: Option<BuyerId>,
        request: UpdateBasketRequest,
    ) -> Result<CustomerBasketResponse, BasketError> {
        let buyer_id = authenticate(caller)?;
        debug!("Begin UpdateBasket");

        let basket = map_to_customer_basket(buyer_id, &request)?;

        match self.store.replace(&basket).await? {
            Some(stored) => Ok(CustomerBasketResponse::from(&stored)),
            None => Err(BasketError::NotFound {
                buyer_id: basket.buyer_id,
            }),
        }
    }

    /// `DeleteBasket`: remove the caller's basket. Deleting a basket that does
    /// not exist succeeds.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if `caller` is `None`
    /// - `StoreUnavailable` if the store fails
    #[instrument(skip_all, fields(buyer_id))]
    pub async fn delete_basket(
        &self,
        caller: Option<BuyerId>,
    ) -> Result<DeleteBasketResponse, BasketError> {
        let buyer_id = authenticate(caller)?;

        let existed = self.store.delete(&buyer_id).await?;
        debug!(existed, "Basket deleted");

        Ok(DeleteBasketResponse {})
    }

    /// Clear a buyer's basket because their order has started.
    ///
    /// Returns whether a basket existed.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the store fails.
    #[instrument(skip(self), fields(buyer_id = %buyer_id))]
    pub async fn clear_for_order(&self, buyer_id: &BuyerId) -> Result<bool, BasketError> {
        let existed = self.store.delete(buyer_id).await?;
        info!(existed, "Basket cleared for started order");
        Ok(existed)
    }
}

/// Resolve the caller or fail the call.
fn authenticate(caller: Option<BuyerId>) -> Result<BuyerId, BasketError> {
    let buyer_id = caller.ok_or(BasketError::Unauthenticated)?;
    Span::current().record("buyer_id", buyer_id.as_str());
    Ok(buyer_id)
}

/// Build the domain basket from a request, validating every quantity.
fn map_to_customer_basket(
    buyer_id: BuyerId,
    request: &UpdateBasketRequest,
) -> Result<CustomerBasket, BasketError> {
    let items = request
        .items
        .iter()
        .map(|item| {
            let quantity = Quantity::parse(item.quantity).map_err(|e| {
                BasketError::InvalidArgument(format!("product {}: {e}", item.product_id))
            })?;
            Ok(BasketItem::new(
                ProductId::new(item.product_id),
                quantity.get(),
            ))
        })
        .collect::<Result<Vec<_>, BasketError>>()?;

    Ok(CustomerBasket::with_items(buyer_id, items))
}
