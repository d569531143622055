//! Wire messages for the basket RPC surface.
//!
//! These mirror the `Basket` service contract: camelCase JSON, product ids
//! and quantities as plain integers. Conversion into domain types happens in
//! [`super::BasketService`], which validates quantities on the way in.

use eshop_core::{BasketItem, CustomerBasket};
use serde::{Deserialize, Serialize};

/// One line in a basket request or response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketItemMessage {
    pub product_id: i32,
    pub quantity: i32,
}

/// Response of `GetBasket` and `UpdateBasket`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerBasketResponse {
    #[serde(default)]
    pub items: Vec<BasketItemMessage>,
}

/// Request body of `UpdateBasket`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBasketRequest {
    #[serde(default)]
    pub items: Vec<BasketItemMessage>,
}

/// Response of `DeleteBasket`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteBasketResponse {}

impl From<&BasketItem> for BasketItemMessage {
    fn from(item: &BasketItem) -> Self {
        Self {
            product_id: item.product_id.as_i32(),
            quantity: item.quantity,
        }
    }
}

impl From<&CustomerBasket> for CustomerBasketResponse {
    fn from(basket: &CustomerBasket) -> Self {
        Self {
            items: basket.items.iter().map(BasketItemMessage::from).collect(),
        }
    }
}
