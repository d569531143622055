//! Core types for the basket service.
//!
//! This module provides type-safe wrappers for the basket domain.

pub mod basket;
pub mod buyer;
pub mod id;
pub mod quantity;

pub use basket::{BasketItem, CustomerBasket};
pub use buyer::{BuyerId, BuyerIdError};
pub use id::*;
pub use quantity::{Quantity, QuantityError};
