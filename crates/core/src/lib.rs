//! eShop Core - Shared basket domain types.
//!
//! This crate provides the types shared by every eShop basket component:
//! - `basket` - The basket service (store, RPC surface, HTTP transport)
//! - `cli` - Operator tools for inspecting and clearing baskets
//!
//! # Architecture
//!
//! The core crate contains only types and their wire encoding - no I/O, no
//! cache access, no HTTP. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Buyer and product identifiers, quantities, and the basket itself
//! - [`codec`] - The JSON encoding baskets are persisted with

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod codec;
pub mod types;

pub use codec::CodecError;
pub use types::*;
