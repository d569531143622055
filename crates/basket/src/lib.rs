//! eShop Basket service library.
//!
//! Per-buyer shopping baskets kept in a key-value cache behind an
//! authenticated JSON API. The binary in `main.rs` wires configuration,
//! tracing and Sentry around [`routes::app`]; the library is exposed so the
//! service can be tested in-process and driven by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod middleware;
pub mod routes;
pub mod rpc;
pub mod state;
pub mod store;
