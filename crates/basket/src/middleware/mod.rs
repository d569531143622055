//! HTTP middleware stack for the basket service.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Timeout (per-request deadline)
//!
//! Caller identity is not middleware: handlers take the [`Caller`]
//! extractor and pass the resolved buyer to the RPC service explicitly.

pub mod auth;
pub mod request_id;

pub use auth::Caller;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
