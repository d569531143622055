//! Persisted encoding for baskets.
//!
//! Baskets are stored as UTF-8 JSON. The field naming rules live on the
//! types themselves (see [`crate::types::basket`]); this module only wraps
//! `serde_json` so callers get a single error type.

use thiserror::Error;

use crate::CustomerBasket;

/// Errors produced while encoding or decoding a stored basket.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode basket: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode basket: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encode a basket for storage.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode(basket: &CustomerBasket) -> Result<String, CodecError> {
    serde_json::to_string(basket).map_err(CodecError::Encode)
}

/// Decode a stored basket.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if `data` is not a valid basket document.
pub fn decode(data: &str) -> Result<CustomerBasket, CodecError> {
    serde_json::from_str(data).map_err(CodecError::Decode)
}
