//! Integration events consumed by the basket service.
//!
//! The ordering service publishes `OrderStarted` when a buyer checks out; the
//! buyer's basket is then cleared. Events arrive as signed webhooks:
//!
//! ```text
//! POST /api/events/order-started
//! X-Event-Timestamp: <unix seconds>
//! X-Event-Signature: v0=<hex hmac-sha256 of "v0:{timestamp}:{body}">
//! ```

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use eshop_core::BuyerId;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::BasketError;
use crate::rpc::BasketService;
use crate::store::CacheClient;

/// Header carrying the signing timestamp.
pub const TIMESTAMP_HEADER: &str = "x-event-timestamp";
/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-event-signature";

/// Maximum age of a signed event, in seconds.
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Errors raised while accepting an integration event.
#[derive(Debug, Error)]
pub enum EventError {
    /// Signature or timestamp did not verify.
    #[error("invalid event signature: {0}")]
    InvalidSignature(String),

    /// Body is not a valid event.
    #[error("malformed event: {0}")]
    Malformed(String),
}

impl EventError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            Self::Malformed(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidSignature(_) => "unauthenticated",
            Self::Malformed(_) => "invalid_argument",
        }
    }
}

/// Published by ordering when a buyer's order has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStartedIntegrationEvent {
    pub id: Uuid,
    pub creation_date: DateTime<Utc>,
    pub user_id: String,
}

impl OrderStartedIntegrationEvent {
    /// Create a new event for `user_id`, stamped now.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            creation_date: Utc::now(),
            user_id: user_id.into(),
        }
    }
}

/// Verifies webhook signatures with the shared signing secret.
#[derive(Clone)]
pub struct EventVerifier {
    signing_secret: SecretString,
}

impl std::fmt::Debug for EventVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventVerifier")
            .field("signing_secret", &"[REDACTED]")
            .finish()
    }
}

impl EventVerifier {
    #[must_use]
    pub const fn new(signing_secret: SecretString) -> Self {
        Self { signing_secret }
    }

    /// Compute the signature header value for `body` at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSignature` if the HMAC cannot be keyed.
    pub fn sign(&self, timestamp: i64, body: &str) -> Result<String, EventError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.signing_secret.expose_secret().as_bytes())
            .map_err(|e| EventError::InvalidSignature(e.to_string()))?;

        mac.update(format!("v0:{timestamp}:{body}").as_bytes());

        Ok(format!("v0={}", hex::encode(mac.finalize().into_bytes())))
    }

    /// Verify a webhook signature against the current time.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSignature` if the timestamp is unparsable or more than
    /// five minutes from now, or if the signature does not match.
    pub fn verify_signature(
        &self,
        timestamp: &str,
        body: &str,
        signature: &str,
    ) -> Result<(), EventError> {
        self.verify_signature_at(timestamp, body, signature, Utc::now().timestamp())
    }

    fn verify_signature_at(
        &self,
        timestamp: &str,
        body: &str,
        signature: &str,
        now: i64,
    ) -> Result<(), EventError> {
        let ts: i64 = timestamp
            .parse()
            .map_err(|_| EventError::InvalidSignature("Invalid timestamp".to_string()))?;

        if now.abs_diff(ts) > MAX_EVENT_AGE_SECS.unsigned_abs() {
            return Err(EventError::InvalidSignature(
                "Request timestamp too old".to_string(),
            ));
        }

        let expected = self.sign(ts, body)?;

        if !constant_time_compare(&expected, signature) {
            return Err(EventError::InvalidSignature(
                "Signature mismatch".to_string(),
            ));
        }

        Ok(())
    }
}

/// Compare two strings without short-circuiting on the first difference.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

/// Clears a buyer's basket when their order starts.
#[derive(Debug)]
pub struct OrderStartedHandler<'a, C> {
    service: &'a BasketService<C>,
}

impl<'a, C: CacheClient> OrderStartedHandler<'a, C> {
    #[must_use]
    pub const fn new(service: &'a BasketService<C>) -> Self {
        Self { service }
    }

    /// Handle one event. Returns whether a basket was removed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the event names no buyer and
    /// `StoreUnavailable` if the store fails.
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    pub async fn handle(&self, event: &OrderStartedIntegrationEvent) -> Result<bool, BasketError> {
        info!(
            user_id = %event.user_id,
            creation_date = %event.creation_date,
            "Handling integration event OrderStarted"
        );

        let buyer_id = BuyerId::parse(&event.user_id)
            .map_err(|e| BasketError::InvalidArgument(format!("userId: {e}")))?;

        self.service.clear_for_order(&buyer_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::rpc::{BasketItemMessage, UpdateBasketRequest};
    use crate::store::{BasketStore, MemoryCache};

    fn verifier() -> EventVerifier {
        EventVerifier::new(SecretString::from("test-signing-secret"))
    }

    #[test]
    fn test_signature_roundtrip() {
        let verifier = verifier();
        let now = 1_700_000_000;
        let body = r#"{"userId":"u1"}"#;
        let signature = verifier.sign(now, body).unwrap();

        assert!(signature.starts_with("v0="));
        assert!(
            verifier
                .verify_signature_at(&now.to_string(), body, &signature, now + 10)
                .is_ok()
        );
    }

    #[test]
    fn test_signature_matches_reference_hmac() {
        let body = "payload";
        let mut mac = Hmac::<Sha256>::new_from_slice(b"test-signing-secret").unwrap();
        mac.update(b"v0:42:payload");
        let expected = format!("v0={}", hex::encode(mac.finalize().into_bytes()));

        assert_eq!(verifier().sign(42, body).unwrap(), expected);
    }

    #[test]
    fn test_signature_rejects_tampered_body() {
        let verifier = verifier();
        let now = 1_700_000_000;
        let signature = verifier.sign(now, r#"{"userId":"u1"}"#).unwrap();

        let result =
            verifier.verify_signature_at(&now.to_string(), r#"{"userId":"u2"}"#, &signature, now);
        assert!(matches!(result, Err(EventError::InvalidSignature(_))));
    }

    #[test]
    fn test_signature_rejects_stale_timestamp() {
        let verifier = verifier();
        let then = 1_700_000_000;
        let signature = verifier.sign(then, "{}").unwrap();

        let result = verifier.verify_signature_at(&then.to_string(), "{}", &signature, then + 301);
        assert!(matches!(result, Err(EventError::InvalidSignature(_))));
    }

    #[test]
    fn test_signature_rejects_bad_timestamp() {
        let result = verifier().verify_signature_at("yesterday", "{}", "v0=00", 0);
        assert!(matches!(result, Err(EventError::InvalidSignature(_))));
    }

    #[test]
    fn test_signature_rejects_extreme_timestamps() {
        let verifier = verifier();
        let now = 1_700_000_000;

        for ts in ["-9223372036854775808", "9223372036854775807"] {
            let result = verifier.verify_signature_at(ts, "{}", "v0=00", now);
            assert!(matches!(result, Err(EventError::InvalidSignature(_))));
        }

        let result = verifier.verify_signature("-9223372036854775808", "{}", "v0=00");
        assert!(matches!(result, Err(EventError::InvalidSignature(_))));
    }

    #[test]
    fn test_current_time_signature_verifies() {
        let verifier = verifier();
        let now = Utc::now().timestamp();
        let signature = verifier.sign(now, "{}").unwrap();
        assert!(
            verifier
                .verify_signature(&now.to_string(), "{}", &signature)
                .is_ok()
        );
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }

    #[test]
    fn test_event_wire_format() {
        let json = r#"{
            "id": "8d6f1c62-3f55-4b8e-9a44-0c1b5a0d2e11",
            "creationDate": "2026-10-16T12:00:00Z",
            "userId": "u1"
        }"#;
        let event: OrderStartedIntegrationEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.user_id, "u1");
    }

    #[tokio::test]
    async fn test_handler_clears_basket() {
        let service = BasketService::new(BasketStore::new(MemoryCache::new()));
        let buyer = BuyerId::parse("u1").unwrap();
        service
            .update_basket(
                Some(buyer.clone()),
                UpdateBasketRequest {
                    items: vec![BasketItemMessage {
                        product_id: 1,
                        quantity: 2,
                    }],
                },
            )
            .await
            .unwrap();

        let handler = OrderStartedHandler::new(&service);
        let event = OrderStartedIntegrationEvent::new("u1");

        assert!(handler.handle(&event).await.unwrap());
        assert!(!handler.handle(&event).await.unwrap());
        assert!(service.get_basket(Some(buyer)).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_handler_rejects_empty_user() {
        let service = BasketService::new(BasketStore::new(MemoryCache::new()));
        let handler = OrderStartedHandler::new(&service);

        let result = handler.handle(&OrderStartedIntegrationEvent::new("")).await;
        assert!(matches!(result, Err(BasketError::InvalidArgument(_))));
    }
}
