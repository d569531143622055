//! Unified error handling with Sentry integration.
//!
//! [`BasketError`] is the status taxonomy of the basket RPC operations.
//! [`AppError`] wraps it for the HTTP transport, captures server faults to
//! Sentry, and renders every failure as `{"code": ..., "message": ...}`.
//! All route handlers return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eshop_core::BuyerId;
use serde::Serialize;
use thiserror::Error;

use crate::events::EventError;
use crate::store::StoreError;

/// Outcome of a basket RPC call that did not succeed.
///
/// Every variant is terminal for the call; the service never retries.
#[derive(Debug, Error)]
pub enum BasketError {
    /// No caller identity could be resolved from the credential.
    #[error("The caller is not authenticated.")]
    Unauthenticated,

    /// The request failed validation.
    #[error("{0}")]
    InvalidArgument(String),

    /// A replace did not apply.
    #[error("Basket with buyer id {buyer_id} does not exist")]
    NotFound { buyer_id: BuyerId },

    /// The cache could not be reached.
    #[error("Basket store unavailable: {0}")]
    StoreUnavailable(String),

    /// Stored data was unreadable or another server-side fault occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BasketError {
    /// HTTP status for this outcome.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for this outcome.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound { .. } => "not_found",
            Self::StoreUnavailable(_) => "unavailable",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns true for faults on our side rather than the caller's.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Internal(_))
    }
}

impl From<StoreError> for BasketError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => Self::StoreUnavailable(message),
            corrupt @ StoreError::Corrupt { .. } => Self::Internal(corrupt.to_string()),
        }
    }
}

/// Application-level error type for the basket service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Basket operation failed.
    #[error(transparent)]
    Basket(#[from] BasketError),

    /// Integration event was rejected.
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if let Self::Basket(err) = &self
            && err.is_server_fault()
        {
            let event_id = sentry::capture_error(err);
            tracing::error!(
                error = %err,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, code) = match &self {
            Self::Basket(err) => (err.status(), err.code()),
            Self::Event(err) => (err.status(), err.code()),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Basket(BasketError::Internal(_)) => "Internal server error".to_string(),
            Self::Basket(BasketError::StoreUnavailable(_)) => {
                "Basket store unavailable".to_string()
            }
            Self::Basket(err) => err.to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated buyer.
pub fn set_sentry_user(buyer_id: &BuyerId) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(buyer_id.to_string()),
            ..Default::default()
        }));
    });
}
