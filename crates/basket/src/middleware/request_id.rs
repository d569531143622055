//! Correlation ids for basket calls.
//!
//! Callers such as the web frontend or the ordering service may send an
//! `x-request-id`; it is kept when it is a short, visible-ASCII token and
//! replaced with a fresh UUID v4 otherwise. The id ends up on the request
//! span, as a Sentry tag and on the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied id that is passed through.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Returns the caller's id if it is usable as a log and tag value.
fn inbound_request_id(request: &Request) -> Option<String> {
    let value = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;

    let usable = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic());

    usable.then(|| value.to_owned())
}

/// Attach a correlation id to the request span, Sentry scope and response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        inbound_request_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let response = app()
            .oneshot(HttpRequest::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_preserves_upstream_request_id() {
        let response = app()
            .oneshot(
                HttpRequest::get("/")
                    .header(REQUEST_ID_HEADER, "upstream-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            "upstream-123"
        );
    }

    #[tokio::test]
    async fn test_replaces_unusable_request_id() {
        let too_long = "x".repeat(MAX_REQUEST_ID_LEN + 1);

        for bad in ["has space", too_long.as_str()] {
            let response = app()
                .oneshot(
                    HttpRequest::get("/")
                        .header(REQUEST_ID_HEADER, bad)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
            assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
        }
    }
}
