//! Integration event webhooks.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::events::{
    EventError, OrderStartedHandler, OrderStartedIntegrationEvent, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};
use crate::state::AppState;

/// Webhook acknowledgement.
#[derive(Debug, Serialize)]
pub struct EventAck {
    /// Whether a basket was removed.
    pub deleted: bool,
}

/// `POST /api/events/order-started`
///
/// Verifies the signature over the raw body, then clears the named buyer's
/// basket. Returns 404 when no signing secret is configured.
pub async fn order_started(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<EventAck>> {
    let verifier = state
        .events()
        .ok_or_else(|| AppError::NotFound("event webhooks are disabled".to_string()))?;

    let timestamp = header_str(&headers, TIMESTAMP_HEADER)?;
    let signature = header_str(&headers, SIGNATURE_HEADER)?;
    verifier.verify_signature(timestamp, &body, signature)?;

    let event: OrderStartedIntegrationEvent =
        serde_json::from_str(&body).map_err(|e| EventError::Malformed(e.to_string()))?;

    let deleted = OrderStartedHandler::new(state.baskets())
        .handle(&event)
        .await?;

    Ok(Json(EventAck { deleted }))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> std::result::Result<&'a str, EventError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| EventError::InvalidSignature(format!("missing {name} header")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::Utc;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::events::EventVerifier;
    use crate::routes::app;
    use crate::state::test_support::{SIGNING_SECRET, bearer, test_state};

    fn signed(body: &str) -> Request<Body> {
        let now = Utc::now().timestamp();
        let signature = EventVerifier::new(SIGNING_SECRET.into())
            .sign(now, body)
            .unwrap();

        Request::post("/api/events/order-started")
            .header(header::CONTENT_TYPE, "application/json")
            .header(TIMESTAMP_HEADER, now.to_string())
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_order_started_clears_basket() {
        let state = test_state(Some(SIGNING_SECRET));
        let token = bearer("u1");

        let put = Request::put("/api/basket")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"items":[{"productId":1,"quantity":1}]}"#))
            .unwrap();
        assert_eq!(
            app(state.clone()).oneshot(put).await.unwrap().status(),
            StatusCode::OK
        );

        let event = serde_json::to_string(&OrderStartedIntegrationEvent::new("u1")).unwrap();
        let response = app(state.clone()).oneshot(signed(&event)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["deleted"], true);

        let get = Request::get("/api/basket")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let fetched = json_body(app(state).oneshot(get).await.unwrap()).await;
        assert_eq!(fetched["items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_bad_signature_rejected() {
        let state = test_state(Some(SIGNING_SECRET));
        let request = Request::post("/api/events/order-started")
            .header(TIMESTAMP_HEADER, Utc::now().timestamp().to_string())
            .header(SIGNATURE_HEADER, "v0=deadbeef")
            .body(Body::from("{}"))
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_headers_rejected() {
        let state = test_state(Some(SIGNING_SECRET));
        let request = Request::post("/api/events/order-started")
            .body(Body::from("{}"))
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_event_rejected() {
        let state = test_state(Some(SIGNING_SECRET));
        let response = app(state).oneshot(signed(r#"{"userId":1}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_disabled_without_secret() {
        let state = test_state(None);
        let response = app(state).oneshot(signed("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
