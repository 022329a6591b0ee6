//! Unary HTTP + JSON transformer
//!
//! `POST /process` squares the payload value. The body is parsed leniently:
//! anything that is not a number where `value` is expected counts as `0`.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{trace, warn};
use wirebench_common::http::observability_router;
use wirebench_common::{MetricsRegistry, Payload, Protocol, Service, UnaryResponse};

/// Error response.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Apply the unary transform to one payload
pub fn process(payload: &Payload) -> UnaryResponse {
    UnaryResponse::transform(payload.value)
}

/// Router for the REST processor: `/process`, `/metrics`, `/health`
pub fn rest_router(metrics: Arc<MetricsRegistry>) -> Router {
    Router::new()
        .route("/process", post(process_handler))
        .with_state(Arc::clone(&metrics))
        .merge(observability_router(metrics, Service::ProcessorRest.as_str()))
}

/// POST /process
async fn process_handler(State(metrics): State<Arc<MetricsRegistry>>, body: Bytes) -> Response {
    metrics.inc_recv(Protocol::Rest, Service::ProcessorRest, body.len() as u64);

    let json = if body.is_empty() {
        Value::Object(Default::default())
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(json) => json,
            Err(e) => {
                warn!("Rejecting unparseable body: {}", e);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("invalid JSON body: {}", e),
                    }),
                )
                    .into_response();
            }
        }
    };

    let payload = Payload::from_json_lenient(&json);
    let response = process(&payload);

    let encoded = match serde_json::to_vec(&response) {
        Ok(encoded) => encoded,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    metrics.inc_send(Protocol::Rest, Service::ProcessorRest, encoded.len() as u64);
    trace!(value = payload.value, processed = response.processed, "processed payload");

    ([(header::CONTENT_TYPE, "application/json")], encoded).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn post_process(app: Router, body: &'static str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(
                Request::post("/process")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[test]
    fn test_process_squares_value() {
        let payload = Payload {
            value: 1.5,
            pad: "xxxx".to_string(),
        };
        assert_eq!(process(&payload).processed, 2.25);
        // Pure function of value
        assert_eq!(process(&payload), process(&payload));
    }

    #[tokio::test]
    async fn test_process_endpoint_accounts_bytes() {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let app = rest_router(Arc::clone(&metrics));

        let request = r#"{"value":3.0,"pad":"xxxx"}"#;
        let (status, body) = post_process(app, request).await;

        assert_eq!(status, StatusCode::OK);
        let response: UnaryResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.processed, 9.0);

        assert_eq!(
            metrics.recv_bytes(Protocol::Rest, Service::ProcessorRest),
            request.len() as u64
        );
        assert_eq!(
            metrics.send_bytes(Protocol::Rest, Service::ProcessorRest),
            body.len() as u64
        );
    }

    #[tokio::test]
    async fn test_missing_value_is_zero() {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());

        for request in [r#"{"pad":"xx"}"#, r#"{"value":"abc"}"#, r#"{"value":null}"#, ""] {
            let (status, body) = post_process(rest_router(Arc::clone(&metrics)), request).await;
            assert_eq!(status, StatusCode::OK);
            let response: UnaryResponse = serde_json::from_slice(&body).unwrap();
            assert_eq!(response.processed, 0.0);
        }
    }

    #[tokio::test]
    async fn test_numeric_string_value() {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let (status, body) = post_process(rest_router(metrics), r#"{"value":"2"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let response: UnaryResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.processed, 4.0);
    }

    #[tokio::test]
    async fn test_invalid_json_is_rejected() {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let (status, _) = post_process(rest_router(metrics), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
