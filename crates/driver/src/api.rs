//! Trigger API
//!
//! `GET /trigger/:protocol?count=N&size=M` runs one batch and returns its
//! [`BatchResult`] as JSON; failures come back as `{"error": "..."}`.

use crate::batch::Driver;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wirebench_common::http::observability_router;
use wirebench_common::{BatchResult, Protocol, Service, WireBenchError};

/// Query parameters for a trigger.
#[derive(Debug, Deserialize)]
pub struct TriggerQuery {
    /// Number of payloads (default from config)
    pub count: Option<u64>,
    /// Pad length per payload (default from config)
    pub size: Option<usize>,
}

/// Error response.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Failed batch as an HTTP response
struct ApiError(WireBenchError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            WireBenchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            e if e.is_transport() => StatusCode::BAD_GATEWAY,
            WireBenchError::InvalidInput(_) | WireBenchError::Parse(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Router for the driver: `/trigger/:protocol`, `/metrics`, `/health`
pub fn driver_router(driver: Arc<Driver>) -> Router {
    let metrics = Arc::clone(driver.metrics());

    Router::new()
        .route("/trigger/:protocol", get(trigger_handler))
        .with_state(driver)
        .merge(observability_router(metrics, Service::Client.as_str()))
}

/// GET /trigger/:protocol
async fn trigger_handler(
    State(driver): State<Arc<Driver>>,
    Path(protocol): Path<Protocol>,
    Query(query): Query<TriggerQuery>,
) -> Result<Json<BatchResult>, ApiError> {
    let request = driver.resolve(query.count, query.size);
    driver
        .trigger(protocol, request)
        .await
        .map(Json)
        .map_err(ApiError)
}
