//! HTTP surface shared by every WireBench service: `/metrics`, `/health`
//! and graceful shutdown.

use crate::metrics::{self, MetricsRegistry};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
struct ObservabilityState {
    metrics: Arc<MetricsRegistry>,
    service: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

/// Router exposing `/metrics` and `/health` for `service`
pub fn observability_router(metrics: Arc<MetricsRegistry>, service: &'static str) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(ObservabilityState { metrics, service })
}

/// GET /metrics - Prometheus text exposition
async fn metrics_handler(State(state): State<ObservabilityState>) -> Response {
    match state.metrics.gather() {
        Ok(body) => ([(header::CONTENT_TYPE, metrics::content_type())], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /health
async fn health_handler(State(state): State<ObservabilityState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: state.service,
    })
}

/// Resolves when the process receives Ctrl-C
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
