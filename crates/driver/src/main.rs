//! WireBench Driver - Main Entry Point
//!
//! Serves the trigger API and fires batches at the configured processors.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use wirebench_common::http::shutdown_signal;
use wirebench_common::telemetry::init_tracing;
use wirebench_common::{MetricsRegistry, Mode, Result, WireBenchConfig};
use wirebench_driver::{driver_router, Driver};

#[tokio::main]
async fn main() -> Result<()> {
    let config = WireBenchConfig::load(Mode::Driver)?;
    init_tracing("wirebench_driver", &config.observability.log_level);

    info!(
        "Driver configuration loaded: bind={}:{}, rest={}, grpc={}, timeout={}s",
        config.bind_address,
        config.port,
        config.driver.rest_endpoint,
        config.driver.grpc_endpoint,
        config.driver.request_timeout_secs
    );

    let mut metrics = MetricsRegistry::new()?;
    if config.observability.process_metrics {
        metrics = metrics.with_process_metrics()?;
    }

    let driver = Arc::new(Driver::new(config.driver.clone(), Arc::new(metrics))?);

    let listener = TcpListener::bind(config.listen_addr()?).await?;
    info!("Driver listening on {}", listener.local_addr()?);

    axum::serve(listener, driver_router(driver))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("WireBench Driver shutdown complete");
    Ok(())
}
