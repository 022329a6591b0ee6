//! WireBench Processor - Main Entry Point
//!
//! Runs either the REST transformer or the gRPC stream transformer, chosen by
//! the first argument (`rest` | `grpc`) or `WIREBENCH_MODE`.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use wirebench_common::http::{observability_router, shutdown_signal};
use wirebench_common::telemetry::init_tracing;
use wirebench_common::{MetricsRegistry, Mode, Result, Service, WireBenchConfig, WireBenchError};
use wirebench_processor::{rest_router, serve_grpc};

#[tokio::main]
async fn main() -> Result<()> {
    let mode: Mode = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("WIREBENCH_MODE").ok())
        .unwrap_or_else(|| "processor-rest".to_string())
        .parse()?;

    let config = WireBenchConfig::load(mode)?;
    init_tracing("wirebench_processor", &config.observability.log_level);

    info!(
        "Processor configuration loaded: mode={:?}, bind={}:{}",
        config.mode, config.bind_address, config.port
    );

    let mut metrics = MetricsRegistry::new()?;
    if config.observability.process_metrics {
        metrics = metrics.with_process_metrics()?;
    }
    let metrics = Arc::new(metrics);

    match config.mode {
        Mode::ProcessorRest => run_rest(&config, metrics).await?,
        Mode::ProcessorGrpc => run_grpc(&config, metrics).await?,
        Mode::Driver => {
            return Err(WireBenchError::config(
                "wirebench-processor cannot run in driver mode",
            ))
        }
    }

    info!("WireBench Processor shutdown complete");
    Ok(())
}

async fn run_rest(config: &WireBenchConfig, metrics: Arc<MetricsRegistry>) -> Result<()> {
    let listener = TcpListener::bind(config.listen_addr()?).await?;
    info!("Processor REST server listening on {}", listener.local_addr()?);

    axum::serve(listener, rest_router(metrics))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn run_grpc(config: &WireBenchConfig, metrics: Arc<MetricsRegistry>) -> Result<()> {
    let grpc_listener = TcpListener::bind(config.listen_addr()?).await?;
    let metrics_listener = TcpListener::bind(config.metrics_addr()?).await?;
    info!(
        "Processor metrics listening on {}",
        metrics_listener.local_addr()?
    );

    let metrics_app = observability_router(Arc::clone(&metrics), Service::ProcessorGrpc.as_str());
    let metrics_server = async move {
        axum::serve(metrics_listener, metrics_app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(WireBenchError::from)
    };

    tokio::try_join!(
        serve_grpc(grpc_listener, metrics, shutdown_signal()),
        metrics_server
    )?;
    Ok(())
}
