//! Logging setup shared by the WireBench binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `crate_name` logs at `level`.
pub fn init_tracing(crate_name: &str, level: &str) {
    let default_directive = format!("{}={},wirebench_common={}", crate_name, level, level);

    // A second init (tests, embedding) is not an error worth surfacing
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
