//! Configuration structures for WireBench
//!
//! This module defines the configuration shared by the driver and the processors.
//! Configurations are loaded from an optional YAML file and overridden by
//! `WIREBENCH_`-prefixed environment variables.

use crate::error::{Result, WireBenchError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the config file
pub const CONFIG_PATH_VAR: &str = "WIREBENCH_CONFIG";

/// Which role this process plays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Load generator and trigger API
    Driver,

    /// HTTP + JSON unary transformer
    #[serde(alias = "rest")]
    ProcessorRest,

    /// gRPC streaming transformer
    #[serde(alias = "grpc")]
    ProcessorGrpc,
}

impl Mode {
    /// Default listen port for this role
    pub fn default_port(&self) -> u16 {
        match self {
            Mode::Driver => 8080,
            Mode::ProcessorRest => 3000,
            Mode::ProcessorGrpc => 50051,
        }
    }

    /// Default config file for this role
    pub fn default_config_path(&self) -> &'static str {
        match self {
            Mode::Driver => "configs/driver.yaml",
            Mode::ProcessorRest => "configs/processor-rest.yaml",
            Mode::ProcessorGrpc => "configs/processor-grpc.yaml",
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = WireBenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "driver" => Ok(Mode::Driver),
            "processor-rest" | "rest" => Ok(Mode::ProcessorRest),
            "processor-grpc" | "grpc" => Ok(Mode::ProcessorGrpc),
            other => Err(WireBenchError::config(format!("Invalid mode: {}", other))),
        }
    }
}

/// Top-level configuration for WireBench components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireBenchConfig {
    /// Role of this process
    pub mode: Mode,

    /// Server binding address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Server port
    pub port: u16,

    /// Separate metrics listener (gRPC processor only)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Driver-specific configuration
    #[serde(default)]
    pub driver: DriverConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Driver-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Base URL of the REST processor
    #[serde(default = "default_rest_endpoint")]
    pub rest_endpoint: String,

    /// URL of the gRPC processor
    #[serde(default = "default_grpc_endpoint")]
    pub grpc_endpoint: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Batch size used when the trigger omits `count`
    #[serde(default = "default_count")]
    pub default_count: u64,

    /// Pad length used when the trigger omits `size`
    #[serde(default = "default_size")]
    pub default_size: usize,

    /// Largest pad length a trigger may ask for
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            rest_endpoint: default_rest_endpoint(),
            grpc_endpoint: default_grpc_endpoint(),
            request_timeout_secs: default_request_timeout(),
            default_count: default_count(),
            default_size: default_size(),
            max_size: default_max_size(),
        }
    }
}

impl DriverConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Export process CPU/memory metrics
    #[serde(default = "default_process_metrics")]
    pub process_metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            process_metrics: default_process_metrics(),
        }
    }
}

/// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_metrics_port() -> u16 {
    3001
}

fn default_rest_endpoint() -> String {
    "http://processor-rest:3000".to_string()
}

fn default_grpc_endpoint() -> String {
    "http://processor-grpc:50051".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_count() -> u64 {
    1000
}

fn default_size() -> usize {
    32
}

fn default_max_size() -> usize {
    1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_process_metrics() -> bool {
    true
}

impl WireBenchConfig {
    /// Defaults for a role, before any file or environment layer
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            bind_address: default_bind_address(),
            port: mode.default_port(),
            metrics_port: default_metrics_port(),
            driver: DriverConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }

    /// Load configuration for `mode`.
    ///
    /// Layers, lowest priority first: role defaults, the YAML file named by
    /// `WIREBENCH_CONFIG` (or the role's default path, if present), then
    /// `WIREBENCH_*` environment variables with `__` as the section separator.
    pub fn load(mode: Mode) -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .unwrap_or_else(|_| mode.default_config_path().to_string());
        Self::load_from(mode, Path::new(&path))
    }

    /// Load configuration for `mode` from an explicit file path.
    ///
    /// The role is fixed by the caller; a `mode` key in the file or the
    /// environment never switches it.
    pub fn load_from(mode: Mode, path: &Path) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::for_mode(mode))?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("WIREBENCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: WireBenchConfig = settings.try_deserialize()?;
        config.mode = mode;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(WireBenchError::config("port must be non-zero"));
        }

        if self.mode == Mode::ProcessorGrpc && self.metrics_port == self.port {
            return Err(WireBenchError::config(format!(
                "metrics_port {} collides with the gRPC port",
                self.metrics_port
            )));
        }

        if self.mode == Mode::Driver {
            if self.driver.request_timeout_secs == 0 {
                return Err(WireBenchError::config("request_timeout_secs must be non-zero"));
            }

            if self.driver.default_size > self.driver.max_size {
                return Err(WireBenchError::config(format!(
                    "default_size {} exceeds max_size {}",
                    self.driver.default_size, self.driver.max_size
                )));
            }

            for endpoint in [&self.driver.rest_endpoint, &self.driver.grpc_endpoint] {
                if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                    return Err(WireBenchError::config(format!(
                        "endpoint {} must start with http:// or https://",
                        endpoint
                    )));
                }
            }
        }

        Ok(())
    }

    /// Address the main listener binds to
    pub fn listen_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.bind_address, self.port).parse()?)
    }

    /// Address the gRPC processor's metrics listener binds to
    pub fn metrics_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.bind_address, self.metrics_port).parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mode_defaults() {
        let config = WireBenchConfig::for_mode(Mode::Driver);
        assert_eq!(config.port, 8080);
        assert_eq!(config.driver.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.driver.default_count, 1000);
        assert_eq!(config.driver.default_size, 32);
        assert_eq!(config.driver.max_size, 1024 * 1024);
        assert!(config.validate().is_ok());

        assert_eq!(WireBenchConfig::for_mode(Mode::ProcessorRest).port, 3000);
        assert_eq!(WireBenchConfig::for_mode(Mode::ProcessorGrpc).port, 50051);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("grpc".parse::<Mode>().unwrap(), Mode::ProcessorGrpc);
        assert_eq!("processor-rest".parse::<Mode>().unwrap(), Mode::ProcessorRest);
        assert_eq!("driver".parse::<Mode>().unwrap(), Mode::Driver);
        assert!("coordinator".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_aliases_deserialize() {
        let mode: Mode = serde_json::from_str(r#""grpc""#).unwrap();
        assert_eq!(mode, Mode::ProcessorGrpc);
        let mode: Mode = serde_json::from_str(r#""rest""#).unwrap();
        assert_eq!(mode, Mode::ProcessorRest);
        let mode: Mode = serde_json::from_str(r#""processor-grpc""#).unwrap();
        assert_eq!(mode, Mode::ProcessorGrpc);
    }

    #[test]
    fn test_mode_env_var_does_not_override_role() {
        let missing = Path::new("/nonexistent/wirebench.yaml");

        std::env::set_var("WIREBENCH_MODE", "grpc");
        let aliased = WireBenchConfig::load_from(Mode::ProcessorGrpc, missing);

        std::env::set_var("WIREBENCH_MODE", "processor-rest");
        let conflicting = WireBenchConfig::load_from(Mode::ProcessorGrpc, missing);

        std::env::remove_var("WIREBENCH_MODE");

        let aliased = aliased.unwrap();
        assert_eq!(aliased.mode, Mode::ProcessorGrpc);
        assert_eq!(aliased.port, 50051);

        let conflicting = conflicting.unwrap();
        assert_eq!(conflicting.mode, Mode::ProcessorGrpc);
        assert_eq!(conflicting.port, 50051);
    }

    #[test]
    fn test_yaml_mode_key_does_not_override_role() {
        let dir = std::env::temp_dir().join(format!("wirebench-mode-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("processor.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "mode: driver").unwrap();

        let config = WireBenchConfig::load_from(Mode::ProcessorRest, &path).unwrap();
        assert_eq!(config.mode, Mode::ProcessorRest);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = WireBenchConfig::for_mode(Mode::Driver);
        config.driver.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_default_size_over_limit() {
        let mut config = WireBenchConfig::for_mode(Mode::Driver);
        config.driver.max_size = 16;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_endpoint() {
        let mut config = WireBenchConfig::for_mode(Mode::Driver);
        config.driver.grpc_endpoint = "processor-grpc:50051".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_port_collision() {
        let mut config = WireBenchConfig::for_mode(Mode::ProcessorGrpc);
        config.metrics_port = config.port;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_yaml_file() {
        let dir = std::env::temp_dir().join(format!("wirebench-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("driver.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "port: 9090\ndriver:\n  rest_endpoint: http://localhost:3000\n  request_timeout_secs: 5"
        )
        .unwrap();

        let config = WireBenchConfig::load_from(Mode::Driver, &path).unwrap();
        assert_eq!(config.mode, Mode::Driver);
        assert_eq!(config.port, 9090);
        assert_eq!(config.driver.rest_endpoint, "http://localhost:3000");
        assert_eq!(config.driver.request_timeout_secs, 5);
        assert_eq!(config.driver.grpc_endpoint, "http://processor-grpc:50051");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            WireBenchConfig::load_from(Mode::ProcessorRest, Path::new("/nonexistent/wirebench.yaml"))
                .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.mode, Mode::ProcessorRest);
    }
}
