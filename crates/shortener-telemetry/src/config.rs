//! Telemetry configuration from environment variables.

use std::env;

pub const DEFAULT_SERVICE_NAME: &str = "eventbridge-shortener";

/// Configuration for logs, traces and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name for traces and logs
    pub service_name: String,

    /// Deployment stage (dev, staging, prod)
    pub environment: String,

    /// OTLP collector endpoint; traces are exported only when set
    pub otlp_endpoint: Option<String>,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to write logs to stdout
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            environment: "dev".to_string(),
            otlp_endpoint: None,
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME` or `SHORTENER_SERVICE_NAME`: Service name (default: eventbridge-shortener)
    /// - `ENVIRONMENT`: Deployment stage (default: dev)
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: unset, no export)
    /// - `SHORTENER_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `SHORTENER_CONSOLE_OUTPUT`: Enable stdout logs (default: true)
    /// - `SHORTENER_JSON_LOGS`: JSON logs (default: true on managed runtimes)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let managed_runtime = lookup("AWS_LAMBDA_FUNCTION_NAME").is_some()
            || lookup("ECS_CONTAINER_METADATA_URI_V4").is_some()
            || lookup("KUBERNETES_SERVICE_HOST").is_some();

        Self {
            service_name: lookup("OTEL_SERVICE_NAME")
                .or_else(|| lookup("SHORTENER_SERVICE_NAME"))
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),

            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),

            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty()),

            log_level: lookup("SHORTENER_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("SHORTENER_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup("SHORTENER_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(managed_runtime),
        }
    }

    /// Whether spans are exported over OTLP.
    pub fn exports_traces(&self) -> bool {
        self.otlp_endpoint.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> TelemetryConfig {
        let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
        TelemetryConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "eventbridge-shortener");
        assert_eq!(config.log_level, "info");
        assert!(!config.exports_traces());
    }

    #[test]
    fn test_empty_environment_matches_default() {
        assert_eq!(config(&[]), TelemetryConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("SHORTENER_SERVICE_NAME", "shortener-prod"),
            ("ENVIRONMENT", "prod"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
            ("RUST_LOG", "debug"),
            ("SHORTENER_JSON_LOGS", "1"),
        ]);
        assert_eq!(config.service_name, "shortener-prod");
        assert_eq!(config.environment, "prod");
        assert!(config.exports_traces());
        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs);
    }

    #[test]
    fn test_managed_runtime_defaults_to_json() {
        assert!(config(&[("AWS_LAMBDA_FUNCTION_NAME", "shortener")]).json_logs);
        assert!(!config(&[("AWS_LAMBDA_FUNCTION_NAME", "shortener"), ("SHORTENER_JSON_LOGS", "false")]).json_logs);
    }

    #[test]
    fn test_blank_endpoint_disables_export() {
        assert!(!config(&[("OTEL_EXPORTER_OTLP_ENDPOINT", " ")]).exports_traces());
    }
}
