//! # Shortener Telemetry
//!
//! Observability wiring for the event shortener.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with pretty or JSON output
//! - **Traces**: OpenTelemetry OTLP export, enabled when an endpoint is set
//! - **Metrics**: Prometheus registry served by the gateway's `/metrics`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shortener_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | unset | OTLP collector endpoint |
//! | `OTEL_SERVICE_NAME` | `eventbridge-shortener` | Service name in traces |
//! | `SHORTENER_LOG_LEVEL` | `info` | Log level filter |
//! | `SHORTENER_JSON_LOGS` | `false` | JSON log lines |

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, COLD_STARTS, EVENTS_TOTAL,
    EVENT_SIZE_BYTES, HTTP_RESPONSES_TOTAL, OFFLOADS_TOTAL, REQUEST_DURATION,
};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize OpenTelemetry tracer: {0}")]
    TracerInit(String),

    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging, tracing and the metrics registry.
///
/// Returns a guard that must be held for the lifetime of the application.
/// When dropped, it flushes pending spans.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    let tracing_guard = tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
    })
}

/// Guard that keeps telemetry active. Drop to flush and shutdown.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
