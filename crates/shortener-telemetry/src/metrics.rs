//! Prometheus metrics for the event shortener.
//!
//! All metrics follow the naming convention: `shortener_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., shortener_events_total)
//! - **Histogram**: Distribution of values (e.g., shortener_event_size_bytes)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // EVENT METRICS
    // =========================================================================

    /// Events processed, by event type
    pub static ref EVENTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("shortener_events_total", "Events processed by the shortener"),
        &["event_type"]
    ).expect("metric creation failed");

    /// Final event size after annotation
    pub static ref EVENT_SIZE_BYTES: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "shortener_event_size_bytes",
            "Final size of annotated events"
        ).buckets(exponential_buckets(64.0, 2.0, 14).expect("valid buckets")),
        &["event_type"]
    ).expect("metric creation failed");

    /// Offload attempts by outcome
    pub static ref OFFLOADS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("shortener_offloads_total", "Offload attempts"),
        &["outcome"]  // outcome: success/storage_write/handle_presign
    ).expect("metric creation failed");

    /// Cold starts observed
    pub static ref COLD_STARTS: Counter = Counter::new(
        "shortener_cold_starts_total",
        "Invocations that initialized a fresh process"
    ).expect("metric creation failed");

    // =========================================================================
    // HTTP METRICS
    // =========================================================================

    /// Responses by status code
    pub static ref HTTP_RESPONSES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("shortener_http_responses_total", "HTTP responses by status code"),
        &["status"]
    ).expect("metric creation failed");

    /// End-to-end request latency
    pub static ref REQUEST_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "shortener_request_duration_seconds",
            "Time spent handling put-event requests"
        ).buckets(exponential_buckets(0.0005, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENTS_TOTAL.clone()),
        Box::new(EVENT_SIZE_BYTES.clone()),
        Box::new(OFFLOADS_TOTAL.clone()),
        Box::new(COLD_STARTS.clone()),
        Box::new(HTTP_RESPONSES_TOTAL.clone()),
        Box::new(REQUEST_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
