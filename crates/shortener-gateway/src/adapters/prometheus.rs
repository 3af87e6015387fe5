//! Prometheus-backed metrics sink

use shortener_core::domain::metric::{
    COLD_START_METRIC, COUNT_METRIC, EVENT_TYPE_DIMENSION, SIZE_METRIC,
};
use shortener_core::{MetricBatch, MetricsError, MetricsSink};
use shortener_telemetry::{COLD_STARTS, EVENTS_TOTAL, EVENT_SIZE_BYTES};

/// Feeds pipeline samples into the process-wide Prometheus registry.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrometheusMetricsSink;

impl MetricsSink for PrometheusMetricsSink {
    fn publish(&self, batch: &MetricBatch) -> Result<(), MetricsError> {
        let event_type = batch
            .dimensions
            .get(EVENT_TYPE_DIMENSION)
            .map(String::as_str)
            .unwrap_or("unknown");

        for datum in &batch.datums {
            if !datum.value.is_finite() || datum.value < 0.0 {
                return Err(MetricsError::Rejected(format!(
                    "{} has invalid value {}",
                    datum.name, datum.value
                )));
            }

            match datum.name {
                SIZE_METRIC => EVENT_SIZE_BYTES
                    .with_label_values(&[event_type])
                    .observe(datum.value),
                COUNT_METRIC => EVENTS_TOTAL
                    .with_label_values(&[event_type])
                    .inc_by(datum.value),
                COLD_START_METRIC => COLD_STARTS.inc_by(datum.value),
                _ => {}
            }
        }
        Ok(())
    }
}
