//! Metrics sink adapters

mod emf;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::MetricBatch;
use crate::error::MetricsError;
use crate::ports::MetricsSink;

pub use emf::{EmbeddedMetricsSink, SERVICE_DIMENSION};

/// No-op sink for when metrics are disabled
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMetrics;

impl MetricsSink for NoOpMetrics {
    fn publish(&self, _batch: &MetricBatch) -> Result<(), MetricsError> {
        Ok(())
    }
}

/// Keeps every published batch in memory.
#[derive(Default)]
pub struct RecordingMetricsSink {
    batches: Mutex<Vec<MetricBatch>>,
    failure: Mutex<Option<MetricsError>>,
}

impl RecordingMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent publish fails with `error` and records nothing.
    pub fn fail_with(&self, error: MetricsError) {
        *self.failure.lock() = Some(error);
    }

    pub fn batches(&self) -> Vec<MetricBatch> {
        self.batches.lock().clone()
    }

    pub fn clear(&self) {
        self.batches.lock().clear();
    }
}

impl MetricsSink for RecordingMetricsSink {
    fn publish(&self, batch: &MetricBatch) -> Result<(), MetricsError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        self.batches.lock().push(batch.clone());
        Ok(())
    }
}

/// Publishes to every inner sink.
///
/// A failing sink does not stop the others; the first error is returned.
#[derive(Default)]
pub struct CompositeMetricsSink {
    sinks: Vec<Arc<dyn MetricsSink>>,
}

impl CompositeMetricsSink {
    pub fn new(sinks: Vec<Arc<dyn MetricsSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn MetricsSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl MetricsSink for CompositeMetricsSink {
    fn publish(&self, batch: &MetricBatch) -> Result<(), MetricsError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.publish(batch) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
