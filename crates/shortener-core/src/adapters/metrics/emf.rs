//! CloudWatch embedded metric format (EMF) sink
//!
//! Each batch becomes one JSON line on the wrapped writer. The log pipeline
//! extracts the metrics, so publishing never waits on a remote call.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use crate::adapters::SystemClock;
use crate::domain::MetricBatch;
use crate::error::MetricsError;
use crate::ports::{MetricsSink, TimeSource};

/// Dimension carrying the service name on every batch
pub const SERVICE_DIMENSION: &str = "service";

pub struct EmbeddedMetricsSink {
    namespace: String,
    service_name: String,
    clock: Arc<dyn TimeSource>,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl EmbeddedMetricsSink {
    pub fn new(
        namespace: impl Into<String>,
        service_name: impl Into<String>,
        writer: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            service_name: service_name.into(),
            clock: Arc::new(SystemClock),
            writer: Mutex::new(writer),
        }
    }

    /// Sink writing to standard output
    pub fn stdout(namespace: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self::new(namespace, service_name, Box::new(std::io::stdout()))
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Renders `batch` as an EMF document.
    pub fn render(&self, batch: &MetricBatch) -> Value {
        let mut dimension_names: Vec<&str> = vec![SERVICE_DIMENSION];
        dimension_names.extend(batch.dimensions.keys().map(String::as_str));

        let definitions: Vec<Value> = batch
            .datums
            .iter()
            .map(|d| json!({"Name": d.name, "Unit": d.unit}))
            .collect();

        let mut root = Map::new();
        root.insert(
            "_aws".to_string(),
            json!({
                "Timestamp": self.clock.now().timestamp_millis(),
                "CloudWatchMetrics": [{
                    "Namespace": self.namespace,
                    "Dimensions": [dimension_names],
                    "Metrics": definitions,
                }],
            }),
        );
        root.insert(
            SERVICE_DIMENSION.to_string(),
            Value::String(self.service_name.clone()),
        );
        for (name, value) in batch.dimensions.iter().chain(batch.metadata.iter()) {
            root.insert(name.clone(), Value::String(value.clone()));
        }
        for datum in &batch.datums {
            root.insert(datum.name.to_string(), json!(datum.value));
        }

        Value::Object(root)
    }
}

impl MetricsSink for EmbeddedMetricsSink {
    fn publish(&self, batch: &MetricBatch) -> Result<(), MetricsError> {
        if batch.datums.is_empty() {
            return Ok(());
        }

        let mut line = serde_json::to_vec(&self.render(batch))
            .map_err(|e| MetricsError::Serialization(e.to_string()))?;
        line.push(b'\n');

        let mut writer = self.writer.lock();
        writer
            .write_all(&line)
            .and_then(|_| writer.flush())
            .map_err(|e| MetricsError::Rejected(e.to_string()))
    }
}
