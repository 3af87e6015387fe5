//! Metric samples emitted per request

use std::collections::BTreeMap;

use serde::Serialize;

pub const SIZE_METRIC: &str = "Size";
pub const COUNT_METRIC: &str = "Count";
pub const COLD_START_METRIC: &str = "ColdStart";

pub const EVENT_TYPE_DIMENSION: &str = "EventType";
pub const PUT_EVENT_ID_METADATA: &str = "PutEventId";
pub const ENVIRONMENT_METADATA: &str = "Environment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricUnit {
    Bytes,
    Count,
}

/// A single named value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDatum {
    pub name: &'static str,
    pub unit: MetricUnit,
    pub value: f64,
}

/// Values sharing one set of dimensions and metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricBatch {
    pub datums: Vec<MetricDatum>,
    pub dimensions: BTreeMap<String, String>,
    pub metadata: BTreeMap<String, String>,
}

impl MetricBatch {
    pub fn datum(&self, name: &str) -> Option<&MetricDatum> {
        self.datums.iter().find(|d| d.name == name)
    }
}

/// Final event size for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSample {
    pub size_bytes: usize,
    pub event_type: String,
    pub correlation_id: String,
}

impl MetricSample {
    /// `Size` and `Count` datums dimensioned by event type, tagged with the
    /// correlation id.
    pub fn to_batch(&self) -> MetricBatch {
        let mut batch = MetricBatch {
            datums: vec![
                MetricDatum {
                    name: SIZE_METRIC,
                    unit: MetricUnit::Bytes,
                    value: self.size_bytes as f64,
                },
                MetricDatum {
                    name: COUNT_METRIC,
                    unit: MetricUnit::Count,
                    value: 1.0,
                },
            ],
            ..Default::default()
        };
        batch
            .dimensions
            .insert(EVENT_TYPE_DIMENSION.to_string(), self.event_type.clone());
        batch
            .metadata
            .insert(PUT_EVENT_ID_METADATA.to_string(), self.correlation_id.clone());
        batch
    }
}
