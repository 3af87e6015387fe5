//! Domain layer: pure sizing, policy and annotation logic, no I/O

pub mod config;
pub mod decoder;
pub mod event;
pub mod metric;
pub mod offload;
pub mod policy;
pub mod response;
pub mod sizing;
pub mod truncation;

pub use config::ShortenerConfig;
pub use decoder::{decode, InboundPayload};
pub use event::{fields, EventEnvelope};
pub use metric::{MetricBatch, MetricDatum, MetricSample, MetricUnit};
pub use offload::{object_key, OffloadPayload};
pub use policy::{OverflowDecision, OverflowPolicy, MAX_PAYLOAD_BYTES, SAFETY_MARGIN_BYTES};
pub use response::ShortenerResponse;
pub use sizing::{canonical_json, estimate_size, TIME_FIELD_OVERHEAD};
pub use truncation::{annotate, TruncationRecord};
