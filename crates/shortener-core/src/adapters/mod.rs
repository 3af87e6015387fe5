//! Adapters layer: concrete implementations of the outbound ports

pub mod infra;
pub mod metrics;
pub mod storage;

pub use infra::{FixedClock, SystemClock};
pub use metrics::{CompositeMetricsSink, EmbeddedMetricsSink, NoOpMetrics, RecordingMetricsSink};
#[cfg(feature = "s3")]
pub use storage::S3BlobStore;
pub use storage::{InMemoryBlobStore, StoredObject};
