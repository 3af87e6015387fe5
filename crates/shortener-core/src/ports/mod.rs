//! Ports layer: trait boundaries of the pipeline

pub mod inbound;
pub mod outbound;

pub use inbound::{EventShortenerApi, InvocationContext, ShortenOutcome};
pub use outbound::{BlobStore, MetricsSink, PresignMethod, TimeSource};
