//! # Shortener Core
//!
//! Event sizing and overflow-offload pipeline for a size-constrained event bus.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `EventEnvelope`: Open JSON event with typed accessors
//!   - `estimate_size`: Bus size accounting
//!   - `OverflowPolicy`: Pass-through or offload decision
//!   - `TruncationRecord` / `annotate`: Pointer stamped into `detail.metadata`
//!   - `ShortenerConfig`: Configuration with validation
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `EventShortenerApi`: Driving port
//!   - `BlobStore`, `MetricsSink`, `TimeSource`: Driven ports
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `ShortenerService`: Implements `EventShortenerApi`
//!
//! - **Middleware** (`middleware/`): `InstrumentedShortener` adds spans,
//!   request logging and the cold-start metric around any `EventShortenerApi`
//!
//! - **Adapters Layer** (`adapters/`): In-memory and S3 (feature `s3`) blob
//!   stores, EMF / recording / no-op / fan-out metrics sinks, clocks
//!
//! ## Invariants
//!
//! - Size is `14 (if time) + |source| + |detail-type| + |canonical detail| +
//!   sum of non-empty resources`, in UTF-8 bytes
//! - Events at or under `256_000 - 50` bytes never touch storage
//! - Events over it are written to storage exactly once and lose `detail.data`
//! - `detail.metadata.event_truncation` is always set
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use shortener_core::{
//!     EventShortenerApi, InMemoryBlobStore, InboundPayload, InvocationContext,
//!     NoOpMetrics, ShortenerConfig, ShortenerService,
//! };
//!
//! let service = ShortenerService::new(
//!     Arc::new(InMemoryBlobStore::new()),
//!     Arc::new(NoOpMetrics),
//!     ShortenerConfig::for_bucket("events"),
//! );
//!
//! let response = service
//!     .put_event(&InboundPayload::raw(body), &InvocationContext::generate())
//!     .await;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    CompositeMetricsSink, EmbeddedMetricsSink, FixedClock, InMemoryBlobStore, NoOpMetrics,
    RecordingMetricsSink, StoredObject, SystemClock,
};
#[cfg(feature = "s3")]
pub use adapters::S3BlobStore;
pub use domain::{
    annotate, decode, estimate_size, EventEnvelope, InboundPayload, MetricBatch, MetricSample,
    OverflowDecision, OverflowPolicy, ShortenerConfig, ShortenerResponse, TruncationRecord,
};
pub use error::{
    ConfigError, DecodeError, ErrorKind, EventError, MetricsError, OffloadError, ShortenerError,
    StorageError,
};
pub use middleware::InstrumentedShortener;
pub use ports::{
    BlobStore, EventShortenerApi, InvocationContext, MetricsSink, PresignMethod, ShortenOutcome,
    TimeSource,
};
pub use service::ShortenerService;
