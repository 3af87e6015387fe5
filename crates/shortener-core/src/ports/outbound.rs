//! Outbound Ports (Driven Ports)
//!
//! Dependencies the pipeline needs from its environment: blob storage, a
//! metrics sink and a clock.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::MetricBatch;
use crate::error::{MetricsError, StorageError};

/// HTTP method a presigned handle is scoped to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresignMethod {
    Get,
}

/// Durable blob storage (Driven Port)
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `body` under `bucket/key`.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Issues a time-limited URL for `bucket/key`.
    async fn presign(
        &self,
        bucket: &str,
        key: &str,
        method: PresignMethod,
        expires_in: Duration,
    ) -> Result<String, StorageError>;
}

/// Metrics sink (Driven Port)
///
/// Publishing must not block on acknowledgment from a remote service.
pub trait MetricsSink: Send + Sync {
    fn publish(&self, batch: &MetricBatch) -> Result<(), MetricsError>;
}

/// Wall clock (Driven Port)
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
