//! Inbound Ports (Driving Ports)
//!
//! The API that front doors (HTTP gateway, function runtimes, tests) use to
//! drive the pipeline.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{EventEnvelope, InboundPayload, ShortenerResponse, TruncationRecord};
use crate::error::ShortenerError;

/// Per-request execution context
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationContext {
    /// Unique request id, used as the metrics correlation id
    pub request_id: String,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// Context with a freshly generated request id
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

/// Result of running one event through the pipeline
#[derive(Clone, Debug, PartialEq)]
pub struct ShortenOutcome {
    /// The annotated event, ready for the bus
    pub event: EventEnvelope,
    /// Size of the event as received
    pub original_size: usize,
    /// Size of the annotated event
    pub final_size: usize,
    /// Record stamped into `detail.metadata.event_truncation`
    pub record: TruncationRecord,
}

impl ShortenOutcome {
    pub fn truncated(&self) -> bool {
        self.record.truncated
    }

    pub fn retrieval_url(&self) -> Option<&str> {
        self.record.retrieval_url.as_deref()
    }

    pub fn to_response(&self) -> ShortenerResponse {
        ShortenerResponse::ok(
            self.truncated(),
            self.final_size,
            self.record.retrieval_url.clone(),
        )
    }
}

/// Primary shortener API (Driving Port)
#[async_trait]
pub trait EventShortenerApi: Send + Sync {
    /// Decodes, sizes and if needed offloads one request.
    ///
    /// Never fails: every error is folded into the response.
    async fn put_event(
        &self,
        payload: &InboundPayload,
        context: &InvocationContext,
    ) -> ShortenerResponse;

    /// Runs an already decoded event through the pipeline.
    async fn shorten(
        &self,
        event: EventEnvelope,
        context: &InvocationContext,
    ) -> Result<ShortenOutcome, ShortenerError>;
}
