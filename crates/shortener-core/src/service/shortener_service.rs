//! Shortener Service
//!
//! Orchestrates the pipeline: estimate, decide, offload, annotate, re-estimate,
//! emit metrics.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::adapters::SystemClock;
use crate::domain::metric::ENVIRONMENT_METADATA;
use crate::domain::{
    annotate, decode, estimate_size, object_key, EventEnvelope, InboundPayload, MetricSample,
    OffloadPayload, ShortenerConfig, ShortenerResponse, TruncationRecord,
};
use crate::error::{OffloadError, ShortenerError};
use crate::ports::{
    BlobStore, EventShortenerApi, InvocationContext, MetricsSink, PresignMethod, ShortenOutcome,
    TimeSource,
};

/// Shortener Service implementation
///
/// Implements the `EventShortenerApi` port using injected collaborators. Holds
/// no per-request state, so one instance serves concurrent requests.
pub struct ShortenerService {
    store: Arc<dyn BlobStore>,
    metrics: Arc<dyn MetricsSink>,
    clock: Arc<dyn TimeSource>,
    config: ShortenerConfig,
}

impl ShortenerService {
    pub fn new(
        store: Arc<dyn BlobStore>,
        metrics: Arc<dyn MetricsSink>,
        config: ShortenerConfig,
    ) -> Self {
        Self {
            store,
            metrics,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the wall clock used for object keys
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ShortenerConfig {
        &self.config
    }

    async fn process(
        &self,
        payload: &InboundPayload,
        context: &InvocationContext,
    ) -> Result<ShortenOutcome, ShortenerError> {
        let event = decode(payload)?;
        self.shorten(event, context).await
    }

    /// Moves `detail.data` to blob storage and returns the pointer record.
    ///
    /// `detail.data` is removed only after both the write and the presign
    /// succeed, so a failed offload leaves the event untouched.
    async fn offload(&self, event: &mut EventEnvelope) -> Result<TruncationRecord, ShortenerError> {
        let payload = OffloadPayload::from_data(event.data()?)?;
        let original_data_size = payload.len();
        if payload.is_empty() {
            warn!(original_data_size, "offloading event without detail.data");
        }

        let bucket = self.config.bucket_name.clone();
        let key = object_key(self.clock.now(), Uuid::new_v4());

        self.store
            .put(&bucket, &key, payload.into_bytes(), &self.config.content_type)
            .await
            .map_err(|source| OffloadError::StorageWrite {
                bucket: bucket.clone(),
                key: key.clone(),
                source,
            })?;
        debug!(bucket = %bucket, object_key = %key, original_data_size, "stored event data");

        let url = self
            .store
            .presign(
                &bucket,
                &key,
                PresignMethod::Get,
                self.config.url_expiration(),
            )
            .await
            .map_err(|source| OffloadError::HandlePresign {
                bucket: bucket.clone(),
                key: key.clone(),
                source,
            })?;

        event.take_data()?;
        info!(
            bucket = %bucket,
            object_key = %key,
            original_data_size,
            expires_in_secs = self.config.url_expiration_secs,
            "event data offloaded"
        );

        Ok(TruncationRecord::truncated(
            url,
            original_data_size,
            bucket,
            key,
        ))
    }

    /// Publishes the size and count samples. Failures are logged only.
    fn emit_metrics(&self, size_bytes: usize, event_type: &str, correlation_id: &str) {
        let sample = MetricSample {
            size_bytes,
            event_type: event_type.to_string(),
            correlation_id: correlation_id.to_string(),
        };
        let mut batch = sample.to_batch();
        batch.metadata.insert(
            ENVIRONMENT_METADATA.to_string(),
            self.config.environment.clone(),
        );

        if let Err(e) = self.metrics.publish(&batch) {
            warn!(
                error = %e,
                error_kind = e.kind().as_str(),
                correlation_id,
                "failed to emit event metrics"
            );
        }
    }
}

#[async_trait]
impl EventShortenerApi for ShortenerService {
    async fn put_event(
        &self,
        payload: &InboundPayload,
        context: &InvocationContext,
    ) -> ShortenerResponse {
        match self.process(payload, context).await {
            Ok(outcome) => outcome.to_response(),
            Err(e) => {
                match &e {
                    ShortenerError::Offload(_) => {
                        error!(error = %e, error_kind = e.kind().as_str(), "event offload failed")
                    }
                    _ => warn!(error = %e, error_kind = e.kind().as_str(), "rejected event"),
                }
                ShortenerResponse::from_error(&e)
            }
        }
    }

    async fn shorten(
        &self,
        mut event: EventEnvelope,
        context: &InvocationContext,
    ) -> Result<ShortenOutcome, ShortenerError> {
        let policy = self.config.policy;

        let original_size = estimate_size(&event)?;
        event.ensure_annotatable()?;
        let decision = policy.decide(original_size);
        debug!(
            event_size = original_size,
            threshold = policy.threshold(),
            ?decision,
            "sized inbound event"
        );

        let record = if decision.requires_offload() {
            self.offload(&mut event).await?
        } else {
            TruncationRecord::not_truncated()
        };

        annotate(&mut event, &record)?;
        let final_size = estimate_size(&event)?;

        if !policy.fits(final_size) {
            warn!(
                event_size = final_size,
                threshold = policy.threshold(),
                "annotated event still exceeds the bus limit"
            );
        }

        self.emit_metrics(final_size, event.detail_type()?, &context.request_id);

        info!(
            event_size = final_size,
            original_size,
            event_truncated = record.truncated,
            "event processed"
        );

        Ok(ShortenOutcome {
            event,
            original_size,
            final_size,
            record,
        })
    }
}
