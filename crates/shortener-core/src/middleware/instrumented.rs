//! Instrumentation decorator
//!
//! Wraps any [`EventShortenerApi`] with a request span, completion logging,
//! latency and a one-time `ColdStart` sample. The wrapped pipeline stays free
//! of instrumentation concerns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{field, info, info_span, warn, Instrument, Span};

use crate::domain::metric::{COLD_START_METRIC, ENVIRONMENT_METADATA};
use crate::domain::{EventEnvelope, InboundPayload, MetricBatch, MetricDatum, MetricUnit, ShortenerResponse};
use crate::error::ShortenerError;
use crate::ports::{EventShortenerApi, InvocationContext, MetricsSink, ShortenOutcome};

pub struct InstrumentedShortener<S> {
    inner: S,
    metrics: Arc<dyn MetricsSink>,
    service_name: String,
    environment: String,
    cold: AtomicBool,
}

impl<S: EventShortenerApi> InstrumentedShortener<S> {
    pub fn new(
        inner: S,
        metrics: Arc<dyn MetricsSink>,
        service_name: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            metrics,
            service_name: service_name.into(),
            environment: environment.into(),
            cold: AtomicBool::new(true),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// True on the first call only.
    fn take_cold_start(&self) -> bool {
        self.cold.swap(false, Ordering::SeqCst)
    }

    fn emit_cold_start(&self) {
        let mut batch = MetricBatch {
            datums: vec![MetricDatum {
                name: COLD_START_METRIC,
                unit: MetricUnit::Count,
                value: 1.0,
            }],
            ..Default::default()
        };
        batch
            .metadata
            .insert(ENVIRONMENT_METADATA.to_string(), self.environment.clone());

        if let Err(e) = self.metrics.publish(&batch) {
            warn!(error = %e, error_kind = e.kind().as_str(), "failed to emit cold start metric");
        }
    }

    fn span(&self, operation: &'static str, context: &InvocationContext, cold_start: bool) -> Span {
        info_span!(
            "shortener",
            operation,
            request_id = %context.request_id,
            service = %self.service_name,
            environment = %self.environment,
            cold_start,
            status_code = field::Empty,
            event_size = field::Empty,
            event_truncated = field::Empty,
        )
    }
}

#[async_trait]
impl<S: EventShortenerApi> EventShortenerApi for InstrumentedShortener<S> {
    async fn put_event(
        &self,
        payload: &InboundPayload,
        context: &InvocationContext,
    ) -> ShortenerResponse {
        let cold_start = self.take_cold_start();
        if cold_start {
            self.emit_cold_start();
        }

        let span = self.span("put_event", context, cold_start);
        async {
            let started = Instant::now();
            let response = self.inner.put_event(payload, context).await;

            let span = Span::current();
            span.record("status_code", response.status_code);
            if let Some(size) = response.size {
                span.record("event_size", size as u64);
            }
            if let Some(truncated) = response.truncated {
                span.record("event_truncated", truncated);
            }

            info!(
                status_code = response.status_code,
                error_kind = response.error_kind.as_deref().unwrap_or(""),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "request completed"
            );
            response
        }
        .instrument(span)
        .await
    }

    async fn shorten(
        &self,
        event: EventEnvelope,
        context: &InvocationContext,
    ) -> Result<ShortenOutcome, ShortenerError> {
        let cold_start = self.take_cold_start();
        if cold_start {
            self.emit_cold_start();
        }

        let span = self.span("shorten", context, cold_start);
        async {
            let started = Instant::now();
            let result = self.inner.shorten(event, context).await;

            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(outcome) => {
                    let span = Span::current();
                    span.record("event_size", outcome.final_size as u64);
                    span.record("event_truncated", outcome.truncated());
                    info!(elapsed_ms, "event shortened");
                }
                Err(e) => {
                    warn!(elapsed_ms, error_kind = e.kind().as_str(), "event not shortened");
                }
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryBlobStore, RecordingMetricsSink};
    use crate::domain::metric::SIZE_METRIC;
    use crate::domain::ShortenerConfig;
    use crate::service::ShortenerService;

    fn instrumented() -> (
        InstrumentedShortener<ShortenerService>,
        Arc<RecordingMetricsSink>,
    ) {
        let metrics = Arc::new(RecordingMetricsSink::new());
        let service = ShortenerService::new(
            Arc::new(InMemoryBlobStore::new()),
            metrics.clone(),
            ShortenerConfig::for_bucket("bucket"),
        );
        let wrapped = InstrumentedShortener::new(service, metrics.clone(), "svc", "test");
        (wrapped, metrics)
    }

    fn small_event() -> InboundPayload {
        InboundPayload::raw(
            r#"{"source":"svc","detail-type":"order","detail":{"data":"x","metadata":{}}}"#,
        )
    }

    fn count(metrics: &RecordingMetricsSink, name: &str) -> usize {
        metrics
            .batches()
            .iter()
            .filter(|b| b.datum(name).is_some())
            .count()
    }

    #[tokio::test]
    async fn test_cold_start_emitted_once() {
        let (shortener, metrics) = instrumented();

        for i in 0..3 {
            let ctx = InvocationContext::new(format!("req-{i}"));
            let response = shortener.put_event(&small_event(), &ctx).await;
            assert_eq!(response.status_code, 200);
        }

        assert_eq!(count(&metrics, COLD_START_METRIC), 1);
        assert_eq!(count(&metrics, SIZE_METRIC), 3);

        let cold = metrics.batches().into_iter().find(|b| b.datum(COLD_START_METRIC).is_some()).unwrap();
        assert_eq!(cold.metadata[ENVIRONMENT_METADATA], "test");
    }

    #[tokio::test]
    async fn test_cold_start_tracked_per_instance() {
        let (first, first_metrics) = instrumented();
        let (second, second_metrics) = instrumented();

        first.put_event(&small_event(), &InvocationContext::new("a")).await;
        first.put_event(&small_event(), &InvocationContext::new("b")).await;
        second.put_event(&small_event(), &InvocationContext::new("c")).await;

        assert_eq!(count(&first_metrics, COLD_START_METRIC), 1);
        assert_eq!(count(&second_metrics, COLD_START_METRIC), 1);
    }

    #[tokio::test]
    async fn test_response_passes_through() {
        let (shortener, _) = instrumented();
        let ctx = InvocationContext::new("req");

        let wrapped = shortener.put_event(&small_event(), &ctx).await;
        let direct = shortener.inner().put_event(&small_event(), &ctx).await;
        assert_eq!(wrapped, direct);

        let bad = shortener
            .put_event(&InboundPayload::raw("{invalid"), &ctx)
            .await;
        assert_eq!(bad.status_code, 400);
    }
}
