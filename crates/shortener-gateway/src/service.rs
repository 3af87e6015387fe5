//! Gateway service: HTTP router and server lifecycle.
//!
//! Routes:
//! - `POST /putevent`: run the body through the shortener
//! - `GET /health`: liveness
//! - `GET /metrics`: Prometheus text exposition

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use shortener_core::{
    BlobStore, CompositeMetricsSink, DecodeError, EmbeddedMetricsSink, EventShortenerApi,
    InMemoryBlobStore, InboundPayload, InstrumentedShortener, InvocationContext, MetricsSink,
    ShortenerConfig, ShortenerError, ShortenerResponse, ShortenerService,
};
use shortener_telemetry::{
    encode_metrics, time_histogram, HTTP_RESPONSES_TOTAL, OFFLOADS_TOTAL, REQUEST_DURATION,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::adapters::PrometheusMetricsSink;
use crate::domain::{GatewayConfig, GatewayError, HttpConfig, StorageBackend};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<dyn EventShortenerApi>,
}

/// Build the HTTP router around any shortener implementation.
pub fn build_router(shortener: Arc<dyn EventShortenerApi>, http: &HttpConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(http.max_body_bytes));

    Router::new()
        .route("/putevent", post(put_event))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(middleware)
        .with_state(AppState { shortener })
}

/// API Gateway service state
pub struct GatewayService {
    config: GatewayConfig,
    router: Router,
}

impl GatewayService {
    /// Wire storage, metrics and the instrumented shortener from configuration.
    pub async fn build(
        config: GatewayConfig,
        shortener_config: ShortenerConfig,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        shortener_config.validate()?;

        let store = blob_store(config.storage_backend, &shortener_config).await?;

        let mut sinks = CompositeMetricsSink::default();
        sinks.push(Arc::new(PrometheusMetricsSink));
        if config.emf_metrics {
            sinks.push(Arc::new(EmbeddedMetricsSink::stdout(
                shortener_config.metrics_namespace.clone(),
                shortener_config.service_name.clone(),
            )));
        }
        let metrics: Arc<dyn MetricsSink> = Arc::new(sinks);

        let service_name = shortener_config.service_name.clone();
        let environment = shortener_config.environment.clone();
        let shortener = InstrumentedShortener::new(
            ShortenerService::new(store, metrics.clone(), shortener_config),
            metrics,
            service_name,
            environment,
        );

        let router = build_router(Arc::new(shortener), &config.http);
        Ok(Self { config, router })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(addr = %addr, backend = ?self.config.storage_backend, "shortener gateway listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("shortener gateway stopped");
        Ok(())
    }
}

async fn blob_store(
    backend: StorageBackend,
    shortener_config: &ShortenerConfig,
) -> Result<Arc<dyn BlobStore>, GatewayError> {
    match backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryBlobStore::new())),
        #[cfg(feature = "s3")]
        StorageBackend::S3 => Ok(Arc::new(
            shortener_core::S3BlobStore::from_env(shortener_config.region.clone()).await,
        )),
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => {
            let _ = shortener_config;
            Err(GatewayError::UnsupportedBackend("s3"))
        }
    }
}

/// Handle a put-event request
async fn put_event(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let _timer = time_histogram!(REQUEST_DURATION);

    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let context = InvocationContext::new(request_id.clone());

    let response = match String::from_utf8(body.to_vec()) {
        Ok(text) => {
            state
                .shortener
                .put_event(&InboundPayload::Raw(text), &context)
                .await
        }
        Err(e) => ShortenerResponse::from_error(&ShortenerError::from(DecodeError::InvalidJson(
            e.to_string(),
        ))),
    };

    record_outcome(&response);

    let status = StatusCode::from_u16(response.status_code).unwrap_or_else(|_| {
        error!(status_code = response.status_code, "unmappable status code");
        StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut http_response = (status, Json(response)).into_response();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        http_response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    http_response
}

fn record_outcome(response: &ShortenerResponse) {
    let status = response.status_code.to_string();
    HTTP_RESPONSES_TOTAL
        .with_label_values(&[status.as_str()])
        .inc();

    let offload_outcome = match (response.truncated, response.error_kind.as_deref()) {
        (Some(true), _) => Some("success"),
        (_, Some(kind @ ("storage_write" | "handle_presign"))) => Some(kind),
        _ => None,
    };
    if let Some(outcome) = offload_outcome {
        OFFLOADS_TOTAL.with_label_values(&[outcome]).inc();
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "shortener-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus exposition endpoint
async fn metrics() -> Response {
    match encode_metrics() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_with_memory_backend() {
        let config = GatewayConfig {
            storage_backend: StorageBackend::Memory,
            ..Default::default()
        };
        let service = GatewayService::build(config, ShortenerConfig::for_bucket("b")).await;
        assert!(service.is_ok());
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_shortener_config() {
        let config = GatewayConfig {
            storage_backend: StorageBackend::Memory,
            ..Default::default()
        };
        let result = GatewayService::build(config, ShortenerConfig::default()).await;
        assert!(matches!(result, Err(GatewayError::Shortener(_))));
    }

    #[test]
    fn test_record_outcome_labels() {
        let before = OFFLOADS_TOTAL.with_label_values(&["handle_presign"]).get();
        let failed = ShortenerResponse {
            status_code: 502,
            truncated: None,
            size: None,
            retrieval_url: None,
            message: Some("Failed to offload event data".into()),
            error_kind: Some("handle_presign".into()),
        };
        record_outcome(&failed);
        assert_eq!(
            OFFLOADS_TOTAL.with_label_values(&["handle_presign"]).get(),
            before + 1.0
        );
    }
}
