//! # Pipeline Scenario Tests
//!
//! Drives `ShortenerService` end to end against the in-memory blob store and
//! the recording metrics sink.
//!
//! ## Test Categories
//!
//! 1. **Pass-through** - small events, exact size accounting, threshold boundary
//! 2. **Offload** - large payloads, stored bytes, key layout, key uniqueness
//! 3. **Failure classification** - decode, malformed event, storage, presign
//! 4. **Metrics** - one sample per request, failures are non-fatal

use std::sync::Arc;

use chrono::TimeZone;
use serde_json::{json, Value};

use shortener_core::domain::canonical_json;
use shortener_core::domain::metric::{COUNT_METRIC, EVENT_TYPE_DIMENSION, PUT_EVENT_ID_METADATA, SIZE_METRIC};
use shortener_core::{
    EventShortenerApi, FixedClock, InMemoryBlobStore, InboundPayload, InvocationContext,
    MetricsError, RecordingMetricsSink, ShortenerConfig, ShortenerService, StorageError,
};

// =============================================================================
// TEST HELPERS
// =============================================================================

const THRESHOLD: usize = 255_950;

struct Harness {
    service: Arc<ShortenerService>,
    store: Arc<InMemoryBlobStore>,
    metrics: Arc<RecordingMetricsSink>,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryBlobStore::new());
    let metrics = Arc::new(RecordingMetricsSink::new());
    let now = chrono::Utc.with_ymd_and_hms(2023, 11, 5, 8, 30, 0).unwrap();
    let service = ShortenerService::new(
        store.clone(),
        metrics.clone(),
        ShortenerConfig::for_bucket("shortener-bucket"),
    )
    .with_clock(Arc::new(FixedClock::new(now)));

    Harness {
        service: Arc::new(service),
        store,
        metrics,
    }
}

fn wrapped(event: &Value) -> InboundPayload {
    InboundPayload::wrapped(event.to_string())
}

fn order_event(data: Value) -> Value {
    json!({
        "source": "svc",
        "detail-type": "order",
        "detail": {"data": data, "metadata": {}},
        "resources": []
    })
}

/// Event whose raw size is exactly `size` bytes (`size` >= 14).
fn event_of_size(size: usize) -> Value {
    // 1 (source) + 1 (detail-type) + len(`{"data": "` + payload + `"}`)
    json!({
        "source": "s",
        "detail-type": "t",
        "detail": {"data": "x".repeat(size - 14)}
    })
}

async fn put(h: &Harness, payload: &InboundPayload, request_id: &str) -> Value {
    let response = h
        .service
        .put_event(payload, &InvocationContext::new(request_id))
        .await;
    serde_json::to_value(response).unwrap()
}

// =============================================================================
// PASS-THROUGH
// =============================================================================

#[tokio::test]
async fn test_small_event_passes_through() {
    let h = harness();
    let payload: InboundPayload = serde_json::from_str(
        r#"{"body": "{\"source\":\"svc\",\"detail-type\":\"order\",\"detail\":{\"data\":\"hi\",\"metadata\":{}},\"resources\":[]}"}"#,
    )
    .unwrap();

    let response = put(&h, &payload, "req-small").await;

    // detail after annotation
    let canonical = r#"{"data": "hi", "metadata": {"event_truncation": {"truncated": false}}}"#;
    assert_eq!(canonical.len(), 70);
    assert_eq!(
        response,
        json!({"statusCode": 200, "truncated": false, "size": 3 + 5 + 70})
    );
    assert_eq!(h.store.put_count(), 0);
    assert_eq!(h.store.presign_count(), 0);
}

#[tokio::test]
async fn test_annotated_event_keeps_data() {
    let h = harness();
    let ctx = InvocationContext::new("req");
    let event = serde_json::from_value(order_event(json!({"sku": 7}))).unwrap();

    let outcome = h.service.shorten(event, &ctx).await.unwrap();

    let value = outcome.event.clone().into_value();
    assert_eq!(value["detail"]["data"], json!({"sku": 7}));
    assert_eq!(
        value["detail"]["metadata"]["event_truncation"],
        json!({"truncated": false})
    );
    assert_eq!(value["source"], json!("svc"));
}

#[tokio::test]
async fn test_time_and_resources_count_toward_size() {
    let h = harness();
    let base = order_event(json!("x"));
    let mut with_extras = base.clone();
    with_extras["time"] = json!("2023-11-05T08:30:00Z");
    with_extras["resources"] = json!(["arn:aws:a", "", "arn:aws:bc"]);

    let plain = put(&h, &wrapped(&base), "a").await;
    let extra = put(&h, &wrapped(&with_extras), "b").await;

    let plain_size = plain["size"].as_u64().unwrap();
    let extra_size = extra["size"].as_u64().unwrap();
    assert_eq!(extra_size, plain_size + 14 + 9 + 10);
}

#[tokio::test]
async fn test_threshold_boundary() {
    let h = harness();

    let at = put(&h, &wrapped(&event_of_size(THRESHOLD)), "at").await;
    assert_eq!(at["truncated"], json!(false));
    assert_eq!(h.store.put_count(), 0);

    let over = put(&h, &wrapped(&event_of_size(THRESHOLD + 1)), "over").await;
    assert_eq!(over["truncated"], json!(true));
    assert_eq!(h.store.put_count(), 1);
}

#[tokio::test]
async fn test_escaped_non_ascii_pushes_event_over_threshold() {
    let h = harness();
    // 200,013 bytes as raw UTF-8, 600,014 once each "é" is written as \u00e9
    let event = json!({
        "source": "s",
        "detail-type": "t",
        "detail": {"data": "é".repeat(100_000)}
    });
    assert!(event.to_string().len() < THRESHOLD);

    let response = put(&h, &wrapped(&event), "req-accents").await;

    assert_eq!(response["truncated"], json!(true));
    assert_eq!(h.store.put_count(), 1);
}

#[tokio::test]
async fn test_separator_spacing_counts_toward_threshold() {
    let h = harness();
    // Spacing adds 21 bytes over the compact form: 11 after `:`, 10 after `,`.
    let mut detail = serde_json::Map::new();
    for i in 0..10 {
        detail.insert(format!("k{i}"), json!(i));
    }
    let compact_extra = serde_json::to_string(&detail).unwrap().len();
    detail.insert("data".into(), json!("x".repeat(THRESHOLD - 14 - compact_extra)));
    let event = json!({"source": "s", "detail-type": "t", "detail": detail});

    let compact_size = 2 + serde_json::to_string(&event["detail"]).unwrap().len();
    assert!(compact_size <= THRESHOLD);

    let response = put(&h, &wrapped(&event), "req-keys").await;

    assert_eq!(response["truncated"], json!(true));
    assert_eq!(h.store.put_count(), 1);
}

// =============================================================================
// OFFLOAD
// =============================================================================

#[tokio::test]
async fn test_one_megabyte_string_is_offloaded() {
    let h = harness();
    let data = "a".repeat(1_048_576);

    let response = put(&h, &wrapped(&order_event(json!(data))), "req-big").await;

    assert_eq!(response["statusCode"], json!(200));
    assert_eq!(response["truncated"], json!(true));
    let url = response["retrievalUrl"].as_str().unwrap();
    assert!(!url.is_empty());
    assert!((response["size"].as_u64().unwrap() as usize) < THRESHOLD);

    assert_eq!(h.store.put_count(), 1);
    let keys = h.store.keys("shortener-bucket");
    assert_eq!(keys.len(), 1);
    let object = h.store.object("shortener-bucket", &keys[0]).unwrap();
    assert_eq!(object.body, data.as_bytes());
    assert_eq!(object.content_type, "application/json");
    assert!(url.contains(&keys[0]));
}

#[tokio::test]
async fn test_truncation_record_points_at_object() {
    let h = harness();
    let data = json!({"rows": vec!["r".repeat(1_000); 300]});
    let event = serde_json::from_value(order_event(data.clone())).unwrap();

    let outcome = h
        .service
        .shorten(event, &InvocationContext::new("req"))
        .await
        .unwrap();

    let value = outcome.event.clone().into_value();
    assert!(value["detail"].get("data").is_none());

    let record = &value["detail"]["metadata"]["event_truncation"];
    assert_eq!(record["truncated"], json!(true));
    assert_eq!(record["storage_bucket"], json!("shortener-bucket"));

    let key = record["storage_key"].as_str().unwrap();
    assert!(key.starts_with("2023/11/5/"));
    assert!(key.ends_with(".json"));

    let stored = h.store.get("shortener-bucket", key).unwrap();
    assert_eq!(record["original_data_size"], json!(stored.len()));
    assert_eq!(serde_json::from_slice::<Value>(&stored).unwrap(), data);
    assert_eq!(outcome.final_size, value_size(&value));
}

fn value_size(event: &Value) -> usize {
    let detail = canonical_json(event["detail"].as_object().unwrap()).unwrap();
    event["source"].as_str().unwrap().len()
        + event["detail-type"].as_str().unwrap().len()
        + detail.len()
}

#[tokio::test]
async fn test_concurrent_offloads_use_distinct_keys() {
    let h = harness();
    let big = order_event(json!("z".repeat(300_000)));

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = h.service.clone();
        let payload = wrapped(&big);
        handles.push(tokio::spawn(async move {
            service
                .put_event(&payload, &InvocationContext::new(format!("req-{i}")))
                .await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().status_code, 200);
    }

    assert_eq!(h.store.put_count(), 8);
    assert_eq!(h.store.keys("shortener-bucket").len(), 8);
}

// =============================================================================
// FAILURE CLASSIFICATION
// =============================================================================

#[tokio::test]
async fn test_invalid_json_body() {
    let h = harness();
    let response = put(&h, &InboundPayload::raw("{invalid"), "req").await;

    assert_eq!(
        response,
        json!({"statusCode": 400, "message": "Invalid JSON in body"})
    );
    assert!(h.metrics.batches().is_empty());
}

#[tokio::test]
async fn test_malformed_events_are_rejected() {
    let h = harness();
    let cases = [
        json!({"detail-type": "order", "detail": {}}),
        json!({"source": "svc", "detail": {}}),
        json!({"source": "svc", "detail-type": "order"}),
        json!({"source": "svc", "detail-type": "order", "detail": "text"}),
        json!({"source": "svc", "detail-type": "order", "detail": {}, "resources": [1]}),
        json!({"source": "svc", "detail-type": "order", "detail": {"metadata": []}}),
        json!({
            "source": "svc",
            "detail-type": "order",
            "detail": {"data": "q".repeat(300_000), "metadata": "not-an-object"}
        }),
    ];

    for case in &cases {
        let response = put(&h, &wrapped(case), "req").await;
        assert_eq!(response["statusCode"], json!(400), "case {case}");
        assert_eq!(response["errorKind"], json!("malformed_event"), "case {case}");
    }
    assert_eq!(h.store.put_count(), 0);
    assert!(h.store.keys("shortener-bucket").is_empty());
    assert!(h.metrics.batches().is_empty());
}

#[tokio::test]
async fn test_storage_write_failure_is_surfaced() {
    let h = harness();
    h.store
        .fail_puts_with(StorageError::Unavailable("bucket offline".into()));

    let response = put(&h, &wrapped(&order_event(json!("q".repeat(300_000)))), "req").await;

    assert_eq!(response["statusCode"], json!(502));
    assert_eq!(response["errorKind"], json!("storage_write"));
    assert!(response.get("retrievalUrl").is_none());
    assert_eq!(h.store.put_count(), 1);
    assert_eq!(h.store.presign_count(), 0);
    assert!(h.metrics.batches().is_empty());
}

#[tokio::test]
async fn test_presign_failure_is_surfaced() {
    let h = harness();
    h.store
        .fail_presigns_with(StorageError::AccessDenied("no signing key".into()));

    let response = put(&h, &wrapped(&order_event(json!("q".repeat(300_000)))), "req").await;

    assert_eq!(response["statusCode"], json!(502));
    assert_eq!(response["errorKind"], json!("handle_presign"));
    assert!(response.get("retrievalUrl").is_none());
    assert_eq!(h.store.put_count(), 1);
    assert_eq!(h.store.presign_count(), 1);
}

// =============================================================================
// METRICS
// =============================================================================

#[tokio::test]
async fn test_metrics_sample_per_request() {
    let h = harness();
    let response = put(&h, &wrapped(&order_event(json!("x"))), "req-metrics").await;

    let batches = h.metrics.batches();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(
        batch.datum(SIZE_METRIC).unwrap().value,
        response["size"].as_f64().unwrap()
    );
    assert_eq!(batch.datum(COUNT_METRIC).unwrap().value, 1.0);
    assert_eq!(batch.dimensions[EVENT_TYPE_DIMENSION], "order");
    assert_eq!(batch.metadata[PUT_EVENT_ID_METADATA], "req-metrics");
}

#[tokio::test]
async fn test_metrics_failure_does_not_fail_request() {
    let h = harness();
    h.metrics
        .fail_with(MetricsError::Rejected("sink unavailable".into()));

    let response = put(&h, &wrapped(&order_event(json!("q".repeat(300_000)))), "req").await;

    assert_eq!(response["statusCode"], json!(200));
    assert_eq!(response["truncated"], json!(true));
}
