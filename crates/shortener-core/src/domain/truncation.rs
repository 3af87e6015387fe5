//! Truncation record and metadata annotation

use serde::{Deserialize, Serialize};

use crate::domain::event::{fields, EventEnvelope};
use crate::error::EventError;

/// Pointer left in `detail.metadata.event_truncation`
///
/// A pass-through record serializes as exactly `{"truncated":false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationRecord {
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_data_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}

impl TruncationRecord {
    pub fn not_truncated() -> Self {
        Self {
            truncated: false,
            retrieval_url: None,
            original_data_size: None,
            storage_bucket: None,
            storage_key: None,
        }
    }

    pub fn truncated(
        retrieval_url: String,
        original_data_size: usize,
        storage_bucket: String,
        storage_key: String,
    ) -> Self {
        Self {
            truncated: true,
            retrieval_url: Some(retrieval_url),
            original_data_size: Some(original_data_size),
            storage_bucket: Some(storage_bucket),
            storage_key: Some(storage_key),
        }
    }
}

/// Stamps `detail.metadata.event_truncation` with `record`.
///
/// Replaces any earlier stamp, so repeated calls leave a single key holding
/// the last record written.
pub fn annotate(event: &mut EventEnvelope, record: &TruncationRecord) -> Result<(), EventError> {
    let value =
        serde_json::to_value(record).map_err(|e| EventError::Unserializable(e.to_string()))?;
    event
        .metadata_mut()?
        .insert(fields::EVENT_TRUNCATION.to_string(), value);
    Ok(())
}
