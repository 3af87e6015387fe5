//! Offload payload and object key construction

use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::error::EventError;

/// Serialized form of the offloaded `detail.data` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffloadPayload {
    bytes: Vec<u8>,
}

impl OffloadPayload {
    /// A JSON string is stored as its raw text, any other value as compact
    /// JSON. An absent field yields an empty payload.
    pub fn from_data(data: Option<&Value>) -> Result<Self, EventError> {
        let bytes = match data {
            None => Vec::new(),
            Some(Value::String(s)) => s.as_bytes().to_vec(),
            Some(other) => {
                serde_json::to_vec(other).map_err(|e| EventError::Unserializable(e.to_string()))?
            }
        };
        Ok(Self { bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Object key `{year}/{month}/{day}/{id}.json` from the UTC date.
///
/// Month and day are not zero-padded.
pub fn object_key(now: DateTime<Utc>, id: Uuid) -> String {
    format!(
        "{}/{}/{}/{}.json",
        now.year(),
        now.month(),
        now.day(),
        id.hyphenated()
    )
}
