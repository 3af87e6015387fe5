//! Inbound payload decoding

use serde::Deserialize;
use serde_json::Value;

use crate::domain::event::EventEnvelope;
use crate::error::DecodeError;

/// Raw request as handed over by the front door
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InboundPayload {
    /// Proxy-style wrapper whose `body` holds the JSON-encoded event
    Wrapped { body: Option<String> },
    /// The JSON-encoded event itself
    Raw(String),
}

impl InboundPayload {
    pub fn raw(body: impl Into<String>) -> Self {
        InboundPayload::Raw(body.into())
    }

    pub fn wrapped(body: impl Into<String>) -> Self {
        InboundPayload::Wrapped {
            body: Some(body.into()),
        }
    }

    fn body(&self) -> Option<&str> {
        match self {
            InboundPayload::Raw(body) => Some(body),
            InboundPayload::Wrapped { body } => body.as_deref(),
        }
    }
}

/// Parses the request body into an event envelope.
///
/// Only well-formedness is checked here; missing event fields are reported
/// later by the size estimator.
pub fn decode(payload: &InboundPayload) -> Result<EventEnvelope, DecodeError> {
    let body = payload.body().ok_or(DecodeError::MissingBody)?;

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(EventEnvelope::new(fields)),
        Ok(_) => Err(DecodeError::NotAnObject),
        Err(e) => Err(DecodeError::InvalidJson(e.to_string())),
    }
}
