//! Bus event envelope
//!
//! The decoded event is kept as an open JSON object so that unknown keys in the
//! envelope and in `detail` survive untouched. Typed accessors surface missing
//! or ill-typed fields as [`EventError`]s.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EventError;

/// Envelope field names as the bus expects them
pub mod fields {
    pub const SOURCE: &str = "source";
    pub const DETAIL_TYPE: &str = "detail-type";
    pub const DETAIL: &str = "detail";
    pub const RESOURCES: &str = "resources";
    pub const TIME: &str = "time";

    /// Offloadable payload inside `detail`
    pub const DATA: &str = "data";
    /// Metadata block inside `detail`
    pub const METADATA: &str = "metadata";
    /// Truncation record key inside `detail.metadata`
    pub const EVENT_TRUNCATION: &str = "event_truncation";
}

/// A structured event bound for the bus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventEnvelope {
    fields: Map<String, Value>,
}

impl EventEnvelope {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn source(&self) -> Result<&str, EventError> {
        self.required_str(fields::SOURCE)
    }

    pub fn detail_type(&self) -> Result<&str, EventError> {
        self.required_str(fields::DETAIL_TYPE)
    }

    pub fn detail(&self) -> Result<&Map<String, Value>, EventError> {
        match self.fields.get(fields::DETAIL) {
            Some(Value::Object(detail)) => Ok(detail),
            Some(_) => Err(EventError::InvalidField {
                field: fields::DETAIL,
                expected: "an object",
            }),
            None => Err(EventError::MissingField(fields::DETAIL)),
        }
    }

    pub fn detail_mut(&mut self) -> Result<&mut Map<String, Value>, EventError> {
        match self.fields.get_mut(fields::DETAIL) {
            Some(Value::Object(detail)) => Ok(detail),
            Some(_) => Err(EventError::InvalidField {
                field: fields::DETAIL,
                expected: "an object",
            }),
            None => Err(EventError::MissingField(fields::DETAIL)),
        }
    }

    /// `time` counts as present only when it is set to a non-null value.
    pub fn has_time(&self) -> bool {
        !matches!(self.fields.get(fields::TIME), None | Some(Value::Null))
    }

    /// Resource identifiers in order. A missing `resources` key is empty.
    pub fn resources(&self) -> Result<Vec<&str>, EventError> {
        match self.fields.get(fields::RESOURCES) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    item.as_str()
                        .ok_or(EventError::InvalidResource { index })
                })
                .collect(),
            Some(_) => Err(EventError::InvalidField {
                field: fields::RESOURCES,
                expected: "an array of strings",
            }),
        }
    }

    /// The offloadable `detail.data` value, if any.
    pub fn data(&self) -> Result<Option<&Value>, EventError> {
        Ok(self.detail()?.get(fields::DATA))
    }

    /// Removes and returns `detail.data`.
    pub fn take_data(&mut self) -> Result<Option<Value>, EventError> {
        Ok(self.detail_mut()?.remove(fields::DATA))
    }

    /// `detail.metadata`, created as an empty object when absent.
    pub fn metadata_mut(&mut self) -> Result<&mut Map<String, Value>, EventError> {
        let metadata = self
            .detail_mut()?
            .entry(fields::METADATA)
            .or_insert_with(|| Value::Object(Map::new()));

        match metadata {
            Value::Object(map) => Ok(map),
            _ => Err(EventError::InvalidField {
                field: fields::METADATA,
                expected: "an object",
            }),
        }
    }

    /// Fails unless `detail.metadata` is absent or an object, so the
    /// truncation record can be stamped.
    pub fn ensure_annotatable(&self) -> Result<(), EventError> {
        match self.detail()?.get(fields::METADATA) {
            None | Some(Value::Object(_)) => Ok(()),
            Some(_) => Err(EventError::InvalidField {
                field: fields::METADATA,
                expected: "an object",
            }),
        }
    }

    /// `detail.metadata.event_truncation`, if stamped.
    pub fn truncation(&self) -> Option<&Value> {
        self.detail()
            .ok()?
            .get(fields::METADATA)?
            .get(fields::EVENT_TRUNCATION)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    fn required_str(&self, field: &'static str) -> Result<&str, EventError> {
        match self.fields.get(field) {
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(EventError::InvalidField {
                field,
                expected: "a string",
            }),
            None => Err(EventError::MissingField(field)),
        }
    }
}

impl From<Map<String, Value>> for EventEnvelope {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}
