//! Error types for the shortener pipeline
//!
//! Every failure the pipeline can surface maps to exactly one [`ErrorKind`],
//! so callers and tests can assert on classification instead of a boolean.

use serde::Serialize;
use thiserror::Error;

/// Classification of a pipeline failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request body is not a decodable JSON object
    Decode,
    /// Decoded event lacks fields the estimator or annotator needs
    MalformedEvent,
    /// Blob write failed during offload
    StorageWrite,
    /// Presigned handle generation failed during offload
    HandlePresign,
    /// Metrics sink rejected a sample (never propagated)
    MetricsEmit,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode",
            ErrorKind::MalformedEvent => "malformed_event",
            ErrorKind::StorageWrite => "storage_write",
            ErrorKind::HandlePresign => "handle_presign",
            ErrorKind::MetricsEmit => "metrics_emit",
        }
    }
}

/// Top-level pipeline error
#[derive(Debug, Error)]
pub enum ShortenerError {
    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("Malformed event: {0}")]
    MalformedEvent(#[from] EventError),

    #[error("Offload failed: {0}")]
    Offload(#[from] OffloadError),
}

impl ShortenerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShortenerError::Decode(_) => ErrorKind::Decode,
            ShortenerError::MalformedEvent(_) => ErrorKind::MalformedEvent,
            ShortenerError::Offload(e) => e.kind(),
        }
    }
}

/// Errors from decoding the inbound request body
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid JSON in body")]
    InvalidJson(String),

    #[error("Missing body")]
    MissingBody,

    #[error("Event body must be a JSON object")]
    NotAnObject,
}

/// Errors from inspecting or rewriting a decoded event
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("field {field} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("resources[{index}] must be a string")]
    InvalidResource { index: usize },

    #[error("event could not be serialized: {0}")]
    Unserializable(String),
}

/// Errors from the blob storage collaborator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid storage request: {0}")]
    InvalidRequest(String),

    #[error("Storage error: {0}")]
    Other(String),
}

/// Errors from the offload path
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OffloadError {
    #[error("write of {bucket}/{key} failed: {source}")]
    StorageWrite {
        bucket: String,
        key: String,
        source: StorageError,
    },

    #[error("presign of {bucket}/{key} failed: {source}")]
    HandlePresign {
        bucket: String,
        key: String,
        source: StorageError,
    },
}

impl OffloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OffloadError::StorageWrite { .. } => ErrorKind::StorageWrite,
            OffloadError::HandlePresign { .. } => ErrorKind::HandlePresign,
        }
    }
}

/// Errors from the metrics sink
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetricsError {
    #[error("Metrics sink rejected sample: {0}")]
    Rejected(String),

    #[error("Metrics serialization error: {0}")]
    Serialization(String),
}

impl MetricsError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MetricsEmit
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
