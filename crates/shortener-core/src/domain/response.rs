//! Request-level result returned to the caller

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, ShortenerError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenerResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl ShortenerResponse {
    pub fn ok(truncated: bool, size: usize, retrieval_url: Option<String>) -> Self {
        Self {
            status_code: 200,
            truncated: Some(truncated),
            size: Some(size),
            retrieval_url,
            message: None,
            error_kind: None,
        }
    }

    pub fn from_error(error: &ShortenerError) -> Self {
        let kind = error.kind();
        match error {
            // Decode failures keep the bare `{statusCode, message}` shape.
            ShortenerError::Decode(e) => Self::failure(400, e.to_string(), None),
            ShortenerError::MalformedEvent(_) => {
                Self::failure(400, error.to_string(), Some(kind))
            }
            ShortenerError::Offload(_) => Self::failure(
                502,
                "Failed to offload event data".to_string(),
                Some(kind),
            ),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    fn failure(status_code: u16, message: String, kind: Option<ErrorKind>) -> Self {
        Self {
            status_code,
            truncated: None,
            size: None,
            retrieval_url: None,
            message: Some(message),
            error_kind: kind.map(|k| k.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, EventError, OffloadError, StorageError};
    use serde_json::json;

    #[test]
    fn test_ok_shape_without_url() {
        let value = serde_json::to_value(ShortenerResponse::ok(false, 120, None)).unwrap();
        assert_eq!(
            value,
            json!({"statusCode": 200, "truncated": false, "size": 120})
        );
    }

    #[test]
    fn test_ok_shape_with_url() {
        let response = ShortenerResponse::ok(true, 400, Some("https://x".into()));
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["retrievalUrl"], json!("https://x"));
        assert_eq!(value["truncated"], json!(true));
    }

    #[test]
    fn test_decode_failure_shape() {
        let err = ShortenerError::from(DecodeError::InvalidJson("x".into()));
        let value = serde_json::to_value(ShortenerResponse::from_error(&err)).unwrap();
        assert_eq!(
            value,
            json!({"statusCode": 400, "message": "Invalid JSON in body"})
        );
    }

    #[test]
    fn test_malformed_event_shape() {
        let err = ShortenerError::from(EventError::MissingField("source"));
        let response = ShortenerResponse::from_error(&err);
        assert_eq!(response.status_code, 400);
        assert_eq!(response.error_kind.as_deref(), Some("malformed_event"));
        assert!(response.message.unwrap().contains("source"));
    }

    #[test]
    fn test_offload_failure_shape() {
        let err = ShortenerError::from(OffloadError::HandlePresign {
            bucket: "b".into(),
            key: "k".into(),
            source: StorageError::AccessDenied("denied".into()),
        });
        let response = ShortenerResponse::from_error(&err);
        assert_eq!(response.status_code, 502);
        assert_eq!(response.error_kind.as_deref(), Some("handle_presign"));
        assert!(response.retrieval_url.is_none());
        assert!(!response.is_success());
    }
}
