//! S3 blob store
//!
//! Writes offloaded payloads with `PutObject` and issues presigned `GetObject`
//! URLs. Presigning is computed locally and makes no network call.
//!
//! `SdkError` variants are classified as:
//! - `ServiceError`: by S3 error code
//! - `TimeoutError`, `DispatchFailure`: `Unavailable`
//! - `ConstructionFailure`: `InvalidRequest`
//! - `ResponseError` and anything else: `Other`

use std::fmt::{Debug, Display};
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::error::StorageError;
use crate::ports::{BlobStore, PresignMethod};

#[derive(Clone, Debug)]
pub struct S3BlobStore {
    client: Client,
}

impl S3BlobStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the default provider chain, pinned to `region`
    /// when given.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        debug!(bucket, key, size, "put object");
        Ok(())
    }

    async fn presign(
        &self,
        bucket: &str,
        key: &str,
        method: PresignMethod,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::InvalidRequest(e.to_string()))?;

        let request = match method {
            PresignMethod::Get => self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .presigned(config)
                .await
                .map_err(|e| classify_sdk_error(&e))?,
        };

        Ok(request.uri().to_string())
    }
}

fn classify_sdk_error<E, R>(err: &SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + Display + Debug,
    R: Debug,
{
    match err {
        SdkError::ServiceError(service_err) => {
            let inner = service_err.err();
            classify_service_code(inner.code(), inner.to_string())
        }
        SdkError::TimeoutError(_) => {
            StorageError::Unavailable("storage operation timed out".to_string())
        }
        SdkError::DispatchFailure(e) => {
            StorageError::Unavailable(format!("dispatch failure: {e:?}"))
        }
        SdkError::ConstructionFailure(e) => {
            StorageError::InvalidRequest(format!("construction failure: {e:?}"))
        }
        SdkError::ResponseError(e) => StorageError::Other(format!("response error: {e:?}")),
        _ => StorageError::Other(format!("{err:?}")),
    }
}

fn classify_service_code(code: Option<&str>, message: String) -> StorageError {
    match code.unwrap_or("Unknown") {
        "AccessDenied" | "AllAccessDisabled" | "InvalidAccessKeyId" | "SignatureDoesNotMatch"
        | "ExpiredToken" => StorageError::AccessDenied(message),
        "NoSuchBucket" | "InvalidBucketName" | "InvalidArgument" | "EntityTooLarge"
        | "KeyTooLongError" => StorageError::InvalidRequest(message),
        "SlowDown" | "ServiceUnavailable" | "InternalError" | "RequestTimeout" => {
            StorageError::Unavailable(message)
        }
        _ => StorageError::Other(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{Credentials, Region as ConfigRegion};

    fn offline_store() -> S3BlobStore {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(ConfigRegion::new("us-east-1"))
            .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
            .build();
        S3BlobStore::new(Client::from_conf(config))
    }

    #[tokio::test]
    async fn test_presign_get_is_local() {
        let store = offline_store();
        let url = store
            .presign(
                "events-bucket",
                "2024/1/2/id.json",
                PresignMethod::Get,
                Duration::from_secs(900),
            )
            .await
            .unwrap();

        assert!(url.starts_with("https://"));
        assert!(url.contains("events-bucket"));
        assert!(url.contains("2024/1/2/id.json"));
        assert!(url.contains("X-Amz-Expires=900"));
    }

    #[tokio::test]
    async fn test_presign_rejects_long_expiry() {
        let store = offline_store();
        let err = store
            .presign(
                "b",
                "k",
                PresignMethod::Get,
                Duration::from_secs(8 * 24 * 3600),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidRequest(_)));
    }

    #[test]
    fn test_service_code_classification() {
        assert!(matches!(
            classify_service_code(Some("AccessDenied"), "x".into()),
            StorageError::AccessDenied(_)
        ));
        assert!(matches!(
            classify_service_code(Some("NoSuchBucket"), "x".into()),
            StorageError::InvalidRequest(_)
        ));
        assert!(matches!(
            classify_service_code(Some("SlowDown"), "x".into()),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            classify_service_code(None, "x".into()),
            StorageError::Other(_)
        ));
    }
}
