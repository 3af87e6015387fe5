use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::error::StorageError;
use crate::ports::{BlobStore, PresignMethod};

/// Object held by [`InMemoryBlobStore`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// In-memory blob store for tests and local runs.
///
/// Presigned handles take the form `memory://{bucket}/{key}?expires_in={secs}`.
/// Failures can be injected per operation to exercise the offload error paths.
#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    puts: AtomicUsize,
    presigns: AtomicUsize,
    put_failure: Mutex<Option<StorageError>>,
    presign_failure: Mutex<Option<StorageError>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent `put` fails with `error`.
    pub fn fail_puts_with(&self, error: StorageError) {
        *self.put_failure.lock() = Some(error);
    }

    /// Every subsequent `presign` fails with `error`.
    pub fn fail_presigns_with(&self, error: StorageError) {
        *self.presign_failure.lock() = Some(error);
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.object(bucket, key).map(|o| o.body)
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of `put` calls, failed ones included
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of `presign` calls, failed ones included
    pub fn presign_count(&self) -> usize {
        self.presigns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.put_failure.lock().clone() {
            return Err(error);
        }

        self.objects.write().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn presign(
        &self,
        bucket: &str,
        key: &str,
        method: PresignMethod,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        self.presigns.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.presign_failure.lock().clone() {
            return Err(error);
        }

        match method {
            PresignMethod::Get => {
                if self.object(bucket, key).is_none() {
                    return Err(StorageError::InvalidRequest(format!(
                        "no object at {bucket}/{key}"
                    )));
                }
            }
        }

        Ok(format!(
            "memory://{bucket}/{key}?expires_in={}",
            expires_in.as_secs()
        ))
    }
}
