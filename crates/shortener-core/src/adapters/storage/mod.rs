//! Blob storage adapters

mod memory;
#[cfg(feature = "s3")]
mod s3;

pub use memory::{InMemoryBlobStore, StoredObject};
#[cfg(feature = "s3")]
pub use s3::S3BlobStore;
