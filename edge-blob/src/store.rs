use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::BlobResult;

/// Bucket and object operations a storage backend must provide.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create a bucket with object versioning enabled.
    ///
    /// Fails with [`crate::BlobError::BucketExists`] when the name is taken.
    async fn create_bucket(&self, bucket: &str, location: &str) -> BlobResult<()>;

    /// Turn on object versioning for an existing bucket.
    async fn enable_versioning(&self, bucket: &str) -> BlobResult<()>;

    /// Upload an object. On a versioned bucket this adds a new generation.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> BlobResult<PutResult>;

    /// Every stored generation of `key`, live and noncurrent, in backend order.
    async fn list_generations(&self, bucket: &str, key: &str)
        -> BlobResult<Vec<ObjectGeneration>>;

    /// Body of one specific generation.
    async fn get_generation(&self, bucket: &str, key: &str, generation: &str) -> BlobResult<Bytes>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutResult {
    pub generation: Option<String>,
}

/// Version metadata for one object generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectGeneration {
    pub name: String,
    pub generation: String,
    pub updated: String,
}
