use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BlobError, BlobResult, ObjectGeneration, ObjectStore, PutResult};

pub const NO_DESCRIPTION: &str = "No description provided";

/// One historical snapshot of a service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingVersion {
    pub generation: String,
    pub updated: String,
    pub description: String,
}

/// The only part of a stored document the version list needs.
#[derive(Deserialize)]
struct SnapshotHeader {
    #[serde(default)]
    description: Option<String>,
}

impl SnapshotHeader {
    /// Snapshots are JSON objects; arrays and scalars are malformed.
    fn parse(body: &[u8]) -> Result<Self, String> {
        match serde_json::from_slice::<Value>(body).map_err(|e| e.to_string())? {
            document @ Value::Object(_) => {
                serde_json::from_value(document).map_err(|e| e.to_string())
            }
            _ => Err("snapshot is not a JSON object".to_string()),
        }
    }
}

/// Configuration history backed by object versioning.
///
/// Each service id maps to a single object `{service_id}.json`; every
/// upload becomes a new generation and generations are the only version
/// identifiers.
pub struct VersionStore {
    store: Arc<dyn ObjectStore>,
    skipped: AtomicU64,
}

impl VersionStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            skipped: AtomicU64::new(0),
        }
    }

    pub fn object_key(service_id: &str) -> String {
        format!("{service_id}.json")
    }

    /// Generations dropped from listings because they could not be read.
    pub fn skipped_versions(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Create the bucket with versioning on, or switch versioning on if
    /// the bucket already exists. Safe to call repeatedly.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_bucket(&self, bucket: &str, region: &str) -> BlobResult<()> {
        match self.store.create_bucket(bucket, region).await {
            Ok(()) => {
                tracing::info!(bucket, region, "bucket created");
                Ok(())
            }
            Err(BlobError::BucketExists { .. }) => {
                tracing::debug!(bucket, "bucket exists, enabling versioning");
                self.store.enable_versioning(bucket).await
            }
            Err(err) => Err(err),
        }
    }

    #[tracing::instrument(skip(self, document))]
    pub async fn put_version<D>(
        &self,
        bucket: &str,
        service_id: &str,
        document: &D,
    ) -> BlobResult<PutResult>
    where
        D: Serialize + ?Sized + Sync,
    {
        let body = serde_json::to_vec_pretty(document)?;
        self.store
            .put_object(
                bucket,
                &Self::object_key(service_id),
                "application/json",
                Bytes::from(body),
            )
            .await
    }

    /// Upload an auxiliary text object next to the snapshots.
    pub async fn put_text(&self, bucket: &str, key: &str, text: String) -> BlobResult<PutResult> {
        self.store
            .put_object(bucket, key, "text/plain", Bytes::from(text))
            .await
    }

    /// All readable generations, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_versions(
        &self,
        bucket: &str,
        service_id: &str,
    ) -> BlobResult<Vec<StagingVersion>> {
        let key = Self::object_key(service_id);
        let generations = self.store.list_generations(bucket, &key).await?;

        let reads = generations
            .into_iter()
            .map(|meta| self.read_version(bucket, &key, meta));
        let mut versions: Vec<(u64, StagingVersion)> =
            join_all(reads).await.into_iter().flatten().collect();

        versions.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(versions.into_iter().map(|(_, v)| v).collect())
    }

    async fn read_version(
        &self,
        bucket: &str,
        key: &str,
        meta: ObjectGeneration,
    ) -> Option<(u64, StagingVersion)> {
        let order = match meta.generation.parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                self.skip(key, &meta.generation, "generation is not numeric");
                return None;
            }
        };

        let body = match self.store.get_generation(bucket, key, &meta.generation).await {
            Ok(body) => body,
            Err(err) => {
                self.skip(key, &meta.generation, &err.to_string());
                return None;
            }
        };

        let header = match SnapshotHeader::parse(&body) {
            Ok(header) => header,
            Err(reason) => {
                self.skip(key, &meta.generation, &reason);
                return None;
            }
        };

        Some((
            order,
            StagingVersion {
                generation: meta.generation,
                updated: meta.updated,
                description: header
                    .description
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            },
        ))
    }

    fn skip(&self, key: &str, generation: &str, reason: &str) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(key, generation, reason, "skipping unreadable staging version");
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_version<D>(
        &self,
        bucket: &str,
        service_id: &str,
        generation: &str,
    ) -> BlobResult<D>
    where
        D: DeserializeOwned,
    {
        let body = self
            .store
            .get_generation(bucket, &Self::object_key(service_id), generation)
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
