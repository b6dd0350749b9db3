use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;

use crate::{BlobError, BlobResult, ObjectGeneration, ObjectStore, PutResult};

#[derive(Debug, Clone)]
struct StoredObject {
    generation: u64,
    updated: String,
    body: Bytes,
}

#[derive(Debug, Default)]
struct MemBucket {
    location: String,
    versioning: bool,
    objects: HashMap<String, Vec<StoredObject>>,
}

/// In-process object store. Generations are strictly increasing across
/// the whole store, like the microsecond generations of real buckets.
#[derive(Debug)]
pub struct MemoryStore {
    buckets: RwLock<HashMap<String, MemBucket>>,
    next_generation: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            next_generation: AtomicU64::new(1_700_000_000_000_001),
        }
    }

    pub fn versioning_enabled(&self, bucket: &str) -> Option<bool> {
        self.buckets.read().get(bucket).map(|b| b.versioning)
    }

    pub fn bucket_location(&self, bucket: &str) -> Option<String> {
        self.buckets.read().get(bucket).map(|b| b.location.clone())
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.read().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn create_bucket(&self, bucket: &str, location: &str) -> BlobResult<()> {
        let mut buckets = self.buckets.write();
        if buckets.contains_key(bucket) {
            return Err(BlobError::BucketExists {
                bucket: bucket.to_string(),
            });
        }
        buckets.insert(
            bucket.to_string(),
            MemBucket {
                location: location.to_string(),
                versioning: true,
                objects: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn enable_versioning(&self, bucket: &str) -> BlobResult<()> {
        let mut buckets = self.buckets.write();
        let entry = buckets
            .get_mut(bucket)
            .ok_or_else(|| BlobError::BucketNotFound {
                bucket: bucket.to_string(),
            })?;
        entry.versioning = true;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        _content_type: &str,
        body: Bytes,
    ) -> BlobResult<PutResult> {
        let mut buckets = self.buckets.write();
        let entry = buckets
            .get_mut(bucket)
            .ok_or_else(|| BlobError::BucketNotFound {
                bucket: bucket.to_string(),
            })?;

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let stored = StoredObject {
            generation,
            updated: Utc::now().to_rfc3339(),
            body,
        };
        let history = entry.objects.entry(key.to_string()).or_default();
        if !entry.versioning {
            history.clear();
        }
        history.push(stored);

        Ok(PutResult {
            generation: Some(generation.to_string()),
        })
    }

    async fn list_generations(
        &self,
        bucket: &str,
        key: &str,
    ) -> BlobResult<Vec<ObjectGeneration>> {
        let buckets = self.buckets.read();
        let entry = buckets.get(bucket).ok_or_else(|| BlobError::BucketNotFound {
            bucket: bucket.to_string(),
        })?;

        Ok(entry
            .objects
            .get(key)
            .map(|history| {
                history
                    .iter()
                    .map(|obj| ObjectGeneration {
                        name: key.to_string(),
                        generation: obj.generation.to_string(),
                        updated: obj.updated.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_generation(&self, bucket: &str, key: &str, generation: &str) -> BlobResult<Bytes> {
        let buckets = self.buckets.read();
        let not_found = || BlobError::NotFound {
            key: key.to_string(),
            generation: generation.to_string(),
        };
        let entry = buckets.get(bucket).ok_or_else(|| BlobError::BucketNotFound {
            bucket: bucket.to_string(),
        })?;
        let wanted: u64 = generation.parse().map_err(|_| not_found())?;

        entry
            .objects
            .get(key)
            .and_then(|history| history.iter().find(|obj| obj.generation == wanted))
            .map(|obj| obj.body.clone())
            .ok_or_else(not_found)
    }
}
