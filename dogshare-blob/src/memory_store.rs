use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use dogshare_core::{ShareError, ShareResult};

use crate::store::object_url;
use crate::{ObjectStore, PutResult};

/// An object held by [`MemoryObjectStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct StoredBucket {
    region: String,
    policy: Option<String>,
    objects: HashMap<String, StoredObject>,
}

#[derive(Debug, Default)]
struct MemoryState {
    buckets: HashMap<String, StoredBucket>,
    create_calls: usize,
}

/// In-process object store for tests and offline runs.
///
/// URLs point at a fake endpoint and presigned links carry a placeholder
/// signature, so they only make sense inside this process.
#[derive(Clone)]
pub struct MemoryObjectStore {
    state: Arc<RwLock<MemoryState>>,
    endpoint: String,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::with_endpoint("http://memory.local")
    }

    pub fn with_endpoint<S: Into<String>>(endpoint: S) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    /// Pre-create a bucket, as if another process had provisioned it
    pub fn insert_bucket(&self, bucket: &str, region: &str) {
        self.state.write().buckets.insert(
            bucket.to_string(),
            StoredBucket {
                region: region.to_string(),
                ..Default::default()
            },
        );
    }

    pub fn bucket_region(&self, bucket: &str) -> Option<String> {
        self.state.read().buckets.get(bucket).map(|b| b.region.clone())
    }

    pub fn policy(&self, bucket: &str) -> Option<String> {
        self.state.read().buckets.get(bucket).and_then(|b| b.policy.clone())
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.state
            .read()
            .buckets
            .get(bucket)
            .and_then(|b| b.objects.get(key).cloned())
    }

    pub fn object_count(&self, bucket: &str) -> usize {
        self.state.read().buckets.get(bucket).map_or(0, |b| b.objects.len())
    }

    /// How many times `create_bucket` actually created something
    pub fn create_calls(&self) -> usize {
        self.state.read().create_calls
    }

    fn missing_bucket(bucket: &str) -> ShareError {
        ShareError::upload(format!("bucket '{bucket}' does not exist"))
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> ShareResult<bool> {
        Ok(self.state.read().buckets.contains_key(bucket))
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> ShareResult<()> {
        let mut state = self.state.write();
        if state.buckets.contains_key(bucket) {
            return Ok(());
        }
        state.buckets.insert(
            bucket.to_string(),
            StoredBucket {
                region: region.to_string(),
                ..Default::default()
            },
        );
        state.create_calls += 1;
        Ok(())
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> ShareResult<()> {
        let mut state = self.state.write();
        let stored = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| ShareError::provision(bucket, "bucket does not exist"))?;
        stored.policy = Some(policy.to_string());
        Ok(())
    }

    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> ShareResult<PutResult> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ShareError::file_access(path.display().to_string(), e))?;
        let size_bytes = bytes.len() as u64;

        let mut state = self.state.write();
        let stored = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        stored.objects.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );

        Ok(PutResult {
            key: key.to_string(),
            etag: None,
            size_bytes,
        })
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> ShareResult<String> {
        if expires_in.is_zero() || expires_in > self.max_presign_duration() {
            return Err(ShareError::validation(format!(
                "invalid presign duration: {}s",
                expires_in.as_secs()
            )));
        }
        if !self.state.read().buckets.contains_key(bucket) {
            return Err(Self::missing_bucket(bucket));
        }
        Ok(format!(
            "{}?X-Amz-Expires={}&X-Amz-Signature=memory",
            object_url(&self.endpoint, bucket, key),
            expires_in.as_secs()
        ))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        object_url(&self.endpoint, bucket, key)
    }
}
