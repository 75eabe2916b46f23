use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use dogshare_core::ShareResult;

/// Bucket-level storage primitives the gateway is built on.
///
/// Implementations report remote failures as `ShareError::Upload` (object
/// and signing calls) or `ShareError::Provision` (bucket calls).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check whether a bucket exists
    async fn bucket_exists(&self, bucket: &str) -> ShareResult<bool>;

    /// Create a bucket in `region` with object locking disabled
    async fn create_bucket(&self, bucket: &str, region: &str) -> ShareResult<()>;

    /// Replace the bucket's access policy document
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> ShareResult<()>;

    /// Stream a local file into `bucket` under `key`
    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> ShareResult<PutResult>;

    /// Presigned GET URL for an object, valid for `expires_in`
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> ShareResult<String>;

    /// Direct, unsigned URL of an object
    fn public_url(&self, bucket: &str, key: &str) -> String;

    /// Longest lifetime `presign_get` accepts
    fn max_presign_duration(&self) -> Duration {
        MAX_PRESIGN_DURATION
    }
}

/// SigV4 presigned URLs cannot outlive seven days
pub const MAX_PRESIGN_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Path-style object URL `{base}/{bucket}/{key}`.
///
/// Both segments are percent-encoded; keys keep the uploaded file's
/// extension, which may contain `#`, `?` or spaces.
pub(crate) fn object_url(base: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(bucket),
        urlencoding::encode(key)
    )
}

/// Result of a successful put
#[derive(Debug, Clone)]
pub struct PutResult {
    pub key: String,
    pub etag: Option<String>,
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_url_encodes_reserved_characters() {
        assert_eq!(
            object_url("http://s3.local:9000/", "media-public", "ab.v#2 x?y"),
            "http://s3.local:9000/media-public/ab.v%232%20x%3Fy"
        );
        assert_eq!(
            object_url("http://s3.local:9000", "media-public", "ab-c_d.png"),
            "http://s3.local:9000/media-public/ab-c_d.png"
        );
    }
}
