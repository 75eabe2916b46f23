use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use dogshare_core::{Expiry, ObjectPublisher, ShareError, ShareResult, Visibility};

use crate::{classify, ObjectStore, S3ObjectStore, StoreConfig};

/// The public and private bucket derived from one base name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPair {
    pub public: String,
    pub private: String,
}

impl BucketPair {
    pub fn from_base(base: &str) -> Self {
        Self {
            public: format!("{base}-public"),
            private: format!("{base}-private"),
        }
    }

    pub fn for_visibility(&self, visibility: Visibility) -> &str {
        match visibility {
            Visibility::Public => &self.public,
            Visibility::Private => &self.private,
        }
    }
}

/// Anonymous read access to every object in `bucket`
pub fn public_read_policy(bucket: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": "*",
                "Action": ["s3:GetObject"],
                "Resource": format!("arn:aws:s3:::{bucket}/*")
            }
        ]
    })
    .to_string()
}

/// Provisions the bucket pair and publishes files into it.
///
/// `setup` must succeed once before any upload; the bucket pair then stays
/// fixed for the lifetime of the gateway.
pub struct ObjectGateway {
    store: Arc<dyn ObjectStore>,
    buckets: Option<BucketPair>,
}

impl ObjectGateway {
    /// Validate the endpoint and build an S3 gateway. Sends nothing over the network.
    pub async fn connect(endpoint: &str, access_key: &str, secret: &str) -> ShareResult<Self> {
        let config = StoreConfig::new(endpoint, access_key, secret)?;
        Self::connect_with(config).await
    }

    pub async fn connect_with(config: StoreConfig) -> ShareResult<Self> {
        Ok(Self::new(S3ObjectStore::connect(config).await))
    }

    /// Wrap any store
    pub fn new<S: ObjectStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
            buckets: None,
        }
    }

    /// Create `{base}-public` and `{base}-private` if missing, then open the
    /// public one for anonymous reads. Safe to run against existing buckets.
    pub async fn setup(&mut self, base_bucket: &str, region: &str) -> ShareResult<()> {
        if base_bucket.is_empty() {
            return Err(ShareError::config("bucket base name cannot be empty"));
        }
        let pair = BucketPair::from_base(base_bucket);

        for bucket in [&pair.public, &pair.private] {
            if self.store.bucket_exists(bucket).await? {
                debug!(bucket = %bucket, "bucket already exists");
                continue;
            }
            self.store.create_bucket(bucket, region).await?;
            info!(bucket = %bucket, region = %region, "created bucket");
        }

        self.store
            .put_bucket_policy(&pair.public, &public_read_policy(&pair.public))
            .await?;
        debug!(bucket = %pair.public, "applied public read policy");

        self.buckets = Some(pair);
        Ok(())
    }

    pub fn buckets(&self) -> Option<&BucketPair> {
        self.buckets.as_ref()
    }

    /// Upload `path` to the public or private bucket and return its access URL.
    ///
    /// Private links are presigned for exactly `expiry`; a never-expiring
    /// private link cannot be presigned and is rejected before any upload.
    pub async fn upload(&self, path: &Path, public: bool, expiry: Expiry) -> ShareResult<String> {
        let buckets = self.buckets.as_ref().ok_or(ShareError::NotProvisioned)?;
        let visibility = if public {
            Visibility::Public
        } else {
            Visibility::Private
        };
        let bucket = buckets.for_visibility(visibility);

        let presign_for = match (visibility, expiry) {
            (Visibility::Public, _) => None,
            (Visibility::Private, Expiry::Never) => {
                return Err(ShareError::validation(
                    "private uploads need a finite link expiry, presigned links cannot be permanent",
                ));
            }
            (Visibility::Private, Expiry::After(d)) => {
                let max = self.store.max_presign_duration();
                if d.is_zero() || d > max {
                    return Err(ShareError::validation(format!(
                        "link expiry {expiry} must be between 1s and {}",
                        Expiry::After(max)
                    )));
                }
                Some(d)
            }
        };

        let classified = classify(path).await?;
        debug!(
            path = %path.display(),
            content_type = %classified.content_type,
            object = %classified.object_name,
            "classified file"
        );

        let put = self
            .store
            .put_file(bucket, &classified.object_name, path, &classified.content_type)
            .await?;
        info!(bucket = %bucket, object = %put.key, size = put.size_bytes, "uploaded object");

        match presign_for {
            None => Ok(self.store.public_url(bucket, &put.key)),
            Some(duration) => self.store.presign_get(bucket, &put.key, duration).await,
        }
    }
}

#[async_trait]
impl ObjectPublisher for ObjectGateway {
    async fn upload(
        &self,
        path: &Path,
        visibility: Visibility,
        expiry: Expiry,
    ) -> ShareResult<String> {
        ObjectGateway::upload(self, path, visibility.is_public(), expiry).await
    }
}
