use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as AwsByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use dogshare_core::{ShareError, ShareResult};

use crate::store::object_url;
use crate::{Endpoint, ObjectStore, PutResult, StoreConfig};

/// Region in which S3 rejects an explicit location constraint
const DEFAULT_S3_REGION: &str = "us-east-1";

/// S3-compatible store (MinIO, RustFS, AWS) backed by the AWS SDK
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    endpoint: Endpoint,
    path_style: bool,
}

impl S3ObjectStore {
    /// Build a client for `config`. No request is sent until the store is used.
    pub async fn connect(config: StoreConfig) -> Self {
        let client = Self::create_client(&config).await;
        debug!(endpoint = %config.endpoint, region = %config.region, "created s3 client");
        Self {
            client,
            endpoint: config.endpoint,
            path_style: config.force_path_style,
        }
    }

    async fn create_client(config: &StoreConfig) -> Client {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "dogshare",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(config.endpoint.as_str())
            .load()
            .await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(config.force_path_style)
                .build(),
        )
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> ShareResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(err))
                if err.err().is_not_found() || err.raw().status().as_u16() == 404 =>
            {
                Ok(false)
            }
            Err(e) => Err(ShareError::provision(bucket, e)),
        }
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> ShareResult<()> {
        // object locking would stop us from ever deleting uploads
        let mut request = self
            .client
            .create_bucket()
            .bucket(bucket)
            .object_lock_enabled_for_bucket(false);

        if region != DEFAULT_S3_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(SdkError::ServiceError(err)) if err.err().is_bucket_already_owned_by_you() => {
                Ok(())
            }
            Err(e) => Err(ShareError::provision(bucket, e)),
        }
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> ShareResult<()> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|e| ShareError::provision(bucket, e))?;
        Ok(())
    }

    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> ShareResult<PutResult> {
        let display = path.display().to_string();
        let size_bytes = tokio::fs::metadata(path)
            .await
            .map_err(|e| ShareError::file_access(&display, e))?
            .len();
        let body = AwsByteStream::from_path(path)
            .await
            .map_err(|e| ShareError::file_access(&display, std::io::Error::other(e)))?;

        let result = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .content_length(size_bytes as i64)
            .body(body)
            .send()
            .await
            .map_err(ShareError::upload)?;

        Ok(PutResult {
            key: key.to_string(),
            etag: result.e_tag,
            size_bytes,
        })
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> ShareResult<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| ShareError::validation(format!("invalid presign duration: {e}")))?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(ShareError::upload)?;

        Ok(request.uri().to_string())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        let path_style = object_url(self.endpoint.as_str(), bucket, key);
        if self.path_style {
            return path_style;
        }
        let mut url = self.endpoint.url().clone();
        let host = format!("{}.{}", bucket, self.endpoint.host());
        // IP literals cannot carry a bucket subdomain
        if url.set_host(Some(&host)).is_err() {
            return path_style;
        }
        url.set_path(&format!("/{}", urlencoding::encode(key)));
        url.to_string()
    }
}
