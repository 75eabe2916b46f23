use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    Expiry, LinkShortener, ObjectPublisher, Registry, ShareError, ShareResult, UploadRecord,
    Visibility,
};

/// Settings applied to every publish
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Title attached to every short link
    pub title: String,

    /// Lifetime of presigned links for private uploads
    pub link_expiry: Expiry,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            title: "shortened using dogshare".to_string(),
            link_expiry: Expiry::default(),
        }
    }
}

impl PublishOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_link_expiry(mut self, expiry: Expiry) -> Self {
        self.link_expiry = expiry;
        self
    }
}

/// Runs the upload → shorten → record pipeline.
///
/// The publisher owns the registry; every mutation goes through it.
/// A failing stage aborts the pipeline. Work already done remotely is not
/// rolled back, only reported in the logs.
pub struct Publisher {
    objects: Arc<dyn ObjectPublisher>,
    shortener: Arc<dyn LinkShortener>,
    registry: Registry,
    options: PublishOptions,
}

impl Publisher {
    pub fn new(
        objects: Arc<dyn ObjectPublisher>,
        shortener: Arc<dyn LinkShortener>,
        registry: Registry,
        options: PublishOptions,
    ) -> Self {
        Self {
            objects,
            shortener,
            registry,
            options,
        }
    }

    /// Upload `path` with the given policy (`"public"` or `"private"`),
    /// shorten the resulting link and record both.
    pub async fn publish(
        &mut self,
        path: &Path,
        policy: &str,
        cancel: &CancellationToken,
    ) -> ShareResult<UploadRecord> {
        let visibility: Visibility = policy.parse()?;
        tokio::fs::metadata(path)
            .await
            .map_err(|e| ShareError::file_access(path.display().to_string(), e))?;

        debug!(path = %path.display(), %visibility, "publishing file");

        let expiry = self.options.link_expiry;
        let object_link = guarded(cancel, self.objects.upload(path, visibility, expiry)).await?;
        info!(object_link = %object_link, "uploaded object");

        let shortened = self.shortener.shorten(&object_link, &self.options.title);
        let short_link = match guarded(cancel, shortened).await {
            Ok(link) => link,
            Err(err) => {
                warn!(
                    object_link = %object_link,
                    error = %err,
                    "object uploaded but not shortened, leaving it orphaned"
                );
                return Err(err);
            }
        };
        info!(short_link = %short_link, "shortened link");

        if cancel.is_cancelled() {
            warn!(
                object_link = %object_link,
                short_link = %short_link,
                "cancelled before recording upload"
            );
            return Err(ShareError::Cancelled);
        }

        let recorded_expiry = match visibility {
            Visibility::Public => Expiry::Never,
            Visibility::Private => expiry,
        };
        let record = UploadRecord::new(object_link, short_link, recorded_expiry);

        match self.registry.append(record.clone()).await {
            Ok(saved) => Ok(saved),
            Err(err) => {
                warn!(
                    object_link = %record.object_link,
                    short_link = %record.short_link,
                    error = %err,
                    "upload published but not recorded"
                );
                Err(err)
            }
        }
    }

    /// Every recorded upload, oldest first.
    pub fn list_all(&self) -> &[UploadRecord] {
        self.registry.read_all()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> &PublishOptions {
        &self.options
    }
}

/// Run one stage, giving up as soon as `cancel` fires.
async fn guarded<T, F>(cancel: &CancellationToken, stage: F) -> ShareResult<T>
where
    F: Future<Output = ShareResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ShareError::Cancelled),
        result = stage => result,
    }
}
