use async_trait::async_trait;
use std::path::Path;

use crate::{Expiry, ShareResult, Visibility};

/// Something that can put a local file somewhere reachable and hand back a URL.
#[async_trait]
pub trait ObjectPublisher: Send + Sync {
    /// Upload `path` and return its access URL.
    ///
    /// Public uploads return a permanent URL; private uploads return a
    /// presigned URL valid for `expiry`.
    async fn upload(
        &self,
        path: &Path,
        visibility: Visibility,
        expiry: Expiry,
    ) -> ShareResult<String>;
}

/// A remote link shortener.
#[async_trait]
pub trait LinkShortener: Send + Sync {
    /// Turn `long_url` into a short URL labelled with `title`.
    async fn shorten(&self, long_url: &str, title: &str) -> ShareResult<String>;
}
