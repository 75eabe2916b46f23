use std::fmt;
use url::Url;

use dogshare_core::{ShareError, ShareResult};

/// Validated object store endpoint: explicit http/https scheme and a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Parse and validate an endpoint. Never touches the network.
    pub fn parse(raw: &str) -> ShareResult<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|e| ShareError::config(format!("invalid endpoint url '{raw}': {e}")))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ShareError::config(format!(
                "endpoint scheme must be 'http://' or 'https://', got '{}://'",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ShareError::config(format!("endpoint '{raw}' is missing a host")));
        }

        Ok(Self { url })
    }

    /// The endpoint without a trailing slash, e.g. `https://minio.example.com:9000`
    pub fn as_str(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for an S3-compatible store
#[derive(Clone)]
pub struct StoreConfig {
    pub endpoint: Endpoint,
    pub access_key: String,
    pub secret_key: String,

    /// Region used to sign requests
    pub region: String,

    /// Address buckets as `{endpoint}/{bucket}` instead of `{bucket}.{host}`.
    /// MinIO and most self-hosted stores need this.
    pub force_path_style: bool,
}

impl StoreConfig {
    pub const DEFAULT_REGION: &'static str = "us-east-1";

    /// Validate the endpoint and build a config with default region and path-style addressing
    pub fn new<A, S>(endpoint: &str, access_key: A, secret_key: S) -> ShareResult<Self>
    where
        A: Into<String>,
        S: Into<String>,
    {
        Ok(Self {
            endpoint: Endpoint::parse(endpoint)?,
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: Self::DEFAULT_REGION.to_string(),
            force_path_style: true,
        })
    }

    /// Set the signing region
    pub fn with_region<R: Into<String>>(mut self, region: R) -> Self {
        self.region = region.into();
        self
    }

    /// Use virtual-hosted bucket addressing
    pub fn virtual_hosted(mut self) -> Self {
        self.force_path_style = false;
        self
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        let plain = Endpoint::parse("http://localhost:9000").unwrap();
        assert_eq!(plain.as_str(), "http://localhost:9000");
        assert!(!plain.is_secure());

        let tls = Endpoint::parse("https://minio.example.com/").unwrap();
        assert_eq!(tls.as_str(), "https://minio.example.com");
        assert_eq!(tls.host(), "minio.example.com");
        assert!(tls.is_secure());
    }

    #[test]
    fn rejects_other_schemes_and_missing_hosts() {
        for raw in ["ftp://x", "localhost:9000", "minio.example.com", "http://", ""] {
            let err = Endpoint::parse(raw).unwrap_err();
            assert!(matches!(err, ShareError::Config { .. }), "{raw} should be a config error");
        }
    }

    #[test]
    fn debug_hides_secret() {
        let config = StoreConfig::new("http://localhost:9000", "minio", "s3cr3t").unwrap();
        assert!(!format!("{config:?}").contains("s3cr3t"));
    }
}
