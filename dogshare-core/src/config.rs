//! # Configuration
//!
//! Configuration is a flat string key/value store filled from the
//! environment, then read into typed [`Settings`].
//!
//! Variables carrying the `DOGSHARE_` prefix are normalized by stripping the
//! prefix, lowercasing and turning `__` into `.`:
//!
//! ```rust
//! use dogshare_core::ConfigStore;
//!
//! let store = ConfigStore::from_vars(
//!     [("DOGSHARE_MINIO_REGION", "eu-west-1"), ("HOME", "/root")],
//!     "DOGSHARE_",
//! );
//! assert_eq!(store.get("minio_region"), Some("eu-west-1"));
//! assert!(!store.has("home"));
//! ```
//!
//! A `.dogshare.env` file next to the executable is loaded first when
//! present, so users do not have to export anything by hand.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::{Expiry, ShareError, ShareResult};

pub const ENV_PREFIX: &str = "DOGSHARE_";
pub const ENV_FILE: &str = ".dogshare.env";

#[derive(Debug, Default, Clone)]
pub struct ConfigStore {
    values: HashMap<String, String>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the prefixed entries of `vars`.
    pub fn from_vars<I, K, V>(vars: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut store = Self::new();
        for (key, value) in vars {
            if let Some(stripped) = key.as_ref().strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                store.set(normalized, value);
            }
        }
        store
    }

    /// Load `<exe dir>/.dogshare.env` if it exists, then read the process environment.
    pub fn from_env() -> Self {
        if let Some(dir) = std::env::current_exe().ok().as_deref().and_then(Path::parent) {
            // a missing env file is fine, variables may come from the shell
            let _ = dotenvy::from_path(dir.join(ENV_FILE));
        }
        Self::from_vars(std::env::vars(), ENV_PREFIX)
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn require(&self, key: &str) -> ShareResult<String> {
        match self.get(key) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(ShareError::config(format!(
                "{}{} is required",
                ENV_PREFIX,
                key.to_uppercase().replace('.', "__")
            ))),
        }
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    }
}

/// Typed settings for one run.
#[derive(Clone)]
pub struct Settings {
    pub minio_endpoint: String,
    pub minio_access_key: String,
    pub minio_access_secret: String,
    pub minio_bucket_name: String,
    pub minio_region: String,
    pub minio_link_expiry: Expiry,
    pub yourls_endpoint: String,
    pub yourls_signature: String,
    pub yourls_title: String,
}

impl Settings {
    pub const DEFAULT_BUCKET: &'static str = "dogshare";
    pub const DEFAULT_REGION: &'static str = "us-east-1";
    pub const DEFAULT_LINK_EXPIRY: &'static str = "168h";
    pub const DEFAULT_TITLE: &'static str = "shortened using dogshare";

    pub fn from_env() -> ShareResult<Self> {
        Self::from_store(&ConfigStore::from_env())
    }

    pub fn from_store(store: &ConfigStore) -> ShareResult<Self> {
        Ok(Self {
            minio_endpoint: store.require("minio_endpoint")?,
            minio_access_key: store.require("minio_access_key")?,
            minio_access_secret: store.require("minio_access_secret")?,
            minio_bucket_name: store.get_or("minio_bucket_name", Self::DEFAULT_BUCKET),
            minio_region: store.get_or("minio_region", Self::DEFAULT_REGION),
            minio_link_expiry: store
                .get_or("minio_link_expiry", Self::DEFAULT_LINK_EXPIRY)
                .parse()?,
            yourls_endpoint: store.require("yourls_endpoint")?,
            yourls_signature: store.require("yourls_signature")?,
            yourls_title: store.get_or("yourls_title", Self::DEFAULT_TITLE),
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("minio_endpoint", &self.minio_endpoint)
            .field("minio_access_key", &self.minio_access_key)
            .field("minio_access_secret", &"<redacted>")
            .field("minio_bucket_name", &self.minio_bucket_name)
            .field("minio_region", &self.minio_region)
            .field("minio_link_expiry", &self.minio_link_expiry)
            .field("yourls_endpoint", &self.yourls_endpoint)
            .field("yourls_signature", &"<redacted>")
            .field("yourls_title", &self.yourls_title)
            .finish()
    }
}
