use thiserror::Error;

/// Result type for dogshare operations
pub type ShareResult<T> = Result<T, ShareError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised along the publishing pipeline.
///
/// Each variant names the stage that failed. Remote causes are kept as the
/// error source so callers can walk the chain.
#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Bucket provisioning failed for '{bucket}': {source}")]
    Provision {
        bucket: String,
        #[source]
        source: BoxError,
    },

    #[error("Cannot access file '{path}': {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot classify '{path}': {reason}")]
    Classification { path: String, reason: String },

    #[error("Buckets are not provisioned, run setup first")]
    NotProvisioned,

    #[error("Upload failed: {source}")]
    Upload {
        #[source]
        source: BoxError,
    },

    #[error("Shortening failed: {reason}")]
    Shorten {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Invalid request: {message}")]
    Validation { message: String },

    #[error("Registry storage error: {source}")]
    Storage {
        #[from]
        source: std::io::Error,
    },

    #[error("Registry file is corrupt: {source}")]
    Corruption {
        #[source]
        source: serde_json::Error,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl ShareError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a provisioning error for the given bucket
    pub fn provision<B, E>(bucket: B, error: E) -> Self
    where
        B: Into<String>,
        E: Into<BoxError>,
    {
        Self::Provision {
            bucket: bucket.into(),
            source: error.into(),
        }
    }

    pub fn file_access<P: Into<String>>(path: P, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    pub fn classification<P: Into<String>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Classification {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an upload error from any error type
    pub fn upload<E: Into<BoxError>>(error: E) -> Self {
        Self::Upload {
            source: error.into(),
        }
    }

    /// Create a shortening error without an underlying cause
    pub fn shorten<S: Into<String>>(reason: S) -> Self {
        Self::Shorten {
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a shortening error wrapping a transport or decode failure
    pub fn shorten_with<S, E>(reason: S, error: E) -> Self
    where
        S: Into<String>,
        E: Into<BoxError>,
    {
        Self::Shorten {
            reason: reason.into(),
            source: Some(error.into()),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True when the error was caused by an external interrupt
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
