//! File-backed registry of published uploads.
//!
//! The registry is a single JSON document (`{"entries": [...]}`) mirrored in
//! memory. Every successful [`Registry::append`] rewrites the whole document
//! through a temporary sibling file that is fsynced and renamed over the
//! original, so a crash mid-write never leaves a truncated registry behind.
//!
//! One writer per data file is assumed; there is no cross-process locking.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use crate::{Expiry, ShareError, ShareResult, UploadRecord};

const DATA_DIR: &str = ".data";
const DATA_FILE: &str = ".dogshare.data.json";

#[derive(Deserialize)]
struct StoredDocument {
    #[serde(default)]
    entries: Option<Vec<UploadRecord>>,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    entries: &'a [UploadRecord],
}

/// Upload records, in insertion order, backed by one JSON file.
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    entries: Vec<UploadRecord>,
}

impl Registry {
    /// Open the registry stored next to the running executable
    /// (`<exe dir>/.data/.dogshare.data.json`).
    pub async fn initialize(prune_after: Expiry) -> ShareResult<Self> {
        let exe = std::env::current_exe()?;
        let base = exe.parent().unwrap_or_else(|| Path::new("."));
        Self::open(base.join(DATA_DIR).join(DATA_FILE), prune_after).await
    }

    /// Open (creating if absent) the registry at `path`, load it and drop
    /// records older than `prune_after`.
    ///
    /// Pruned records disappear from memory only; the file keeps them until
    /// the next write.
    pub async fn open<P: Into<PathBuf>>(path: P, prune_after: Expiry) -> ShareResult<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_private_dir(dir).await?;
        }

        let mut registry = Self {
            path,
            entries: Vec::new(),
        };
        registry.load().await?;

        let pruned = registry.prune(prune_after);
        if pruned > 0 {
            info!(pruned, expiry = %prune_after, "pruned expired registry entries");
        }

        Ok(registry)
    }

    /// Replace the in-memory records with the document on disk.
    pub async fn load(&mut self) -> ShareResult<()> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        let mut file = open_private(&mut options, &self.path).await?;

        let mut content = String::new();
        file.read_to_string(&mut content).await?;

        self.entries = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str::<Option<StoredDocument>>(&content)
                .map_err(|source| ShareError::Corruption { source })?
                .and_then(|doc| doc.entries)
                .unwrap_or_default()
        };

        debug!(path = %self.path.display(), entries = self.entries.len(), "loaded registry");
        Ok(())
    }

    /// Write the in-memory records to disk.
    pub async fn save(&self) -> ShareResult<()> {
        self.write_document(&self.entries).await
    }

    /// Drop every record older than `expiry`, returning how many were removed.
    pub fn prune(&mut self, expiry: Expiry) -> usize {
        if expiry.is_never() {
            return 0;
        }
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|e| !expiry.is_elapsed(e.timestamp, now));
        before - self.entries.len()
    }

    /// Validate, number, timestamp and persist a record.
    ///
    /// The record becomes visible in [`Registry::read_all`] only once the
    /// document containing it is durably on disk.
    pub async fn append(&mut self, mut record: UploadRecord) -> ShareResult<UploadRecord> {
        record.validate()?;

        record.id = self.next_id();
        record.timestamp = Utc::now();

        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.extend_from_slice(&self.entries);
        next.push(record.clone());

        self.write_document(&next).await?;
        self.entries = next;

        debug!(id = record.id, "appended registry entry");
        Ok(record)
    }

    /// All records in insertion order.
    pub fn read_all(&self) -> &[UploadRecord] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn next_id(&self) -> u64 {
        self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }

    async fn write_document(&self, entries: &[UploadRecord]) -> ShareResult<()> {
        let body = serde_json::to_vec_pretty(&DocumentRef { entries })
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let tmp = self.temp_path();
        if let Err(err) = write_synced(&tmp, &body).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            sync_dir(dir).await;
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DATA_FILE.to_string());
        self.path.with_file_name(format!("{name}.tmp"))
    }
}

async fn write_synced(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    let mut file = open_private(&mut options, path).await?;
    file.write_all(body).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;
    file.sync_all().await
}

async fn open_private(options: &mut OpenOptions, path: &Path) -> std::io::Result<fs::File> {
    #[cfg(unix)]
    options.mode(0o600);
    options.open(path).await
}

async fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);
    builder.create(dir).await
}

/// Persist the rename itself. Not every filesystem supports fsync on a
/// directory handle, so failures are only logged.
async fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    {
        let result = match fs::File::open(dir).await {
            Ok(handle) => handle.sync_all().await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            debug!(dir = %dir.display(), error = %e, "directory fsync skipped");
        }
    }
    #[cfg(not(unix))]
    let _ = dir;
}
