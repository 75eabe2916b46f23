//! Tracing setup for the `dogshare` binary.
//!
//! Development runs log human-readable output to stderr. Everything else goes
//! as JSON lines into a timestamped file under `<exe dir>/logs`, which a
//! background task keeps trimmed to the last week.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

/// Set to `true` for console logging at debug level
pub const DEVELOPMENT_VAR: &str = "DOGSHARE_DEVELOPMENT";

pub const LOG_DIR: &str = "logs";

/// Log files older than this are removed on startup
pub const LOG_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Where log output ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Console,
    File(PathBuf),
}

pub fn is_development() -> bool {
    std::env::var(DEVELOPMENT_VAR)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Directory holding the JSON log files, next to the executable
pub fn log_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    let base = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(base.join(LOG_DIR))
}

pub fn log_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("dogshare_{}.log.json", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Install the global subscriber. `RUST_LOG` overrides the default level.
pub fn init(development: bool, dir: &Path) -> Result<LogTarget> {
    if development {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install console logger: {e}"))?;
        return Ok(LogTarget::Console);
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    let path = dir.join(log_file_name(chrono::Local::now()));
    let file = File::create(&path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install file logger: {e}"))?;

    Ok(LogTarget::File(path))
}

/// Spawn the log cleanup. It never fails the caller: errors are logged and
/// the task stops early when `cancel` fires.
pub fn spawn_log_cleanup(
    dir: PathBuf,
    max_age: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => debug!("log cleanup cancelled"),
            result = prune_logs(&dir, max_age) => match result {
                Ok(0) => {}
                Ok(removed) => debug!(removed, dir = %dir.display(), "removed old log files"),
                Err(e) => error!(error = %e, dir = %dir.display(), "log cleanup failed"),
            },
        }
    })
}

/// Wait for the cleanup task. A panic or abort inside it is logged, not raised.
pub async fn join_log_cleanup(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, panicked = e.is_panic(), "log cleanup task did not finish");
            false
        }
    }
}

/// Delete regular files in `dir` last modified at least `max_age` ago.
/// Subdirectories are left alone. Returns how many files were removed.
pub async fn prune_logs(dir: &Path, max_age: Duration) -> io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let now = SystemTime::now();
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            warn!(path = %path.display(), "skipping directory in log folder");
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        let modified = entry.metadata().await?.modified()?;
        let age = now.duration_since(modified).unwrap_or_default();
        if age >= max_age {
            tokio::fs::remove_file(&path).await?;
            removed += 1;
        }
    }
    Ok(removed)
}
