//! Per-run log directories.

use crate::error::{Error, Result};
use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Timestamp layout of a run directory, e.g. `20240131_235959`.
pub const RUN_DIR_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Create `<log_root>/<now>` and return its path.
///
/// Two calls within the same second share one directory.
pub fn prepare_log_dir(log_root: &Path) -> Result<PathBuf> {
    prepare_log_dir_at(log_root, &Local::now())
}

/// Create the run directory for `timestamp` under `log_root`.
pub fn prepare_log_dir_at<Tz>(log_root: &Path, timestamp: &DateTime<Tz>) -> Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let dir = run_log_dir_at(log_root, timestamp);
    ensure_dir_exists(&dir)?;
    debug!("log directory {}", dir.display());
    Ok(dir)
}

/// Path of the run directory for the current second, without creating it.
pub fn run_log_dir(log_root: &Path) -> PathBuf {
    run_log_dir_at(log_root, &Local::now())
}

pub fn run_log_dir_at<Tz>(log_root: &Path, timestamp: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    log_root.join(timestamp.format(RUN_DIR_FORMAT).to_string())
}

pub fn ensure_dir_exists(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| Error::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
