//! Filesystem layout relative to the running executable.

use crate::error::{Error, Result};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the log directory under the base directory.
pub const LOG_DIR_NAME: &str = "logs";

/// Directories derived from the location of the running executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub script_dir: PathBuf,
    pub base_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Paths {
    /// Build the layout rooted at `script_dir`.
    pub fn from_script_dir(script_dir: impl Into<PathBuf>) -> Self {
        let script_dir = script_dir.into();
        let base_dir = script_dir.clone();
        let log_dir = base_dir.join(LOG_DIR_NAME);
        Self {
            script_dir,
            base_dir,
            log_dir,
        }
    }

    /// Resolve the layout from the canonical location of the current executable.
    pub fn resolve() -> Result<Self> {
        let exe = std::env::current_exe()
            .and_then(|p| p.canonicalize())
            .map_err(Error::ResolvePaths)?;
        let script_dir = exe.parent().map(Path::to_path_buf).ok_or_else(|| {
            Error::ResolvePaths(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} has no parent directory", exe.display()),
            ))
        })?;

        debug!("resolved script directory {}", script_dir.display());
        Ok(Self::from_script_dir(script_dir))
    }

    /// Build directory name for a CMake build type, e.g. `cmake-build-release`.
    pub fn build_dir(&self, kind: &str) -> String {
        format!("cmake-build-{}", kind)
    }

    pub fn abs_build_dir(&self, kind: &str) -> PathBuf {
        self.base_dir.join(self.build_dir(kind))
    }
}

/// Resolves [`Paths`] on first use and hands out the same record afterwards.
///
/// Construct one at process start and pass it by reference to whatever needs paths.
#[derive(Debug, Default)]
pub struct PathResolver {
    cell: OnceCell<Paths>,
}

impl PathResolver {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// A resolver whose record is already known.
    pub fn with_paths(paths: Paths) -> Self {
        Self {
            cell: OnceCell::from(paths),
        }
    }

    /// Get the cached paths, resolving them on the first call.
    pub fn paths(&self) -> Result<&Paths> {
        if let Some(paths) = self.cell.get() {
            return Ok(paths);
        }
        let paths = Paths::resolve()?;
        Ok(self.cell.get_or_init(|| paths))
    }
}
