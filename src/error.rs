//! Error types shared by the driver and executor helpers.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors raised while resolving paths, preparing directories, or running commands.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not resolve the directory of the running executable")]
    ResolvePaths(#[source] std::io::Error),

    #[error("failed to create directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to execute command: {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{command}` failed with {status}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("script not found: {}", path.display())]
    MissingScript { path: PathBuf },

    #[error("missing working directory argument")]
    MissingWorkDir,

    #[error("failed to read config file {}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}", path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Pattern(#[from] regex::Error),

    #[error("failed to list {}", path.display())]
    ReadArtifacts {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
