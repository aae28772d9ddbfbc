//! Error taxonomy for environment construction.
//!
//! Nothing here is recovered inside the builder: every variant aborts the
//! current target directory and is reported to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// R is missing or misconfigured. Always fatal.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Could not run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Could not find the R or Rscript executable in {}", .0.display())]
    MissingExecutables(PathBuf),

    #[error("Invalid R version: '{0}'")]
    InvalidVersion(String),

    #[error("R not found on PATH (set VENVR_R to the R executable)")]
    NotOnPath,
}

/// Errors returned by the environment builder.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Unable to create directory {}: a file or symlink is in the way", .path.display())]
    LayoutConflict { path: PathBuf },

    #[error("This doesn't look like a Python virtual env: {}", .path.display())]
    NotAnEnvironment { path: PathBuf },

    #[error("{0}")]
    ArgumentConflict(String),

    #[error("Environment is already a Python/R one: {}", .path.display())]
    AlreadyConverted { path: PathBuf },

    #[error("Host environment builder failed: {0}")]
    HostBuilder(String),

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;
