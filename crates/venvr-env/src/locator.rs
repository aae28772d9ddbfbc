//! R discovery: ask R itself where it lives and which version it is.
//!
//! The builder only sees the [`RuntimeLocator`] trait; [`RCommandLocator`]
//! is the real implementation backed by `R RHOME` and `Rscript`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::DiscoveryError;

/// Expression printing `major.minor` (R's minor already carries the patch).
const VERSION_EXPR: &str = r#"cat(R.version$major, R.version$minor, sep=".")"#;

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

/// R version as reported by R, split on dots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RVersion(Vec<String>);

impl RVersion {
    /// Accepts `major.minor.rest`, e.g. `4.3.1`.
    pub fn parse(raw: &str) -> Result<Self, DiscoveryError> {
        let re = VERSION_RE.get_or_init(|| Regex::new(r"^\d+\.\d+\..+").expect("version regex"));
        let trimmed = raw.trim();
        if !re.is_match(trimmed) {
            return Err(DiscoveryError::InvalidVersion(raw.to_string()));
        }
        Ok(Self(trimmed.split('.').map(String::from).collect()))
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// `4.3` for `4.3.1`.
    pub fn major_minor(&self) -> String {
        self.0[..2].join(".")
    }
}

impl fmt::Display for RVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Immutable record of one discovered R installation.
///
/// Only constructed when both executables exist and the version is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RDescriptor {
    pub home: PathBuf,
    pub r_exec: PathBuf,
    pub rscript_exec: PathBuf,
    pub version: RVersion,
}

impl RDescriptor {
    pub fn executables(&self) -> [&Path; 2] {
        [&self.r_exec, &self.rscript_exec]
    }
}

/// Extension point for discovering the secondary runtime.
pub trait RuntimeLocator {
    /// Discover R. Failure is fatal for the build; there are no retries.
    fn locate(&self) -> Result<RDescriptor, DiscoveryError>;
}

/// Locates R by running `R RHOME` and `Rscript --vanilla -e ...`.
#[derive(Debug, Clone, Default)]
pub struct RCommandLocator {
    /// `None` searches `PATH` for `R` on every `locate`.
    r_command: Option<PathBuf>,
}

impl RCommandLocator {
    pub fn new(r_command: impl Into<PathBuf>) -> Self {
        Self {
            r_command: Some(r_command.into()),
        }
    }

    pub fn from_config(command: Option<&str>) -> Self {
        Self {
            r_command: command.map(PathBuf::from),
        }
    }

    fn r_command(&self) -> Result<PathBuf, DiscoveryError> {
        match self.r_command {
            Some(ref c) => Ok(c.clone()),
            None => which::which("R").map_err(|_| DiscoveryError::NotOnPath),
        }
    }
}

impl RuntimeLocator for RCommandLocator {
    fn locate(&self) -> Result<RDescriptor, DiscoveryError> {
        let r_command = self.r_command()?;
        let home = run_capture(Command::new(&r_command).arg("RHOME"))?;
        let home = PathBuf::from(home.trim_end_matches(['\n', '\r']));
        tracing::debug!(r_home = %home.display(), "Resolved R_HOME");

        let bin = r_bin_dir(&home, cfg!(windows) && cfg!(target_pointer_width = "64"));
        let r_exec = bin.join(exe_name("R"));
        let rscript_exec = bin.join(exe_name("Rscript"));
        if !(r_exec.exists() && rscript_exec.exists()) {
            return Err(DiscoveryError::MissingExecutables(bin));
        }

        let raw = run_capture(
            Command::new(&rscript_exec)
                .arg("--vanilla")
                .arg("-e")
                .arg(VERSION_EXPR),
        )?;
        let version = RVersion::parse(&raw)?;
        tracing::debug!(version = %version, "Resolved R version");

        Ok(RDescriptor {
            home,
            r_exec,
            rscript_exec,
            version,
        })
    }
}

/// Executables live in `<home>/bin`, or `<home>/bin/x64` for 64-bit Windows builds.
pub fn r_bin_dir(home: &Path, windows_64: bool) -> PathBuf {
    let bin = home.join("bin");
    if windows_64 {
        bin.join("x64")
    } else {
        bin
    }
}

fn exe_name(stem: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", stem)
    } else {
        stem.to_string()
    }
}

fn run_capture(cmd: &mut Command) -> Result<String, DiscoveryError> {
    let command = format!("{:?}", cmd);
    let out = cmd.output().map_err(|source| DiscoveryError::Spawn {
        command: command.clone(),
        source,
    })?;
    if !out.status.success() {
        return Err(DiscoveryError::CommandFailed {
            command,
            status: out.status.to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
}
