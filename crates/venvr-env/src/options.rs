//! Validated build options shared by the host builder and the R steps.

use crate::error::{BuildError, Result};

/// How executables are placed into the environment's bin directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStrategy {
    Symlink,
    Copy,
}

impl LinkStrategy {
    /// Symlinks everywhere except Windows.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::Copy
        } else {
            Self::Symlink
        }
    }

    pub fn from_symlinks(symlinks: bool) -> Self {
        if symlinks {
            Self::Symlink
        } else {
            Self::Copy
        }
    }
}

/// Which runtimes see their system-wide packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiteScope {
    #[default]
    None,
    Python,
    R,
    Both,
}

impl SiteScope {
    pub fn includes_python(self) -> bool {
        matches!(self, Self::Python | Self::Both)
    }

    pub fn includes_r(self) -> bool {
        matches!(self, Self::R | Self::Both)
    }
}

/// Options forwarded to the Python host builder.
#[derive(Debug, Clone)]
pub struct HostOptions {
    pub system_site_packages: bool,
    pub clear: bool,
    pub link: LinkStrategy,
    pub upgrade: bool,
    pub with_pip: bool,
    pub prompt: Option<String>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            system_site_packages: false,
            clear: false,
            link: LinkStrategy::platform_default(),
            upgrade: false,
            with_pip: true,
            prompt: None,
        }
    }
}

/// Everything one `venvr` invocation needs to build its target directories.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub host: HostOptions,
    /// Convert an existing Python venv in place instead of creating one.
    pub convert: bool,
    pub r_system_site_packages: bool,
    /// venvr's own version, resolved once at startup.
    pub tool_version: String,
}

impl BuildOptions {
    pub fn new(scope: SiteScope, tool_version: impl Into<String>) -> Self {
        Self {
            host: HostOptions {
                system_site_packages: scope.includes_python(),
                ..HostOptions::default()
            },
            r_system_site_packages: scope.includes_r(),
            tool_version: tool_version.into(),
            ..Self::default()
        }
    }

    /// Reject mutually exclusive combinations before anything touches disk.
    pub fn validate(&self) -> Result<()> {
        if self.convert && self.host.clear {
            return Err(clear_conflict("convert-to-venvr"));
        }
        if self.host.upgrade && self.host.clear {
            return Err(clear_conflict("upgrade"));
        }
        Ok(())
    }
}

fn clear_conflict(flag: &str) -> BuildError {
    BuildError::ArgumentConflict(format!(
        "you cannot supply --{} and --clear together.",
        flag
    ))
}
