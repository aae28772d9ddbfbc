//! Per-build environment context.
//!
//! One `EnvContext` is created for each target directory and dropped when
//! that build returns. It is never shared between builds.

use std::path::{Path, PathBuf};

use crate::locator::RDescriptor;

/// Name of the venv configuration file at the environment root.
pub const CFG_FILE_NAME: &str = "pyvenv.cfg";

/// Name of the POSIX activation script inside the bin directory.
pub const ACTIVATE_SCRIPT_NAME: &str = "activate";

/// `bin` / `Scripts` depending on platform.
pub fn bin_dir_name() -> &'static str {
    if cfg!(windows) {
        "Scripts"
    } else {
        "bin"
    }
}

/// `lib` / `Lib` depending on platform.
pub fn lib_dir_name() -> &'static str {
    if cfg!(windows) {
        "Lib"
    } else {
        "lib"
    }
}

fn python_exe_name() -> &'static str {
    if cfg!(windows) {
        "python.exe"
    } else {
        "python"
    }
}

#[derive(Debug, Clone)]
pub struct EnvContext {
    /// Absolute environment root.
    pub env_dir: PathBuf,
    pub env_name: String,
    pub prompt: String,
    pub bin_name: String,
    pub bin_path: PathBuf,
    pub lib_name: String,
    pub cfg_path: PathBuf,
    /// Python inside the environment.
    pub python_exe: PathBuf,
    pub system_site_packages: bool,
    pub r_system_site_packages: bool,
    /// Filled in by the locator during the configuration step.
    pub r: Option<RDescriptor>,
    /// Filled in by the directory provisioner.
    pub r_lib_path: Option<PathBuf>,
}

impl EnvContext {
    /// Compute the standard venv layout for `env_dir` without touching disk.
    pub fn for_layout(env_dir: &Path, prompt: Option<&str>) -> Self {
        let env_name = env_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let prompt = match prompt {
            Some(".") => std::env::current_dir()
                .ok()
                .and_then(|d| d.file_name().map(|n| n.to_string_lossy().to_string()))
                .unwrap_or_else(|| env_name.clone()),
            Some(p) => p.to_string(),
            None => env_name.clone(),
        };
        let bin_path = env_dir.join(bin_dir_name());
        Self {
            env_dir: env_dir.to_path_buf(),
            env_name,
            prompt,
            bin_name: bin_dir_name().to_string(),
            python_exe: bin_path.join(python_exe_name()),
            bin_path,
            lib_name: lib_dir_name().to_string(),
            cfg_path: env_dir.join(CFG_FILE_NAME),
            system_site_packages: false,
            r_system_site_packages: false,
            r: None,
            r_lib_path: None,
        }
    }

    pub fn activate_script(&self) -> PathBuf {
        self.bin_path.join(ACTIVATE_SCRIPT_NAME)
    }

    pub fn lib_root(&self) -> PathBuf {
        self.env_dir.join(&self.lib_name)
    }
}

/// Make `path` absolute against the current directory without resolving
/// symlinks.
pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
