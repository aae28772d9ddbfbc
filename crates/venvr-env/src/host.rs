//! Host environment builder: the Python side of the environment.
//!
//! venvr does not reimplement venv. It drives a [`HostBuilder`] and plugs its
//! R steps into the host lifecycle through [`LifecycleHooks`]:
//!
//! ```text
//! ensure dirs -> write pyvenv.cfg -> [after_configuration] -> python + scripts -> [after_setup]
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::context::EnvContext;
use crate::error::{BuildError, Result};
use crate::options::{HostOptions, LinkStrategy};

/// Extension points invoked by the host during `create`.
pub trait LifecycleHooks {
    /// The host has written its configuration file.
    fn after_configuration(&mut self, ctx: &mut EnvContext) -> Result<()>;
    /// The host has finished its own setup, activate script included.
    fn after_setup(&mut self, ctx: &mut EnvContext) -> Result<()>;
}

pub trait HostBuilder {
    /// Layout for `env_dir` computed without touching disk.
    fn context(&self, env_dir: &Path, options: &HostOptions) -> EnvContext {
        let mut ctx = EnvContext::for_layout(env_dir, options.prompt.as_deref());
        ctx.system_site_packages = options.system_site_packages;
        ctx
    }

    /// Run the full host lifecycle, calling `hooks` at their boundaries.
    fn create(
        &self,
        env_dir: &Path,
        options: &HostOptions,
        hooks: &mut dyn LifecycleHooks,
    ) -> Result<EnvContext>;

    /// Resolve the host's own template placeholders.
    fn replace_variables(&self, text: &str, ctx: &EnvContext) -> String {
        if !text.contains("__VENV_") {
            return text.to_string();
        }
        text.replace("__VENV_DIR__", &ctx.env_dir.to_string_lossy())
            .replace("__VENV_NAME__", &ctx.env_name)
            .replace("__VENV_PROMPT__", &format!("({}) ", ctx.prompt))
            .replace("__VENV_BIN_NAME__", &ctx.bin_name)
            .replace("__VENV_PYTHON__", &ctx.python_exe.to_string_lossy())
    }
}

/// Host backed by `python -m venv`.
#[derive(Debug, Clone)]
pub struct PythonVenvHost {
    python: PathBuf,
}

impl PythonVenvHost {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// Use `command` if given, otherwise `python3` / `python` from `PATH`.
    /// Falls back to bare `python3`; a missing interpreter surfaces when venv runs.
    pub fn from_config(command: Option<&str>) -> Self {
        if let Some(c) = command {
            return Self::new(c);
        }
        ["python3", "python"]
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(Self::new)
            .unwrap_or_else(|| Self::new("python3"))
    }

    /// `-m venv ...` argument list mirroring `options`.
    pub fn venv_args(env_dir: &Path, options: &HostOptions) -> Vec<String> {
        let mut args = vec!["-m".to_string(), "venv".to_string()];
        if options.system_site_packages {
            args.push("--system-site-packages".to_string());
        }
        if options.clear {
            args.push("--clear".to_string());
        }
        if options.upgrade {
            args.push("--upgrade".to_string());
        }
        args.push(match options.link {
            LinkStrategy::Symlink => "--symlinks".to_string(),
            LinkStrategy::Copy => "--copies".to_string(),
        });
        if !options.with_pip {
            args.push("--without-pip".to_string());
        }
        if let Some(ref prompt) = options.prompt {
            args.push("--prompt".to_string());
            args.push(prompt.clone());
        }
        args.push(env_dir.to_string_lossy().to_string());
        args
    }
}

impl HostBuilder for PythonVenvHost {
    fn create(
        &self,
        env_dir: &Path,
        options: &HostOptions,
        hooks: &mut dyn LifecycleHooks,
    ) -> Result<EnvContext> {
        let args = Self::venv_args(env_dir, options);
        tracing::debug!(python = %self.python.display(), ?args, "Running venv");
        let out = Command::new(&self.python)
            .args(&args)
            .output()
            .map_err(|e| BuildError::io("Run venv with", &self.python, e))?;
        if !out.status.success() {
            return Err(BuildError::HostBuilder(format!(
                "venv failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        // venv is a single process: both hooks fire once it has exited.
        let mut ctx = self.context(env_dir, options);
        hooks.after_configuration(&mut ctx)?;
        hooks.after_setup(&mut ctx)?;
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoHost;

    impl HostBuilder for NoHost {
        fn create(&self, _: &Path, _: &HostOptions, _: &mut dyn LifecycleHooks) -> Result<EnvContext> {
            Err(BuildError::HostBuilder("unused".to_string()))
        }
    }

    #[test]
    fn test_venv_args_defaults() {
        let opts = HostOptions {
            link: LinkStrategy::Symlink,
            ..HostOptions::default()
        };
        let args = PythonVenvHost::venv_args(Path::new("/envs/proj"), &opts);
        assert_eq!(args, ["-m", "venv", "--symlinks", "/envs/proj"]);
    }

    #[test]
    fn test_venv_args_all_flags() {
        let opts = HostOptions {
            system_site_packages: true,
            clear: true,
            link: LinkStrategy::Copy,
            upgrade: true,
            with_pip: false,
            prompt: Some("stats".to_string()),
        };
        let args = PythonVenvHost::venv_args(Path::new("/envs/proj"), &opts);
        assert_eq!(
            args,
            [
                "-m",
                "venv",
                "--system-site-packages",
                "--clear",
                "--upgrade",
                "--copies",
                "--without-pip",
                "--prompt",
                "stats",
                "/envs/proj"
            ]
        );
    }

    #[test]
    fn test_default_context_carries_python_site_flag() {
        let opts = HostOptions {
            system_site_packages: true,
            prompt: Some("p".to_string()),
            ..HostOptions::default()
        };
        let ctx = NoHost.context(Path::new("/envs/proj"), &opts);
        assert!(ctx.system_site_packages);
        assert!(!ctx.r_system_site_packages);
        assert_eq!(ctx.prompt, "p");
    }

    #[test]
    fn test_replace_host_variables() {
        let ctx = NoHost.context(Path::new("/envs/proj"), &HostOptions::default());
        let text = NoHost.replace_variables("__VENV_DIR__|__VENV_NAME__|__VENV_PROMPT__|__VENVR_R_HOME__", &ctx);
        assert_eq!(text, "/envs/proj|proj|(proj) |__VENVR_R_HOME__");
    }

    #[test]
    fn test_create_reports_spawn_failure() {
        struct Unused;
        impl LifecycleHooks for Unused {
            fn after_configuration(&mut self, _: &mut EnvContext) -> Result<()> {
                unreachable!()
            }
            fn after_setup(&mut self, _: &mut EnvContext) -> Result<()> {
                unreachable!()
            }
        }
        let tmp = tempfile::tempdir().unwrap();
        let host = PythonVenvHost::new(tmp.path().join("no-python"));
        let err = host
            .create(&tmp.path().join("env"), &HostOptions::default(), &mut Unused)
            .unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
        assert!(!tmp.path().join("env").exists());
    }
}
