//! `venvr [options] ENV_DIR...`
//!
//! Directories are built one at a time, in argument order. A failure is
//! reported and the remaining directories are still attempted.

use std::path::{Path, PathBuf};

use anyhow::Result;
use venvr_core::config::RuntimeConfig;
use venvr_env::{BuildError, EnvBuilder, HostBuilder, PythonVenvHost, RCommandLocator, RuntimeLocator};

use crate::cli::Cli;

/// Per-directory results of one invocation.
#[derive(Debug, Default)]
pub struct Outcome {
    pub built: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, BuildError)>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Build every directory with `builder`, continuing past failures.
pub fn build_all<H, L>(builder: &EnvBuilder<H, L>, dirs: &[PathBuf]) -> Outcome
where
    H: HostBuilder,
    L: RuntimeLocator,
{
    let mut outcome = Outcome::default();
    for dir in dirs {
        match builder.create(dir) {
            Ok(ctx) => {
                tracing::info!(
                    env_dir = %ctx.env_dir.display(),
                    r_lib = ?ctx.r_lib_path,
                    convert = builder.options().convert,
                    "Environment ready"
                );
                outcome.built.push(dir.clone());
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                tracing::debug!(env_dir = %dir.display(), error = ?e, "Build failed");
                outcome.failed.push((dir.clone(), e));
            }
        }
    }
    outcome
}

/// Entry point for the CLI.
pub fn cmd_create(cli: &Cli) -> Result<()> {
    let options = cli.build_options(env!("CARGO_PKG_VERSION"));
    let runtime = RuntimeConfig::from_env();
    let host = PythonVenvHost::from_config(runtime.python.as_deref());
    let locator = RCommandLocator::from_config(runtime.r_command.as_deref());

    // Option conflicts surface here, before any directory is touched.
    let builder = EnvBuilder::new(host, locator, options)?;

    let outcome = build_all(&builder, &cli.dirs);
    if !outcome.is_success() {
        anyhow::bail!(
            "{} of {} environment(s) failed: {}",
            outcome.failed.len(),
            cli.dirs.len(),
            join_paths(outcome.failed.iter().map(|(p, _)| p.as_path()))
        );
    }
    Ok(())
}

fn join_paths<'a>(paths: impl Iterator<Item = &'a Path>) -> String {
    paths
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
