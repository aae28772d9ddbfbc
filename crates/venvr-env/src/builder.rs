//! Environment orchestrator: create a Python/R environment or convert an
//! existing Python venv in place.
//!
//! Both protocols share the R steps through an explicit [`EnvContext`]:
//!
//! - **create**: the host runs its whole lifecycle; the R configuration and
//!   post-setup steps run as [`LifecycleHooks`].
//! - **convert**: the host lifecycle is skipped; the context is derived from
//!   the existing `pyvenv.cfg` and the same R steps run directly.
//!
//! Steps only move forward. A failure leaves whatever was already written;
//! there is no rollback and no resume. Building the same directory from two
//! processes at once is unsupported (no locking).

use std::path::Path;

use crate::activate::{self, Substitutions, R_ACTIVATE_TEMPLATE};
use crate::cfg;
use crate::context::{self, EnvContext};
use crate::error::{BuildError, Result};
use crate::host::{HostBuilder, LifecycleHooks};
use crate::install;
use crate::locator::RuntimeLocator;
use crate::options::{BuildOptions, HostOptions};
use crate::provision;

/// Forward-only build progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildState {
    Uninitialized,
    DirectoriesEnsured,
    Configured,
    RuntimeInstalled,
    ScriptsComposed,
    Done,
}

#[derive(Debug)]
struct Progress {
    state: BuildState,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: BuildState::Uninitialized,
        }
    }

    fn advance(&mut self, next: BuildState) {
        debug_assert!(next > self.state, "{:?} -> {:?}", self.state, next);
        tracing::debug!(from = ?self.state, to = ?next, "Build state");
        self.state = next;
    }
}

/// R steps plugged into the host lifecycle.
struct RSteps<'a, H: ?Sized, L: ?Sized> {
    host: &'a H,
    locator: &'a L,
    options: &'a BuildOptions,
    progress: Progress,
}

impl<H: HostBuilder + ?Sized, L: RuntimeLocator + ?Sized> LifecycleHooks for RSteps<'_, H, L> {
    fn after_configuration(&mut self, ctx: &mut EnvContext) -> Result<()> {
        self.progress.advance(BuildState::DirectoriesEnsured);
        configure(ctx, self.locator, self.options)?;
        self.progress.advance(BuildState::Configured);
        Ok(())
    }

    fn after_setup(&mut self, ctx: &mut EnvContext) -> Result<()> {
        post_setup(ctx, self.host, self.options, &mut self.progress)
    }
}

/// Discover R (once per build) and append its lines to `pyvenv.cfg`.
fn configure<L: RuntimeLocator + ?Sized>(
    ctx: &mut EnvContext,
    locator: &L,
    options: &BuildOptions,
) -> Result<()> {
    ctx.r_system_site_packages = options.r_system_site_packages;
    let r = match ctx.r.take() {
        Some(r) => r,
        None => locator.locate()?,
    };
    tracing::info!(r_home = %r.home.display(), r_version = %r.version, "Found R");
    cfg::append_r_config(&ctx.cfg_path, &r, ctx.r_system_site_packages)?;
    ctx.r = Some(r);
    Ok(())
}

/// Library dir, executables, activate script.
fn post_setup<H: HostBuilder + ?Sized>(
    ctx: &mut EnvContext,
    host: &H,
    options: &BuildOptions,
    progress: &mut Progress,
) -> Result<()> {
    let Some(r) = ctx.r.clone() else {
        return Err(BuildError::HostBuilder(
            "post-setup ran before configuration".to_string(),
        ));
    };

    let lib_path = provision::ensure_library_dir(&ctx.lib_root(), &r.version.major_minor())?;
    ctx.r_lib_path = Some(lib_path);
    install::install_executables(&r.executables(), &ctx.bin_path, options.host.link)?;
    progress.advance(BuildState::RuntimeInstalled);

    let Some(subs) = Substitutions::from_context(ctx) else {
        return Err(BuildError::HostBuilder("R descriptor missing".to_string()));
    };
    let template = host.replace_variables(R_ACTIVATE_TEMPLATE, ctx);
    activate::compose_activate_script(&ctx.activate_script(), &template, &subs)?;
    progress.advance(BuildState::ScriptsComposed);
    Ok(())
}

/// Create a fresh Python/R environment in `env_dir`.
pub fn create_new<H, L>(host: &H, locator: &L, options: &BuildOptions, env_dir: &Path) -> Result<EnvContext>
where
    H: HostBuilder + ?Sized,
    L: RuntimeLocator + ?Sized,
{
    let env_dir = context::absolute(env_dir).map_err(|e| BuildError::io("Resolve", env_dir, e))?;
    tracing::info!(
        env_dir = %env_dir.display(),
        venvr_version = %options.tool_version,
        "Creating Python/R environment"
    );
    let mut steps = RSteps {
        host,
        locator,
        options,
        progress: Progress::new(),
    };
    let ctx = host.create(&env_dir, &options.host, &mut steps)?;
    steps.progress.advance(BuildState::Done);
    tracing::info!(env_dir = %ctx.env_dir.display(), "Environment ready");
    Ok(ctx)
}

/// Turn the existing Python venv at `env_dir` into a Python/R one.
///
/// Python files are left alone; nothing is written unless `pyvenv.cfg` and
/// the activate script are present and the venv has no R yet.
pub fn convert_existing<H, L>(host: &H, locator: &L, options: &BuildOptions, env_dir: &Path) -> Result<EnvContext>
where
    H: HostBuilder + ?Sized,
    L: RuntimeLocator + ?Sized,
{
    let env_dir = context::absolute(env_dir).map_err(|e| BuildError::io("Resolve", env_dir, e))?;
    tracing::info!(
        env_dir = %env_dir.display(),
        venvr_version = %options.tool_version,
        "Converting Python venv"
    );
    let cfg_path = env_dir.join(context::CFG_FILE_NAME);
    if !cfg_path.is_file() {
        return Err(BuildError::NotAnEnvironment { path: env_dir });
    }
    let entries = cfg::read_config(&cfg_path)?;
    if cfg::config_value(&entries, cfg::KEY_R_HOME).is_some() {
        return Err(BuildError::AlreadyConverted { path: env_dir });
    }

    let host_options = HostOptions {
        prompt: options.host.prompt.clone().or_else(|| {
            cfg::config_value(&entries, "prompt").map(|p| p.trim_matches(['\'', '"']).to_string())
        }),
        system_site_packages: cfg::config_value(&entries, "include-system-site-packages")
            == Some("true"),
        ..options.host.clone()
    };
    let mut ctx = host.context(&env_dir, &host_options);
    ctx.cfg_path = cfg_path;
    if !ctx.activate_script().is_file() {
        return Err(BuildError::NotAnEnvironment {
            path: ctx.activate_script(),
        });
    }

    let mut progress = Progress::new();
    progress.advance(BuildState::DirectoriesEnsured);
    configure(&mut ctx, locator, options)?;
    progress.advance(BuildState::Configured);
    post_setup(&mut ctx, host, options, &mut progress)?;
    progress.advance(BuildState::Done);
    tracing::info!(env_dir = %ctx.env_dir.display(), "Environment converted");
    Ok(ctx)
}

/// Builder bound to one host, one locator and one validated option set.
pub struct EnvBuilder<H, L> {
    host: H,
    locator: L,
    options: BuildOptions,
}

impl<H: HostBuilder, L: RuntimeLocator> EnvBuilder<H, L> {
    /// Fails with [`BuildError::ArgumentConflict`] before any filesystem access.
    pub fn new(host: H, locator: L, options: BuildOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            host,
            locator,
            options,
        })
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Create or convert, depending on `options.convert`.
    pub fn create(&self, env_dir: &Path) -> Result<EnvContext> {
        if self.options.convert {
            convert_existing(&self.host, &self.locator, &self.options, env_dir)
        } else {
            create_new(&self.host, &self.locator, &self.options, env_dir)
        }
    }
}
