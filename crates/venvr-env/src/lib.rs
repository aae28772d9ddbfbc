//! Integrated Python/R virtual environments.
//!
//! The Python half comes from a [`host::HostBuilder`] (`python -m venv`);
//! this crate adds R: discovery, the `lib/R<x.y>` library directory, the `R`
//! and `Rscript` executables, the `pyvenv.cfg` provenance lines and the merged
//! `activate` script.

pub mod activate;
pub mod builder;
pub mod cfg;
pub mod context;
pub mod error;
pub mod host;
pub mod install;
pub mod locator;
pub mod options;
pub mod provision;

pub use builder::{convert_existing, create_new, BuildState, EnvBuilder};
pub use context::EnvContext;
pub use error::{BuildError, DiscoveryError};
pub use host::{HostBuilder, LifecycleHooks, PythonVenvHost};
pub use locator::{RCommandLocator, RDescriptor, RVersion, RuntimeLocator};
pub use options::{BuildOptions, HostOptions, LinkStrategy, SiteScope};
