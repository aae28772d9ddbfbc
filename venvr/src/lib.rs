//! venvr CLI library: argument parsing and command dispatch.

pub mod cli;
pub mod commands;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

/// Run the CLI: parse args and build every requested environment.
pub fn run_cli() -> Result<()> {
    venvr_core::observability::init_tracing();
    let cli = Cli::parse();
    commands::create::cmd_create(&cli)
}
