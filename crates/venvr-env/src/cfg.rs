//! `pyvenv.cfg` handling: append the R provenance lines and read existing keys.
//!
//! The file is `key = value` per line. Python's venv writes its own keys
//! first; venvr only ever appends below them.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{BuildError, Result};
use crate::locator::RDescriptor;

pub const KEY_R_HOME: &str = "R-home";
pub const KEY_R_INCLUDE_SYSTEM_PACKAGES: &str = "R-include-system-packages";
pub const KEY_R_VERSION: &str = "R-version";

/// The three R lines, newline-terminated, in fixed order.
pub fn render_r_config(desc: &RDescriptor, include_system_packages: bool) -> String {
    format!(
        "{} = {}\n{} = {}\n{} = {}\n",
        KEY_R_HOME,
        desc.home.display(),
        KEY_R_INCLUDE_SYSTEM_PACKAGES,
        include_system_packages,
        KEY_R_VERSION,
        desc.version,
    )
}

/// Append the R lines to `cfg_path`, creating it if needed.
///
/// Existing content is never rewritten. If it lacks a trailing newline one is
/// added first so the appended lines stay intact.
pub fn append_r_config(cfg_path: &Path, desc: &RDescriptor, include_system_packages: bool) -> Result<()> {
    let io_err = |e: std::io::Error| BuildError::io("Write config", cfg_path, e);
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(cfg_path)
        .map_err(io_err)?;

    let len = file.metadata().map_err(io_err)?.len();
    let mut block = String::new();
    if len > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1)).map_err(io_err)?;
        file.read_exact(&mut last).map_err(io_err)?;
        if last[0] != b'\n' {
            block.push('\n');
        }
    }
    block.push_str(&render_r_config(desc, include_system_packages));
    file.write_all(block.as_bytes()).map_err(io_err)?;
    tracing::debug!(path = %cfg_path.display(), "Appended R configuration");
    Ok(())
}

/// Parse `key = value` lines; lines without `=` are ignored.
pub fn parse_config(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

pub fn read_config(cfg_path: &Path) -> Result<Vec<(String, String)>> {
    let content =
        fs::read_to_string(cfg_path).map_err(|e| BuildError::io("Read config", cfg_path, e))?;
    Ok(parse_config(&content))
}

/// Last value for `key`, matching the way venv readers treat repeats.
pub fn config_value<'a>(entries: &'a [(String, String)], key: &str) -> Option<&'a str> {
    entries
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
