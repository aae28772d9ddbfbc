//! Place R executables into the environment's bin directory.
//!
//! Uses the same link-or-copy strategy as the Python executables so both
//! runtimes behave alike (e.g. symlinks follow in-place upgrades). Fail-fast:
//! files installed before a failing step are left in place.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{BuildError, Result};
use crate::options::LinkStrategy;

/// Install each source under its own file name into `bin_dir`.
pub fn install_executables(sources: &[&Path], bin_dir: &Path, strategy: LinkStrategy) -> Result<()> {
    fs::create_dir_all(bin_dir).map_err(|e| BuildError::io("Create bin dir", bin_dir, e))?;
    for src in sources {
        let Some(name) = src.file_name() else {
            return Err(BuildError::io(
                "Install executable",
                *src,
                io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            ));
        };
        let dst = bin_dir.join(name);
        clear_destination(&dst)?;
        match strategy {
            LinkStrategy::Symlink => {
                if let Err(e) = symlink_file(src, &dst) {
                    tracing::warn!(
                        src = %src.display(),
                        error = %e,
                        "Unable to symlink, copying instead"
                    );
                    copy_file(src, &dst)?;
                }
            }
            LinkStrategy::Copy => copy_file(src, &dst)?,
        }
        tracing::debug!(src = %src.display(), dst = %dst.display(), ?strategy, "Installed executable");
    }
    Ok(())
}

/// Remove a previous file or link at `dst`; a directory there is a conflict.
fn clear_destination(dst: &Path) -> Result<()> {
    match fs::symlink_metadata(dst) {
        Ok(meta) if meta.is_dir() => Err(BuildError::LayoutConflict {
            path: dst.to_path_buf(),
        }),
        Ok(_) => fs::remove_file(dst).map_err(|e| BuildError::io("Replace executable", dst, e)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::io("Inspect executable", dst, e)),
    }
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(|e| BuildError::io("Copy executable", src, e))
}

#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}
