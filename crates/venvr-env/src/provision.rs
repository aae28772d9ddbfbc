//! R library directory inside the environment: `<lib>/R<major>.<minor>`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};

/// `R4.3` for major.minor `4.3`.
pub fn r_lib_dir_name(major_minor: &str) -> String {
    format!("R{}", major_minor)
}

/// Create `<lib_root>/R<major_minor>` (and parents) unless it already exists
/// as a plain directory.
///
/// A symlink or regular file at that path is a [`BuildError::LayoutConflict`];
/// the link is never followed.
pub fn ensure_library_dir(lib_root: &Path, major_minor: &str) -> Result<PathBuf> {
    let path = lib_root.join(r_lib_dir_name(major_minor));
    match fs::symlink_metadata(&path) {
        Ok(meta) if meta.file_type().is_symlink() || !meta.is_dir() => {
            Err(BuildError::LayoutConflict { path })
        }
        Ok(_) => {
            tracing::debug!(path = %path.display(), "R library dir already present");
            Ok(path)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(&path)
                .map_err(|e| BuildError::io("Create R library dir", &path, e))?;
            tracing::debug!(path = %path.display(), "Created R library dir");
            Ok(path)
        }
        Err(e) => Err(BuildError::io("Inspect R library dir", &path, e)),
    }
}
