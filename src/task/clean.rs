//! Clean task: empty the destination root, keeping the preserved directory.
//!
//! ```text
//! dist/                    preserve = dist/assets/images
//! ├── index.html           removed
//! └── assets/              descended into (ancestor of preserve)
//!     ├── styles/          removed
//!     └── images/          kept as is
//! ```

use std::fs;
use std::path::Path;

use super::TaskError;

/// Remove everything under `dist` except `preserve` and its ancestors.
///
/// Returns the number of top-level entries removed. A missing `dist` is
/// already clean. Any failure is fatal.
pub fn clean(dist: &Path, preserve: &Path) -> Result<usize, TaskError> {
    if !dist.exists() {
        crate::debug!("clean"; "{} does not exist", dist.display());
        return Ok(0);
    }
    clean_dir(dist, preserve)
}

fn clean_dir(dir: &Path, preserve: &Path) -> Result<usize, TaskError> {
    let mut removed = 0;

    let entries = fs::read_dir(dir).map_err(|e| TaskError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| TaskError::io(dir, e))?.path();

        if path == preserve {
            crate::debug!("clean"; "keeping {}", path.display());
            continue;
        }

        // Symlinks are removed, never followed
        let meta = fs::symlink_metadata(&path).map_err(|e| TaskError::io(&path, e))?;
        if meta.is_dir() && preserve.starts_with(&path) {
            removed += clean_dir(&path, preserve)?;
            continue;
        }

        let result = if meta.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| TaskError::io(&path, e))?;
        removed += 1;
    }

    Ok(removed)
}
