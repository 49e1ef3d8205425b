//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `to_slash` - relative paths rendered with forward slashes

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
///
/// # Example
/// ```ignore
/// use assetpipe::utils::path::normalize_path;
/// let abs = normalize_path(Path::new("./src/assets/js/main.js"));
/// ```
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Render a relative path with `/` separators on every platform.
///
/// Used for URLs, sprite ids and source map entries.
///
/// # Example
/// ```ignore
/// to_slash(Path::new("icons/arrow-left.svg")) // "icons/arrow-left.svg"
/// ```
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_existing_is_canonical() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("a");
        std::fs::create_dir(&nested).unwrap();
        let dotted = dir.path().join("a/../a");
        assert_eq!(normalize_path(&dotted), normalize_path(&nested));
    }

    #[test]
    fn test_to_slash() {
        let path: PathBuf = ["icons", "ui", "arrow.svg"].iter().collect();
        assert_eq!(to_slash(&path), "icons/ui/arrow.svg");
        assert_eq!(to_slash(Path::new("./logo.svg")), "logo.svg");
        assert_eq!(to_slash(Path::new("")), "");
    }
}
