//! URL to filesystem path resolution.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Resolve a request URL to a file under `serve_root`.
///
/// Directories resolve to their `index.html`. Anything that would leave
/// `serve_root` (`..`, symlinks pointing outside) resolves to None.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url)?;

    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let canonical = serve_root.join(&clean).canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Decode, strip query string and fragment, trim slashes.
fn normalize_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let decoded = match decoded {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    };
    Some(decoded.replace('\\', "/").trim_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("dist/about")).unwrap();
        fs::create_dir_all(root.join("dist/assets/styles")).unwrap();
        fs::write(root.join("dist/index.html"), "<p>home</p>").unwrap();
        fs::write(root.join("dist/about/index.html"), "<p>about</p>").unwrap();
        fs::write(root.join("dist/assets/styles/main.min.css"), "a{}").unwrap();
        fs::write(root.join("dist/hello world.txt"), "hi").unwrap();
        fs::write(root.join("secret.txt"), "nope").unwrap();
        dir
    }

    #[test]
    fn test_root_serves_index() {
        let dir = site();
        let dist = dir.path().join("dist");
        let path = resolve_path("/", &dist).unwrap();
        assert!(path.ends_with("dist/index.html"));
    }

    #[test]
    fn test_directory_serves_index() {
        let dir = site();
        let dist = dir.path().join("dist");
        assert!(resolve_path("/about/", &dist).unwrap().ends_with("about/index.html"));
        assert!(resolve_path("/about", &dist).unwrap().ends_with("about/index.html"));
    }

    #[test]
    fn test_file_with_query_and_encoding() {
        let dir = site();
        let dist = dir.path().join("dist");
        assert!(
            resolve_path("/assets/styles/main.min.css?v=3", &dist)
                .unwrap()
                .ends_with("main.min.css")
        );
        assert!(resolve_path("/hello%20world.txt", &dist).is_some());
    }

    #[test]
    fn test_missing_is_none() {
        let dir = site();
        let dist = dir.path().join("dist");
        assert!(resolve_path("/nope.html", &dist).is_none());
        assert!(resolve_path("/assets", &dist).is_none());
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = site();
        let dist = dir.path().join("dist");
        assert!(resolve_path("/../secret.txt", &dist).is_none());
        assert!(resolve_path("/%2e%2e/secret.txt", &dist).is_none());
        assert!(resolve_path("/about/..%2F..%2Fsecret.txt", &dist).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let dir = site();
        let dist = dir.path().join("dist");
        std::os::unix::fs::symlink(dir.path().join("secret.txt"), dist.join("link.txt")).unwrap();
        assert!(resolve_path("/link.txt", &dist).is_none());
    }
}
