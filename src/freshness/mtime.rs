//! Mtime-based freshness detection.
//!
//! An output is fresh when it exists and is not older than its source. The
//! images group uses this to skip sources that were already optimized by a
//! previous run (the images destination survives `clean`).

use std::path::Path;
use std::time::SystemTime;

/// Check if output file is at least as new as the given source mtime
///
/// Returns `true` if the output exists and `output_mtime >= source_mtime`,
/// meaning processing can be skipped. An unknown source mtime is never fresh.
pub fn is_output_fresh(output: &Path, source_mtime: Option<SystemTime>) -> bool {
    let Some(source_time) = source_mtime else {
        return false;
    };

    get_mtime(output).is_some_and(|output_time| output_time >= source_time)
}

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn test_missing_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("logo.png");
        assert!(!is_output_fresh(&output, Some(SystemTime::now())));
    }

    #[test]
    fn test_unknown_source_mtime_is_stale() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("logo.png");
        fs::write(&output, b"x").unwrap();
        assert!(!is_output_fresh(&output, None));
    }

    #[test]
    fn test_output_newer_than_source_is_fresh() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src.png");
        let output = dir.path().join("out.png");
        fs::write(&source, b"src").unwrap();
        fs::write(&output, b"out").unwrap();

        let base = SystemTime::now() - Duration::from_secs(60);
        set_mtime(&source, base);
        set_mtime(&output, base + Duration::from_secs(10));

        assert!(is_output_fresh(&output, get_mtime(&source)));
    }

    #[test]
    fn test_touched_source_makes_output_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src.png");
        let output = dir.path().join("out.png");
        fs::write(&source, b"src").unwrap();
        fs::write(&output, b"out").unwrap();

        let base = SystemTime::now() - Duration::from_secs(60);
        set_mtime(&output, base);
        set_mtime(&source, base + Duration::from_secs(10));

        assert!(!is_output_fresh(&output, get_mtime(&source)));
    }
}
