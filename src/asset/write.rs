//! Writing assets to their destination.
//!
//! A write is skipped when the destination already holds identical bytes:
//! repeated runs leave outputs (and their mtimes) untouched. An unchanged
//! output older than its source is touched instead, so mtime freshness sees
//! the source as processed.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use super::Asset;
use crate::freshness::{get_mtime, is_output_fresh};

/// Outcome of writing one group's assets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    /// Files created or changed.
    pub written: usize,
    /// Files whose destination already matched.
    pub unchanged: usize,
}

impl WriteSummary {
    pub fn total(&self) -> usize {
        self.written + self.unchanged
    }
}

/// Write a single asset under `dest`. Returns `true` if the file changed.
fn write_asset(dest: &Path, asset: &Asset) -> io::Result<bool> {
    let target = dest.join(&asset.path);

    if let Ok(existing) = fs::read(&target)
        && existing == asset.contents
    {
        if let Some(source_mtime) = asset.source.as_deref().and_then(get_mtime)
            && !is_output_fresh(&target, Some(source_mtime))
        {
            touch(&target)?;
        }
        return Ok(false);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &asset.contents)?;
    Ok(true)
}

fn touch(path: &Path) -> io::Result<()> {
    fs::File::options()
        .write(true)
        .open(path)?
        .set_modified(SystemTime::now())
}

/// Write every asset under `dest`.
pub fn write_assets(dest: &Path, assets: &[Asset]) -> io::Result<WriteSummary> {
    let mut summary = WriteSummary::default();
    for asset in assets {
        if write_asset(dest, asset)? {
            summary.written += 1;
        } else {
            summary.unchanged += 1;
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let asset = Asset::new("nested/dir/app.js", "x()");

        assert!(write_asset(dir.path(), &asset).unwrap());
        assert_eq!(
            fs::read_to_string(dir.path().join("nested/dir/app.js")).unwrap(),
            "x()"
        );
    }

    #[test]
    fn test_identical_bytes_skip_write() {
        let dir = TempDir::new().unwrap();
        let assets = vec![Asset::new("a.css", "a{}"), Asset::new("b.css", "b{}")];

        let first = write_assets(dir.path(), &assets).unwrap();
        assert_eq!(first, WriteSummary { written: 2, unchanged: 0 });

        let mtime = fs::metadata(dir.path().join("a.css")).unwrap().modified().unwrap();
        let second = write_assets(dir.path(), &assets).unwrap();
        assert_eq!(second, WriteSummary { written: 0, unchanged: 2 });
        assert_eq!(second.total(), 2);
        assert_eq!(
            fs::metadata(dir.path().join("a.css")).unwrap().modified().unwrap(),
            mtime
        );
    }

    #[test]
    fn test_unchanged_output_older_than_source_is_touched() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("site.json");
        fs::write(&source, "{ }").unwrap();
        let dest = dir.path().join("dist");

        let mut asset = Asset::new("site.json", "{}");
        asset.source = Some(source.clone());
        write_asset(&dest, &asset).unwrap();

        let output = dest.join("site.json");
        let past = SystemTime::now() - std::time::Duration::from_secs(60);
        fs::File::options().write(true).open(&output).unwrap().set_modified(past).unwrap();
        assert!(!is_output_fresh(&output, get_mtime(&source)));

        assert!(!write_asset(&dest, &asset).unwrap());
        assert!(is_output_fresh(&output, get_mtime(&source)));
        assert_eq!(fs::read_to_string(&output).unwrap(), "{}");
    }

    #[test]
    fn test_changed_bytes_rewrite() {
        let dir = TempDir::new().unwrap();
        write_asset(dir.path(), &Asset::new("a.css", "a{}")).unwrap();
        assert!(write_asset(dir.path(), &Asset::new("a.css", "a{color:red}")).unwrap());
        assert_eq!(
            fs::read_to_string(dir.path().join("a.css")).unwrap(),
            "a{color:red}"
        );
    }
}
