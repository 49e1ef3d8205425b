//! In-flight assets.
//!
//! An [`Asset`] is one (path, bytes) pair travelling through a group's stage
//! chain. `path` is the output path relative to the group destination. The
//! stage chain may rename, merge or drop assets; writing happens once, at the
//! end, through [`write_assets`].

mod write;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parcel_sourcemap::SourceMap;

use crate::utils::glob::SourceFile;

pub use write::{WriteSummary, write_assets};

/// One file in a stage chain.
pub struct Asset {
    /// Output path relative to the group destination.
    pub path: PathBuf,
    /// Current contents.
    pub contents: Vec<u8>,
    /// Source file this asset was read from (None for generated assets).
    pub source: Option<PathBuf>,
    /// Source map of `contents`, once a stage produced one.
    pub map: Option<SourceMap>,
}

impl std::fmt::Debug for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Asset")
            .field("path", &self.path)
            .field("len", &self.contents.len())
            .field("source", &self.source)
            .field("map", &self.map.is_some())
            .finish()
    }
}

impl Asset {
    /// Create a generated asset.
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            source: None,
            map: None,
        }
    }

    /// Read a matched source file.
    pub fn read(file: &SourceFile) -> io::Result<Self> {
        Ok(Self {
            path: file.relative.clone(),
            contents: fs::read(&file.path)?,
            source: Some(file.path.clone()),
            map: None,
        })
    }

    /// Source path if known, output path otherwise. Used in messages.
    pub fn origin(&self) -> &Path {
        self.source.as_deref().unwrap_or(&self.path)
    }

    /// File extension, lowercased.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }

    /// File name without directories.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    pub fn len(&self) -> u64 {
        self.contents.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}
