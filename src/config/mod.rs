//! Pipeline configuration from `assetpipe.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── images     # [images]
//! │   ├── paths      # [paths] and [paths.<group>]
//! │   ├── scripts    # [scripts]
//! │   ├── serve      # [serve]
//! │   ├── sprites    # [sprites]
//! │   └── styles     # [styles]
//! ├── error          # ConfigError
//! ├── util           # find_config_file
//! └── mod.rs         # PipelineConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[paths]`   | Source/destination roots and per-group globs     |
//! | `[styles]`  | Bundle name, browser targets                     |
//! | `[scripts]` | Bundle name, transpile target                    |
//! | `[images]`  | JPEG quality                                     |
//! | `[sprites]` | Sprite mode and output file                      |
//! | `[serve]`   | Dev server interface, HTTP and WebSocket ports   |
//!
//! The config file is optional. Without one, the project root is the
//! current directory and every section takes its defaults.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{
    GroupPaths, ImagesConfig, PathsConfig, ScriptsConfig, ServeConfig, SpriteMode, SpritesConfig,
    StylesConfig,
};

use crate::cli::Cli;
use crate::log;
use crate::utils::path::normalize_path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use util::find_config_file;

/// Root configuration structure representing assetpipe.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub styles: StylesConfig,

    #[serde(default)]
    pub scripts: ScriptsConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub sprites: SpritesConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl PipelineConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let Some(config_path) = find_config_file(&cwd, &cli.config) else {
            crate::debug!("config"; "no {} found, using defaults", cli.config.display());
            return Self::for_root(&cwd);
        };

        let mut config = Self::from_path(&config_path)?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        config.config_path = Some(normalize_path(&config_path));
        config.finalize(&root)?;
        Ok(config)
    }

    /// Default configuration rooted at `root`.
    pub fn for_root(root: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.finalize(root)?;
        Ok(config)
    }

    /// Parse configuration from TOML string and root it at `root`.
    #[cfg(test)]
    pub fn from_str_at(content: &str, root: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        config.finalize(root)?;
        Ok(config)
    }

    /// Validate raw values, then resolve paths against `root`.
    ///
    /// Validation must run first: normalization turns relative patterns into
    /// absolute paths, which would hide user-written absolute paths.
    fn finalize(&mut self, root: &Path) -> Result<()> {
        self.validate()?;
        self.root = normalize_path(root);
        let root = self.root.clone();
        self.paths.normalize(&root);
        Ok(())
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.paths.validate()?;
        self.styles.validate()?;
        self.scripts.validate()?;
        self.images.validate()?;
        if self.serve.port == self.serve.ws_port {
            return Err(ConfigError::Validation(format!(
                "serve.port and serve.ws_port are both {}",
                self.serve.port
            )));
        }
        Ok(())
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config without rooting it.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> PipelineConfig {
    let (parsed, ignored) = PipelineConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
