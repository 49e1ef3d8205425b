//! `[paths]` section: the path table.
//!
//! Maps each asset group to its source glob patterns and destination
//! directory. Defaults reproduce the conventional `src/` -> `dist/` layout:
//!
//! ```toml
//! [paths]
//! src = "src"
//! dist = "dist"
//! preserve = "dist/assets/images"   # survives `clean`
//! components = "src/components"     # html fragments for @import
//!
//! [paths.styles]
//! src = ["src/assets/styles/**/*.scss", "src/assets/css/**/*.sass"]
//! dest = "dist/assets/styles"
//! ```
//!
//! Patterns are relative to the project root and may use `**`, `*`, `?`,
//! `[...]` and brace alternatives (`*.{png,jpg}`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::core::AssetGroup;
use crate::utils::path::normalize_path;

/// Sources and destination of one asset group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPaths {
    /// Source glob patterns.
    pub src: Vec<String>,
    /// Destination directory.
    pub dest: PathBuf,
    /// Directory outputs are made relative to (defaults to each pattern's glob base).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<PathBuf>,
    /// Patterns removed from the matched set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl GroupPaths {
    fn new(src: &[&str], dest: &str) -> Self {
        Self {
            src: src.iter().map(|s| (*s).to_string()).collect(),
            dest: PathBuf::from(dest),
            base: None,
            exclude: Vec::new(),
        }
    }

    fn with_base(mut self, base: &str) -> Self {
        self.base = Some(PathBuf::from(base));
        self
    }

    fn with_exclude(mut self, pattern: &str) -> Self {
        self.exclude.push(pattern.to_string());
        self
    }

    fn normalize(&mut self, root: &Path) {
        self.dest = normalize_path(&root.join(&self.dest));
        if let Some(base) = self.base.take() {
            self.base = Some(normalize_path(&root.join(base)));
        }
    }
}

/// The path table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source root (watched in serve mode).
    pub src: PathBuf,
    /// Destination root (served and cleaned).
    pub dist: PathBuf,
    /// Subdirectory of `dist` kept by `clean`.
    pub preserve: PathBuf,
    /// HTML fragment directory for `@import "..."`.
    pub components: PathBuf,

    pub styles: GroupPaths,
    pub scripts: GroupPaths,
    pub images: GroupPaths,
    pub html: GroupPaths,
    pub fonts: GroupPaths,
    pub lib: GroupPaths,
    pub sprites: GroupPaths,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("src"),
            dist: PathBuf::from("dist"),
            preserve: PathBuf::from("dist/assets/images"),
            components: PathBuf::from("src/components"),
            styles: GroupPaths::new(
                &["src/assets/styles/**/*.scss", "src/assets/css/**/*.sass"],
                "dist/assets/styles",
            ),
            scripts: GroupPaths::new(
                &["src/assets/js/**/*.js", "src/assets/js/**/*.ts"],
                "dist/assets/js",
            ),
            images: GroupPaths::new(
                &["src/assets/images/**/*.{jpg,png,svg,gif,ico,webp,webmanifest,xml,json}"],
                "dist/assets/images",
            ),
            html: GroupPaths::new(&["src/**/*.html"], "dist")
                .with_base("src")
                .with_exclude("src/components/**"),
            fonts: GroupPaths::new(
                &["src/assets/fonts/**/*.{eot,woff,woff2,ttf,svg}"],
                "dist/assets/fonts",
            ),
            lib: GroupPaths::new(&["src/assets/lib/**"], "dist/assets/lib"),
            sprites: GroupPaths::new(&["src/assets/images/svg/**/*.svg"], "dist/assets/images"),
        }
    }
}

impl PathsConfig {
    /// Look up a group's sources and destination.
    pub fn group(&self, group: AssetGroup) -> &GroupPaths {
        match group {
            AssetGroup::Styles => &self.styles,
            AssetGroup::Scripts => &self.scripts,
            AssetGroup::Images => &self.images,
            AssetGroup::Html => &self.html,
            AssetGroup::Fonts => &self.fonts,
            AssetGroup::Lib => &self.lib,
            AssetGroup::Sprites => &self.sprites,
        }
    }

    fn groups_mut(&mut self) -> [&mut GroupPaths; 7] {
        [
            &mut self.styles,
            &mut self.scripts,
            &mut self.images,
            &mut self.html,
            &mut self.fonts,
            &mut self.lib,
            &mut self.sprites,
        ]
    }

    /// Resolve all directories against the project root.
    pub(crate) fn normalize(&mut self, root: &Path) {
        self.src = normalize_path(&root.join(&self.src));
        self.dist = normalize_path(&root.join(&self.dist));
        self.preserve = normalize_path(&root.join(&self.preserve));
        self.components = normalize_path(&root.join(&self.components));
        for group in self.groups_mut() {
            group.normalize(root);
        }
    }

    /// Validate raw (not yet normalized) paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for group in AssetGroup::ALL {
            let paths = self.group(group);
            if paths.src.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "paths.{group}.src has no patterns"
                )));
            }
            for pattern in paths.src.iter().chain(&paths.exclude) {
                if Path::new(pattern).is_absolute() {
                    return Err(ConfigError::Validation(format!(
                        "paths.{group}: pattern `{pattern}` must be relative to the project root"
                    )));
                }
            }
        }
        if !self.preserve.starts_with(&self.dist) {
            return Err(ConfigError::Validation(format!(
                "paths.preserve `{}` must be inside paths.dist `{}`",
                self.preserve.display(),
                self.dist.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_default_path_table() {
        let config = test_parse_config("");
        let paths = &config.paths;

        assert_eq!(paths.group(AssetGroup::Styles).src.len(), 2);
        assert_eq!(paths.group(AssetGroup::Scripts).dest, PathBuf::from("dist/assets/js"));
        assert_eq!(paths.group(AssetGroup::Html).base, Some(PathBuf::from("src")));
        assert_eq!(paths.group(AssetGroup::Html).exclude, vec!["src/components/**"]);
        assert_eq!(paths.preserve, PathBuf::from("dist/assets/images"));
        assert!(paths.validate().is_ok());
    }

    #[test]
    fn test_every_group_has_sources() {
        let config = test_parse_config("");
        for group in AssetGroup::ALL {
            assert!(!config.paths.group(group).src.is_empty(), "{group}");
        }
    }

    #[test]
    fn test_group_override() {
        let config = test_parse_config(
            "[paths.fonts]\nsrc = [\"assets/fonts/*.woff2\", \"vendor/*.woff2\"]\ndest = \"public/fonts\"",
        );
        let fonts = config.paths.group(AssetGroup::Fonts);
        assert_eq!(fonts.src, vec!["assets/fonts/*.woff2", "vendor/*.woff2"]);
        assert_eq!(fonts.dest, PathBuf::from("public/fonts"));
        // Untouched groups keep their defaults
        assert_eq!(config.paths.group(AssetGroup::Lib).src, vec!["src/assets/lib/**"]);
    }

    #[test]
    fn test_absolute_pattern_rejected() {
        let config = test_parse_config("[paths.lib]\nsrc = [\"/etc/**\"]\ndest = \"dist/lib\"");
        assert!(config.paths.validate().is_err());
    }

    #[test]
    fn test_preserve_outside_dist_rejected() {
        let config = test_parse_config("[paths]\npreserve = \"cache/images\"");
        assert!(config.paths.validate().is_err());
    }

    #[test]
    fn test_normalize_makes_absolute() {
        let mut config = test_parse_config("");
        let root = std::env::temp_dir();
        config.paths.normalize(&root);
        assert!(config.paths.dist.is_absolute());
        assert!(config.paths.group(AssetGroup::Html).dest.is_absolute());
        assert!(config.paths.preserve.starts_with(&config.paths.dist));
    }
}
