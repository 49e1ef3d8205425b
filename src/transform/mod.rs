//! Stage chains.
//!
//! Every asset group runs its sources through an ordered list of stages.
//! A stage maps the full asset set to a new set: it may rewrite contents,
//! rename, merge (concat, sprite) or drop (partials, fresh images) assets.
//!
//! ```text
//! styles:  CompileScss -> PrefixCss -> Concat -> MinifyCss -> Rename -> SourceMaps -> ReportSize
//! scripts: CompileJs -> Concat -> Rename -> SourceMaps -> ReportSize
//! html:    InlineImports -> MinifyHtml -> ReportSize
//! images:  SkipFresh -> OptimizeImages -> ReportSize
//! sprites: SvgSprite -> ReportSize
//! fonts, lib: (none)
//! ```
//!
//! Stages run strictly in order. The first failing stage stops the chain.

mod common;
mod html;
mod images;
mod scripts;
mod sprite;
mod styles;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::asset::Asset;

pub use common::{Concat, Rename, ReportSize, SourceMaps};
pub use html::{InlineImports, MinifyHtml};
pub use images::{OptimizeImages, SkipFresh};
pub use scripts::CompileJs;
pub use sprite::SvgSprite;
pub use styles::{CompileScss, MinifyCss, PrefixCss};

/// Errors raised by a stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// Source could not be compiled (syntax error, missing import).
    #[error("{}: {message}", path.display())]
    Compile { path: PathBuf, message: String },

    #[error("IO error on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Broken invariant inside a stage (bad source map, encoder failure).
    #[error("{0}")]
    Other(String),
}

impl StageError {
    pub fn compile(path: &Path, message: impl ToString) -> Self {
        Self::Compile {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Compile errors end the run without writing; everything else is fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Compile { .. })
    }
}

/// A single stage of a stage chain.
pub trait Transform: Send + Sync {
    /// Short name for debug output.
    fn name(&self) -> &'static str;

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, StageError>;
}

/// An ordered stage chain.
///
/// ```ignore
/// let chain = Pipeline::new()
///     .pipe(CompileJs::new("es2015", &root))
///     .pipe(Concat::new("main.js"))
///     .pipe(Rename::suffix(".min"));
/// let outputs = chain.run(assets)?;
/// ```
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn pipe(mut self, stage: impl Transform + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over `assets`.
    pub fn run(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        self.stages.iter().try_fold(assets, |assets, stage| {
            crate::debug!("stage"; "{} <- {} asset(s)", stage.name(), assets.len());
            stage.apply(assets)
        })
    }
}

/// Decode an asset as UTF-8 text, reporting invalid encoding as a compile error.
pub(crate) fn text(asset: &Asset) -> Result<&str, StageError> {
    std::str::from_utf8(&asset.contents)
        .map_err(|e| StageError::compile(asset.origin(), format!("invalid UTF-8: {e}")))
}

/// Path of `path` relative to `root`, with `/` separators.
///
/// Used as the source name inside source maps.
pub(crate) fn source_name(path: &Path, root: &Path) -> String {
    crate::utils::path::to_slash(path.strip_prefix(root).unwrap_or(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;
    impl Transform for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }
        fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
            Ok(assets
                .into_iter()
                .map(|mut a| {
                    a.contents.make_ascii_uppercase();
                    a
                })
                .collect())
        }
    }

    struct Fail;
    impl Transform for Fail {
        fn name(&self) -> &'static str {
            "fail"
        }
        fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
            Err(StageError::compile(assets[0].origin(), "boom"))
        }
    }

    #[test]
    fn test_empty_pipeline_passes_through() {
        let out = Pipeline::new().run(vec![Asset::new("a.txt", "abc")]).unwrap();
        assert_eq!(out[0].contents, b"abc");
    }

    #[test]
    fn test_stages_run_in_order() {
        let chain = Pipeline::new().pipe(Upper).pipe(Rename::suffix(".min"));
        assert_eq!(chain.names(), vec!["upper", "rename"]);

        let out = chain.run(vec![Asset::new("a.txt", "abc")]).unwrap();
        assert_eq!(out[0].path, PathBuf::from("a.min.txt"));
        assert_eq!(out[0].contents, b"ABC");
    }

    #[test]
    fn test_failure_stops_chain() {
        let chain = Pipeline::new().pipe(Fail).pipe(Upper);
        let err = chain.run(vec![Asset::new("a.txt", "abc")]).unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_io_error_is_fatal() {
        let err = StageError::io(Path::new("x"), io::Error::other("disk"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_source_name() {
        let root = Path::new("/project");
        assert_eq!(
            source_name(Path::new("/project/src/assets/js/app.js"), root),
            "src/assets/js/app.js"
        );
        assert_eq!(source_name(Path::new("gen.js"), root), "gen.js");
    }
}
