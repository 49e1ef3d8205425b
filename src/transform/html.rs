//! HTML stages: fragment inlining and minification (minify-html).
//!
//! Pages include shared fragments with an import directive, optionally
//! wrapped in a comment:
//!
//! ```html
//! <body>
//!   @import "header.html"
//!   <!-- @import "partials/footer.html" -->
//! </body>
//! ```
//!
//! Fragments are looked up in the components directory and may import other
//! fragments.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use minify_html::Cfg;
use regex::{Captures, Regex};

use super::{StageError, Transform, text};
use crate::asset::Asset;

/// Nesting limit for fragment imports.
const MAX_IMPORT_DEPTH: usize = 16;

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:<!--[ \t\r\n]*)?@import[ \t]+["']([^"'\r\n]+)["'][ \t]*;?(?:[ \t\r\n]*-->)?"#)
        .unwrap_or_else(|e| unreachable!("invalid import pattern: {e}"))
});

// ============================================================================
// InlineImports
// ============================================================================

/// Replace `@import "fragment.html"` directives with the fragment's contents.
pub struct InlineImports {
    components: PathBuf,
}

impl InlineImports {
    pub fn new(components: &Path) -> Self {
        Self {
            components: components.to_path_buf(),
        }
    }

    /// Expand imports in `html`. `stack` holds the fragments currently being
    /// expanded, outermost first.
    fn expand(&self, html: &str, origin: &Path, stack: &mut Vec<PathBuf>) -> Result<String, StageError> {
        if !IMPORT_RE.is_match(html) {
            return Ok(html.to_string());
        }
        if stack.len() >= MAX_IMPORT_DEPTH {
            return Err(StageError::compile(
                origin,
                format!("imports nested deeper than {MAX_IMPORT_DEPTH} levels"),
            ));
        }

        let mut error = None;
        let expanded = IMPORT_RE.replace_all(html, |caps: &Captures<'_>| {
            if error.is_some() {
                return Cow::Borrowed("");
            }
            match self.fragment(&caps[1], origin, stack) {
                Ok(fragment) => Cow::Owned(fragment),
                Err(e) => {
                    error = Some(e);
                    Cow::Borrowed("")
                }
            }
        });

        match error {
            Some(e) => Err(e),
            None => Ok(expanded.into_owned()),
        }
    }

    fn fragment(&self, name: &str, origin: &Path, stack: &mut Vec<PathBuf>) -> Result<String, StageError> {
        let path = self.components.join(name);
        if stack.contains(&path) {
            return Err(StageError::compile(
                origin,
                format!("import cycle through `{name}`"),
            ));
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            StageError::compile(origin, format!("cannot import `{name}`: {e}"))
        })?;

        stack.push(path.clone());
        let result = self.expand(&content, &path, stack);
        stack.pop();
        result
    }
}

impl Transform for InlineImports {
    fn name(&self) -> &'static str {
        "html-import"
    }

    fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let html = self.expand(text(asset)?, asset.origin(), &mut Vec::new())?;
            asset.contents = html.into_bytes();
        }
        Ok(assets)
    }
}

// ============================================================================
// MinifyHtml
// ============================================================================

/// Collapse whitespace. Closing tags, comments and `<html>`/`<head>` are
/// kept so output stays valid for every browser.
pub struct MinifyHtml {
    cfg: Cfg,
}

impl MinifyHtml {
    pub fn new() -> Self {
        Self {
            cfg: Cfg {
                keep_closing_tags: true,
                keep_html_and_head_opening_tags: true,
                keep_comments: true,
                ..Cfg::spec_compliant()
            },
        }
    }
}

impl Default for MinifyHtml {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for MinifyHtml {
    fn name(&self) -> &'static str {
        "minify-html"
    }

    fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            asset.contents = minify_html::minify(&asset.contents, &self.cfg);
        }
        Ok(assets)
    }
}
