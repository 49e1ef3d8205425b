//! Glob patterns for asset groups.
//!
//! A group's sources are a list of patterns relative to the project root.
//! Each pattern is brace-expanded (`*.{png,jpg}` -> `*.png`, `*.jpg`), then
//! compiled with the `glob` crate. Outputs keep their path relative to the
//! pattern's *glob base*: the leading components that contain no wildcard.
//!
//! ```text
//! src/assets/images/**/*.png   base: src/assets/images
//!   src/assets/images/icons/a.png  ->  icons/a.png
//! ```

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern, PatternError};
use jwalk::{Parallelism, WalkDir};
use rustc_hash::FxHashSet;

use crate::config::GroupPaths;

const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A source file matched by a group's patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the glob base (or the group's explicit base).
    pub relative: PathBuf,
}

#[derive(Debug, Clone)]
struct GlobEntry {
    pattern: Pattern,
    /// Directory walked to find candidates.
    walk_root: PathBuf,
    /// Directory outputs are made relative to.
    base: PathBuf,
}

/// Compiled source patterns of one asset group.
#[derive(Debug, Clone)]
pub struct GlobSet {
    entries: Vec<GlobEntry>,
    exclude: Vec<Pattern>,
}

impl GlobSet {
    /// Compile a group's patterns against the project root.
    pub fn new(root: &Path, paths: &GroupPaths) -> Result<Self, PatternError> {
        let mut entries = Vec::new();
        for raw in &paths.src {
            for expanded in expand_braces(raw) {
                let walk_root = root.join(glob_base(&expanded));
                let base = paths
                    .base
                    .as_ref()
                    .map_or_else(|| walk_root.clone(), |b| root.join(b));
                entries.push(GlobEntry {
                    pattern: compile(root, &expanded)?,
                    walk_root,
                    base,
                });
            }
        }

        let exclude = paths
            .exclude
            .iter()
            .flat_map(|p| expand_braces(p))
            .map(|p| compile(root, &p))
            .collect::<Result<_, _>>()?;

        Ok(Self { entries, exclude })
    }

    /// Whether `path` (absolute) belongs to this group.
    pub fn matches(&self, path: &Path) -> bool {
        self.entries
            .iter()
            .any(|e| e.pattern.matches_path_with(path, MATCH_OPTIONS))
            && !self.is_excluded(path)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude
            .iter()
            .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
    }

    /// Directories that must be watched to see every possible match.
    pub fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self.entries.iter().map(|e| e.walk_root.clone()).collect();
        roots.sort();
        roots.dedup();
        roots
    }

    /// Scan the filesystem for matching files.
    ///
    /// Files are grouped by pattern (in pattern order) and sorted within each
    /// pattern. A file matched by several patterns is reported once.
    ///
    /// The walk runs on the calling thread: groups are resolved from inside
    /// rayon workers, where a walk on the shared pool can fail as busy.
    pub fn resolve(&self) -> Result<Vec<SourceFile>, jwalk::Error> {
        let mut seen = FxHashSet::default();
        let mut files = Vec::new();

        for entry in &self.entries {
            if !entry.walk_root.is_dir() {
                continue;
            }

            let walked = WalkDir::new(&entry.walk_root)
                .sort(true)
                .parallelism(Parallelism::Serial)
                .into_iter()
                .collect::<Result<Vec<_>, _>>()?;

            let mut matched: Vec<PathBuf> = walked
                .into_iter()
                .filter(|e| e.file_type().is_file())
                .filter(|e| {
                    let name = e.file_name().to_str().unwrap_or_default();
                    !IGNORED_FILES.contains(&name)
                })
                .map(|e| e.path())
                .filter(|p| entry.pattern.matches_path_with(p, MATCH_OPTIONS))
                .filter(|p| !self.is_excluded(p))
                .collect();
            matched.sort();

            for path in matched {
                if !seen.insert(path.clone()) {
                    continue;
                }
                let relative = path
                    .strip_prefix(&entry.base)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default());
                files.push(SourceFile { path, relative });
            }
        }

        Ok(files)
    }
}

/// Compile `pattern` anchored at `root`.
///
/// A trailing `**` is widened to `**/*` so it matches files at any depth.
fn compile(root: &Path, pattern: &str) -> Result<Pattern, PatternError> {
    let root = root.to_string_lossy();
    let root = Pattern::escape(root.trim_end_matches('/'));
    let pattern = pattern.trim_start_matches("./");
    let pattern = if pattern == "**" || pattern.ends_with("/**") {
        format!("{pattern}/*")
    } else {
        pattern.to_string()
    };
    Pattern::new(&format!("{root}/{pattern}"))
}

fn is_magic(component: &str) -> bool {
    component.contains(['*', '?', '[', '{'])
}

/// Leading literal components of a pattern.
///
/// A pattern without wildcards names a single file, so its base is the
/// parent directory.
pub fn glob_base(pattern: &str) -> PathBuf {
    let parts: Vec<&str> = pattern
        .trim_start_matches("./")
        .split('/')
        .filter(|p| !p.is_empty())
        .collect();
    let literal = parts.iter().take_while(|p| !is_magic(p)).count();
    let take = if literal == parts.len() {
        literal.saturating_sub(1)
    } else {
        literal
    };
    parts[..take].iter().collect()
}

/// Expand `{a,b}` alternatives, innermost groups included.
///
/// Unbalanced braces are left as-is.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    for (i, c) in pattern[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    split_alternatives(&pattern[open + 1..close])
        .into_iter()
        .flat_map(|alt| expand_braces(&format!("{prefix}{alt}{suffix}")))
        .collect()
}

/// Split on commas that are not inside nested braces.
fn split_alternatives(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}
