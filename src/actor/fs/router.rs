use std::path::{Path, PathBuf};

use glob::PatternError;

use super::types::ChangeKind;
use crate::config::PipelineConfig;
use crate::core::AssetGroup;
use crate::utils::glob::GlobSet;

/// A group's glob set plus the directories its sources depend on.
struct WatchBinding {
    group: AssetGroup,
    globs: GlobSet,
    /// Any change below these directories triggers the group.
    deps: Vec<PathBuf>,
}

impl WatchBinding {
    fn matches(&self, path: &Path) -> bool {
        self.globs.matches(path) || self.deps.iter().any(|d| path.starts_with(d))
    }
}

/// Routes changed paths to the groups that must re-run.
pub struct WatchBindings {
    bindings: Vec<WatchBinding>,
}

impl WatchBindings {
    pub fn new(config: &PipelineConfig) -> Result<Self, PatternError> {
        let bindings = AssetGroup::ALL
            .into_iter()
            .map(|group| {
                let deps = match group {
                    // Fragments are excluded from the page globs but inlined into pages
                    AssetGroup::Html => vec![config.paths.components.clone()],
                    _ => Vec::new(),
                };
                Ok(WatchBinding {
                    group,
                    globs: GlobSet::new(&config.root, config.paths.group(group))?,
                    deps,
                })
            })
            .collect::<Result<_, PatternError>>()?;

        Ok(Self { bindings })
    }

    /// Directories to watch: every glob root and dependency directory.
    pub fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .bindings
            .iter()
            .flat_map(|b| b.globs.roots().into_iter().chain(b.deps.iter().cloned()))
            .collect();
        roots.sort();
        roots.dedup();
        // Nested roots are covered by their recursive ancestor
        let all = roots.clone();
        roots.retain(|r| !all.iter().any(|other| other != r && r.starts_with(other)));
        roots
    }

    /// Groups affected by `changes`, in `AssetGroup::ALL` order, with the
    /// paths that triggered each.
    pub(super) fn route(&self, changes: &[(PathBuf, ChangeKind)]) -> Vec<(AssetGroup, Vec<PathBuf>)> {
        self.bindings
            .iter()
            .filter_map(|binding| {
                let paths: Vec<PathBuf> = changes
                    .iter()
                    .filter(|(path, _)| binding.matches(path))
                    .map(|(path, _)| path.clone())
                    .collect();
                (!paths.is_empty()).then_some((binding.group, paths))
            })
            .collect()
    }
}

pub(super) fn log_changes(changes: &[(PathBuf, ChangeKind)]) {
    for (path, kind) in changes {
        crate::debug!("watch"; "{}: {}", kind.label(), path.display());
    }
}
