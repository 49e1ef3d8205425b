use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::normalize_path;

/// Quiet period after the last event before changes are released.
pub(super) const DEBOUNCE_MS: u64 = 200;

/// Collects raw notify events into one change per path.
///
/// Only timing and deduplication live here. Coalescing of runs happens in
/// the TaskActor, so no rebuild cooldown is needed.
pub(super) struct Debouncer {
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Remove + Create/Modify → Create/Modify (file was restored)
    /// - Modify + Remove → Remove (file was deleted)
    /// - Create + Remove → nothing (file came and went)
    /// - otherwise the first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                // mtime/chmod noise; our own writes would retrigger runs
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }

            let path = normalize_path(path);

            match self.changes.get(&path).copied() {
                None => {
                    crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Removed) if kind != ChangeKind::Removed => {
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                    self.changes.insert(path, ChangeKind::Removed);
                }
                Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                    crate::debug!("watch"; "discard created+removed: {}", path.display());
                    self.changes.remove(&path);
                }
                Some(_) => continue,
            }
            self.last_event = Some(Instant::now());
        }
    }

    /// Take the collected changes once the quiet period has elapsed.
    ///
    /// Kinds are corrected against the filesystem (editors that save by
    /// rename report stale kinds), directories are dropped, and the result
    /// is sorted by path.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<(PathBuf, ChangeKind)>> {
        if !self.is_ready() {
            return None;
        }

        let raw = std::mem::take(&mut self.changes);
        self.last_event = None;

        let mut changes: Vec<_> = raw
            .into_iter()
            .filter_map(|(path, kind)| {
                let kind = match (kind, path.exists()) {
                    (ChangeKind::Created, false) => return None,
                    (ChangeKind::Modified, false) => ChangeKind::Removed,
                    (ChangeKind::Removed, true) => ChangeKind::Modified,
                    (kind, _) => kind,
                };
                if kind != ChangeKind::Removed && !path.is_file() {
                    return None;
                }
                Some((path, kind))
            })
            .collect();

        if changes.is_empty() {
            return None;
        }
        changes.sort();
        Some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    /// Sleep duration until the quiet period could have elapsed.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp" | "crdownload")
        || name.ends_with('~')
        || name.starts_with(".#")
        || name == ".DS_Store"
        || name == "4913"
}
