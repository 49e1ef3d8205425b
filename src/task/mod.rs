//! Transform tasks.
//!
//! A task runs one asset group end to end:
//!
//! ```text
//! resolve globs -> read sources -> stage chain -> write -> live reload
//! ```
//!
//! [`TaskRunner::run`] returns every error. [`TaskRunner::run_guarded`] is
//! the task guard: it turns recoverable errors into a browser overlay and a
//! [`TaskOutcome::Recovered`], and lets fatal errors through.

mod chain;
pub mod clean;
mod error;


use std::path::PathBuf;
use std::sync::Arc;

use crate::asset::{Asset, WriteSummary, write_assets};
use crate::config::PipelineConfig;
use crate::core::{AssetGroup, ReloadKind};
use crate::logger::{status_error, status_success};
use crate::reload::LiveReload;
use crate::utils::glob::GlobSet;
use crate::utils::path::to_slash;
use crate::utils::plural::plural_count;
use crate::utils::size::format_bytes;

pub use chain::stage_chain;
pub use clean::clean;
pub use error::TaskError;

/// Result of a completed group run.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub group: AssetGroup,
    /// Source files matched.
    pub inputs: usize,
    /// Output paths, relative to `dest`.
    pub outputs: Vec<PathBuf>,
    pub dest: PathBuf,
    pub summary: WriteSummary,
    /// Total output size.
    pub bytes: u64,
}

impl TaskReport {
    /// One-line summary for the terminal.
    pub fn message(&self) -> String {
        if self.summary.written == 0 {
            return format!(
                "{}: {} up to date",
                self.group,
                plural_count(self.summary.unchanged, "file")
            );
        }
        format!(
            "{}: {} written ({}), {} unchanged",
            self.group,
            plural_count(self.summary.written, "file"),
            format_bytes(self.bytes),
            self.summary.unchanged
        )
    }

    /// Whether any output changed on disk.
    pub fn changed(&self) -> bool {
        self.summary.written > 0
    }
}

/// Outcome of a guarded run.
#[derive(Debug)]
pub enum TaskOutcome {
    Done(TaskReport),
    /// A recoverable error ended the run; nothing was written.
    Recovered(TaskError),
}

impl TaskOutcome {
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }
}

/// Runs asset groups against one configuration.
#[derive(Debug, Clone)]
pub struct TaskRunner {
    config: Arc<PipelineConfig>,
    live: LiveReload,
}

impl TaskRunner {
    pub fn new(config: Arc<PipelineConfig>, live: LiveReload) -> Self {
        Self { config, live }
    }

    /// Run `group` once. Nothing is written unless every stage succeeds.
    pub fn run(&self, group: AssetGroup) -> Result<TaskReport, TaskError> {
        let config = &self.config;
        if !config.paths.src.is_dir() {
            return Err(TaskError::MissingSource(config.paths.src.clone()));
        }

        let paths = config.paths.group(group);
        let globs = GlobSet::new(&config.root, paths)
            .map_err(|e| TaskError::Other(format!("paths.{group}: {e}")))?;

        let sources = globs.resolve().map_err(|e| {
            let path = e.path().unwrap_or(config.paths.src.as_path()).to_path_buf();
            TaskError::io(&path, e.into())
        })?;
        crate::debug!(group.name(); "{} matched", plural_count(sources.len(), "source"));

        let assets = sources
            .iter()
            .map(|file| Asset::read(file).map_err(|e| TaskError::io(&file.path, e)))
            .collect::<Result<Vec<_>, _>>()?;

        let outputs = stage_chain(group, config)?.run(assets)?;
        let summary = write_assets(&paths.dest, &outputs).map_err(|e| TaskError::io(&paths.dest, e))?;

        Ok(TaskReport {
            group,
            inputs: sources.len(),
            outputs: outputs.iter().map(|a| a.path.clone()).collect(),
            dest: paths.dest.clone(),
            summary,
            bytes: outputs.iter().map(Asset::len).sum(),
        })
    }

    /// Run `group` behind the task guard.
    ///
    /// `failed_before` tells whether the previous run of this group failed;
    /// a success then clears the browser overlay.
    pub fn run_guarded(&self, group: AssetGroup, failed_before: bool) -> Result<TaskOutcome, TaskError> {
        match self.run(group) {
            Ok(report) => {
                if failed_before {
                    self.live.clear_error(group);
                }
                if report.changed() {
                    self.notify(&report);
                }
                Ok(TaskOutcome::Done(report))
            }
            Err(err) if err.is_recoverable() => {
                self.live.error(group, err.to_string());
                Ok(TaskOutcome::Recovered(err))
            }
            Err(err) => Err(err),
        }
    }

    /// Run `group` for the watcher: every outcome is reported, none escapes.
    ///
    /// Returns whether the run failed.
    pub fn run_watched(&self, group: AssetGroup, failed_before: bool) -> bool {
        match self.run_guarded(group, failed_before) {
            Ok(TaskOutcome::Done(report)) => {
                status_success(&report.message());
                false
            }
            Ok(TaskOutcome::Recovered(err)) => {
                status_error(group.error_title(), &err.to_string());
                true
            }
            Err(err) => {
                let detail = format!("{:#}", anyhow::Error::from(err));
                status_error(&format!("{group} failed"), &detail);
                self.live.error(group, detail);
                true
            }
        }
    }

    fn notify(&self, report: &TaskReport) {
        let urls = match report.group.reload_kind() {
            ReloadKind::Inject => self.stylesheet_urls(report),
            ReloadKind::Full => None,
        };

        match urls {
            Some(urls) => urls.into_iter().for_each(|url| self.live.css(url)),
            None => self.live.reload(report.group.name().to_string()),
        }
    }

    /// URL paths of the stylesheets in `report`, as served from `dist`.
    ///
    /// None when the destination lies outside the served tree.
    fn stylesheet_urls(&self, report: &TaskReport) -> Option<Vec<String>> {
        let dest = report.dest.strip_prefix(&self.config.paths.dist).ok()?;
        let urls = report
            .outputs
            .iter()
            .filter(|p| p.extension().is_some_and(|e| e == "css"))
            .map(|p| format!("/{}", to_slash(&dest.join(p))))
            .collect();
        Some(urls)
    }
}
