//! Pipeline composer: what each CLI task does.
//!
//! ```text
//! default:  Clean ─▶ lib, fonts, html, scripts, styles, images, sprites (parallel)
//!                 ─▶ dev server + watch (until Ctrl+C)
//! <group>:  that group's task, once
//! clean:    Clean
//! ```
//!
//! In the initial batch every group runs to completion, even when another
//! one fails fatally. Fatal failures are then reported together and abort
//! before anything is served.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;

use crate::actor::Coordinator;
use crate::cli::Commands;
use crate::config::PipelineConfig;
use crate::core::AssetGroup;
use crate::logger::ProgressLine;
use crate::reload::LiveReload;
use crate::task::{self, TaskError, TaskOutcome, TaskRunner};
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// Run a CLI task to completion.
pub fn run(task: Commands, config: PipelineConfig) -> Result<()> {
    let config = Arc::new(config);
    match (task, task.group()) {
        (Commands::Default, _) => run_default(config),
        (Commands::Clean, _) => run_clean(&config),
        (_, Some(group)) => run_single(config, group),
        (_, None) => Ok(()),
    }
}

/// Run one group, outside of watch mode.
fn run_single(config: Arc<PipelineConfig>, group: AssetGroup) -> Result<()> {
    let runner = TaskRunner::new(config, LiveReload::disabled());
    match runner.run_guarded(group, false)? {
        TaskOutcome::Done(report) => log!(group.name(); "{}", report.message()),
        TaskOutcome::Recovered(err) => log!("error"; "{}: {}", group.error_title(), err),
    }
    Ok(())
}

fn run_clean(config: &PipelineConfig) -> Result<()> {
    let dist = &config.paths.dist;
    let removed = task::clean(dist, &config.paths.preserve)
        .with_context(|| format!("failed to clean {}", config.root_relative(dist).display()))?;
    log!(
        "clean";
        "removed {} from {}",
        plural_count(removed, "item"),
        config.root_relative(dist).display()
    );
    Ok(())
}

/// Clean, build every group, then serve and watch.
fn run_default(config: Arc<PipelineConfig>) -> Result<()> {
    run_clean(&config)?;

    let coordinator = Coordinator::new(Arc::clone(&config));
    let runner = TaskRunner::new(Arc::clone(&config), coordinator.live());
    let recovered = run_batch(&runner)?;

    let server = crate::serve::bind_server(&config)?;
    debug!("serve"; "serving {}", server.addr());
    server.run(coordinator.with_failed(recovered))
}

/// Run every group in parallel. Returns the groups that ended with a
/// recoverable error; fails when any group failed fatally.
fn run_batch(runner: &TaskRunner) -> Result<Vec<AssetGroup>> {
    let progress = ProgressLine::new(&AssetGroup::ALL.map(AssetGroup::name));

    let results: Vec<(AssetGroup, Result<TaskOutcome, TaskError>)> = AssetGroup::ALL
        .par_iter()
        .map(|&group| {
            let result = runner.run_guarded(group, false);
            progress.done(group.name());
            (group, result)
        })
        .collect();
    progress.finish();

    let mut recovered = Vec::new();
    let mut fatal = Vec::new();
    for (group, result) in results {
        match result {
            Ok(TaskOutcome::Done(report)) => debug!(group.name(); "{}", report.message()),
            Ok(TaskOutcome::Recovered(err)) => {
                log!("error"; "{}: {}", group.error_title(), err);
                recovered.push(group);
            }
            Err(err) => fatal.push(format!("{group}: {:#}", anyhow::Error::from(err))),
        }
    }

    if !fatal.is_empty() {
        bail!(
            "{} failed:\n  {}",
            plural_count(fatal.len(), "group"),
            fatal.join("\n  ")
        );
    }
    Ok(recovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::path::normalize_path;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, PipelineConfig) {
        let dir = TempDir::new().unwrap();
        let root = normalize_path(dir.path());
        fs::create_dir_all(root.join("src/assets/styles")).unwrap();
        let config = PipelineConfig::for_root(&root).unwrap();
        (dir, config)
    }

    #[test]
    fn test_batch_collects_recovered_groups() {
        let (_dir, config) = project();
        let root = config.root.clone();
        fs::write(root.join("src/assets/styles/main.scss"), ".a {").unwrap();
        fs::write(root.join("src/index.html"), "<p>ok</p>").unwrap();

        let runner = TaskRunner::new(Arc::new(config), LiveReload::disabled());
        let recovered = run_batch(&runner).unwrap();
        assert_eq!(recovered, vec![AssetGroup::Styles]);
        assert!(root.join("dist/index.html").is_file(), "other groups still ran");
    }

    #[test]
    fn test_batch_builds_bundles_and_maps() {
        let (_dir, config) = project();
        let root = config.root.clone();
        fs::write(root.join("src/assets/styles/main.scss"), "$c: red;\n.a { color: $c; }\n").unwrap();
        fs::create_dir_all(root.join("src/assets/js")).unwrap();
        fs::write(root.join("src/assets/js/app.js"), "console.log('ready');\n").unwrap();
        fs::write(root.join("src/index.html"), "<html><body><p>home</p></body></html>").unwrap();

        let runner = TaskRunner::new(Arc::new(config), LiveReload::disabled());
        assert!(run_batch(&runner).unwrap().is_empty());

        for output in [
            "dist/assets/styles/main.min.css",
            "dist/assets/styles/main.min.css.map",
            "dist/assets/js/main.min.js",
            "dist/assets/js/main.min.js.map",
            "dist/index.html",
        ] {
            let len = fs::metadata(root.join(output)).map(|m| m.len()).unwrap_or(0);
            assert!(len > 0, "{output} is missing or empty");
        }
    }

    #[test]
    fn test_batch_fails_on_missing_source() {
        let (dir, config) = project();
        fs::remove_dir_all(dir.path().join("src")).unwrap();

        let runner = TaskRunner::new(Arc::new(config), LiveReload::disabled());
        let err = run_batch(&runner).unwrap_err().to_string();
        assert!(err.starts_with("7 groups failed"), "{err}");
        assert!(err.contains("styles: source directory"), "{err}");
    }

    #[test]
    fn test_single_task_writes_output() {
        let (_dir, config) = project();
        let root = config.root.clone();
        fs::write(root.join("src/assets/styles/main.scss"), ".a { color: red; }").unwrap();

        run(Commands::Styles, config).unwrap();
        assert!(root.join("dist/assets/styles/main.min.css").is_file());
    }

    #[test]
    fn test_clean_task_keeps_images() {
        let (_dir, config) = project();
        let root = config.root.clone();
        fs::create_dir_all(root.join("dist/assets/images")).unwrap();
        fs::write(root.join("dist/assets/images/a.png"), "png").unwrap();
        fs::write(root.join("dist/index.html"), "old").unwrap();

        run(Commands::Clean, config).unwrap();
        assert!(root.join("dist/assets/images/a.png").is_file());
        assert!(!root.join("dist/index.html").exists());
    }
}
