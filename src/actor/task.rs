//! Task Actor - one per asset group
//!
//! Serializes runs of a group and coalesces triggers that arrive while a run
//! is in flight into exactly one follow-up run.
//!
//! ```text
//!            trigger              trigger
//!   Idle ───────────▶ Running ───────────▶ RunPending ─┐ trigger
//!    ▲                 │   ▲                  │   ▲    │
//!    └──── finish ─────┘   └───── finish ─────┘   └────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::TaskMsg;
use crate::core::AssetGroup;

/// A group run. Receives whether the previous run failed and returns
/// whether this one did. Executed on the blocking pool.
pub type TaskJob = Arc<dyn Fn(bool) -> bool + Send + Sync>;

/// Run state of one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    /// Running, and at least one trigger arrived since it started.
    RunPending,
}

impl RunState {
    /// Record a trigger. Returns true when a run should start now.
    pub fn trigger(&mut self) -> bool {
        match self {
            Self::Idle => {
                *self = Self::Running;
                true
            }
            Self::Running | Self::RunPending => {
                *self = Self::RunPending;
                false
            }
        }
    }

    /// Record the end of a run. Returns true when the follow-up run should
    /// start now.
    pub fn finish(&mut self) -> bool {
        match self {
            Self::RunPending => {
                *self = Self::Running;
                true
            }
            Self::Running | Self::Idle => {
                *self = Self::Idle;
                false
            }
        }
    }
}

/// Task Actor - runs one group's job on demand
pub struct TaskActor {
    group: AssetGroup,
    rx: mpsc::Receiver<TaskMsg>,
    /// Own inbox, for `Finished` reports from spawned runs
    tx: mpsc::Sender<TaskMsg>,
    job: TaskJob,
    state: RunState,
    /// Whether the last completed run failed
    failed: bool,
}

impl TaskActor {
    pub fn new(
        group: AssetGroup,
        rx: mpsc::Receiver<TaskMsg>,
        tx: mpsc::Sender<TaskMsg>,
        job: TaskJob,
    ) -> Self {
        Self {
            group,
            rx,
            tx,
            job,
            state: RunState::Idle,
            failed: false,
        }
    }

    /// Seed the failure flag from the initial batch, so the first successful
    /// run clears the error overlay.
    pub fn with_failed(mut self, failed: bool) -> Self {
        self.failed = failed;
        self
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                TaskMsg::Trigger(paths) => {
                    log_trigger(self.group, &paths);
                    if self.state.trigger() {
                        self.spawn_run();
                    } else {
                        crate::debug!(self.group.name(); "run in flight, queued follow-up");
                    }
                }

                TaskMsg::Finished { failed } => {
                    self.failed = failed;
                    if self.state.finish() {
                        self.spawn_run();
                    }
                }

                TaskMsg::Shutdown => {
                    crate::debug!(self.group.name(); "shutting down");
                    break;
                }
            }
        }
    }

    fn spawn_run(&self) {
        let job = Arc::clone(&self.job);
        let tx = self.tx.clone();
        let failed_before = self.failed;
        let group = self.group;

        tokio::spawn(async move {
            let failed = match tokio::task::spawn_blocking(move || job(failed_before)).await {
                Ok(failed) => failed,
                Err(e) => {
                    crate::log!(group.name(); "run panicked: {}", e);
                    true
                }
            };
            let _ = tx.send(TaskMsg::Finished { failed }).await;
        });
    }
}

fn log_trigger(group: AssetGroup, paths: &[PathBuf]) {
    for path in paths {
        crate::debug!(group.name(); "changed: {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_idle_trigger_starts_run() {
        let mut state = RunState::Idle;
        assert!(state.trigger());
        assert_eq!(state, RunState::Running);
    }

    #[test]
    fn test_triggers_while_running_coalesce() {
        let mut state = RunState::Running;
        assert!(!state.trigger());
        assert!(!state.trigger());
        assert!(!state.trigger());
        assert_eq!(state, RunState::RunPending);
    }

    #[test]
    fn test_finish_with_pending_runs_once_more() {
        let mut state = RunState::RunPending;
        assert!(state.finish());
        assert_eq!(state, RunState::Running);
        assert!(!state.finish());
        assert_eq!(state, RunState::Idle);
    }

    #[test]
    fn test_finish_without_pending_goes_idle() {
        let mut state = RunState::Running;
        assert!(!state.finish());
        assert_eq!(state, RunState::Idle);
    }

    async fn wait_for(counter: &AtomicUsize, expected: usize) {
        for _ in 0..200 {
            if counter.load(Ordering::SeqCst) >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_burst_during_run_gives_one_follow_up() {
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let job: TaskJob = {
            let started = Arc::clone(&started);
            let finished = Arc::clone(&finished);
            Arc::new(move |_| {
                started.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(150));
                finished.fetch_add(1, Ordering::SeqCst);
                false
            })
        };

        let (tx, rx) = mpsc::channel(32);
        let actor = TaskActor::new(AssetGroup::Styles, rx, tx.clone(), job);
        let handle = tokio::spawn(actor.run());

        tx.send(TaskMsg::Trigger(vec![])).await.unwrap();
        wait_for(&started, 1).await;
        for _ in 0..5 {
            tx.send(TaskMsg::Trigger(vec![])).await.unwrap();
        }

        wait_for(&finished, 2).await;
        // Give a spurious third run the chance to show up
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(finished.load(Ordering::SeqCst), 2);

        tx.send(TaskMsg::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failure_flag_reaches_next_run() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let job: TaskJob = {
            let seen = Arc::clone(&seen);
            Arc::new(move |failed_before| {
                let mut seen = seen.lock();
                seen.push(failed_before);
                // First run fails, second succeeds
                seen.len() == 1
            })
        };

        let (tx, rx) = mpsc::channel(32);
        let handle = tokio::spawn(TaskActor::new(AssetGroup::Html, rx, tx.clone(), job).run());

        tx.send(TaskMsg::Trigger(vec![])).await.unwrap();
        for _ in 0..100 {
            if seen.lock().len() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        // Let the Finished report land before the next trigger
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(TaskMsg::Trigger(vec![])).await.unwrap();
        for _ in 0..100 {
            if seen.lock().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(*seen.lock(), vec![false, true]);
        tx.send(TaskMsg::Shutdown).await.unwrap();
        handle.await.unwrap();
    }
}
