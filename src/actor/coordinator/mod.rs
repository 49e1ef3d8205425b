//! Actor Coordinator - Wires up the Watch Mode Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Starts the WebSocket server
//! - Wires up one TaskActor per asset group, the FsActor and the WsActor
//! - Runs them concurrently until shutdown
//!
//! The WebSocket channel exists before the actors do: the initial batch
//! reports through [`Coordinator::live`], and the WsActor replays whatever
//! errors it raised to the first browsers that connect.

mod runtime;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use crossbeam::channel::Receiver;
use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

use super::fs::{FsActor, TaskSenders, WatchBindings};
use super::messages::WsMsg;
use super::task::{TaskActor, TaskJob};
use super::ws::WsActor;
use crate::config::PipelineConfig;
use crate::core::AssetGroup;
use crate::reload::LiveReload;
use crate::task::TaskRunner;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<PipelineConfig>,
    ws_tx: mpsc::UnboundedSender<WsMsg>,
    ws_rx: mpsc::UnboundedReceiver<WsMsg>,
    /// Groups whose initial run failed
    failed: FxHashSet<AssetGroup>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        let (ws_tx, ws_rx) = mpsc::unbounded_channel();
        Self {
            config,
            ws_tx,
            ws_rx,
            failed: FxHashSet::default(),
            shutdown_rx: None,
        }
    }

    /// Live reload handle feeding this coordinator's WsActor.
    pub fn live(&self) -> LiveReload {
        LiveReload::new(self.ws_tx.clone())
    }

    /// Mark groups whose last run failed, so their next success clears the overlay.
    pub fn with_failed(mut self, groups: impl IntoIterator<Item = AssetGroup>) -> Self {
        self.failed.extend(groups);
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(self) -> Result<()> {
        let Self {
            config,
            ws_tx,
            ws_rx,
            failed,
            shutdown_rx,
        } = self;

        let interface = config.serve.interface;
        match crate::reload::server::start_ws_server(interface, config.serve.ws_port, ws_tx.clone()) {
            Ok(port) => {
                crate::serve::set_actual_ws_port(port);
                crate::debug!("hotreload"; "ws://{}:{}", interface, port);
            }
            Err(e) => crate::log!("actor"; "websocket server failed: {:#}", e),
        }

        let runner = TaskRunner::new(Arc::clone(&config), LiveReload::new(ws_tx.clone()));
        let mut senders = TaskSenders::default();
        let mut tasks = Vec::with_capacity(AssetGroup::ALL.len());

        for group in AssetGroup::ALL {
            let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);
            let runner = runner.clone();
            let job: TaskJob = Arc::new(move |failed_before| runner.run_watched(group, failed_before));
            tasks.push(TaskActor::new(group, rx, tx.clone(), job).with_failed(failed.contains(&group)));
            senders.insert(group, tx);
        }

        let bindings = WatchBindings::new(&config).map_err(|e| anyhow!("invalid pattern: {e}"))?;
        let fs_actor = FsActor::new(bindings, senders.clone())
            .map_err(|e| anyhow!("watcher failed: {}", e))?;
        let ws_actor = WsActor::new(ws_rx);

        crate::log!("watch"; "watching {}", config.root_relative(&config.paths.src).display());
        runtime::run_actors(fs_actor, tasks, ws_actor, &senders, &ws_tx, shutdown_rx).await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
