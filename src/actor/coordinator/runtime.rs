use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::{FsActor, TaskSenders};
use crate::actor::messages::{TaskMsg, WsMsg};
use crate::actor::task::TaskActor;
use crate::actor::ws::WsActor;

/// Run all actors concurrently until shutdown.
pub(super) async fn run_actors(
    fs: FsActor,
    tasks: Vec<TaskActor>,
    ws: WsActor,
    senders: &TaskSenders,
    ws_tx: &mpsc::UnboundedSender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let fs_handle = tokio::spawn(fs.run());
    let ws_handle = tokio::spawn(ws.run());
    let task_handles: Vec<_> = tasks.into_iter().map(|t| tokio::spawn(t.run())).collect();

    match shutdown_rx {
        Some(rx) => loop {
            if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        },
        None => {
            let _ = fs_handle.await;
        }
    }

    for tx in senders.values() {
        let _ = tx.send(TaskMsg::Shutdown).await;
    }
    let _ = ws_tx.send(WsMsg::Shutdown);

    let _ = tokio::time::timeout(Duration::from_millis(500), async {
        for handle in task_handles {
            let _ = handle.await;
        }
        let _ = ws_handle.await;
    })
    .await;
}
