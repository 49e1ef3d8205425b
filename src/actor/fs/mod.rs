//! FileSystem Actor
//!
//! Watches the source tree and triggers the asset groups whose globs match
//! the changed paths. The watcher is created by the coordinator once the
//! initial batch has finished.
//!
//! ```text
//! Watcher → Debouncer (timing + dedup) → WatchBindings (glob routing) → TaskMsg::Trigger
//! ```

use notify::RecommendedWatcher;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use super::messages::TaskMsg;
use crate::core::AssetGroup;

// Pure timing and deduplication.
mod debouncer;
// Changed paths -> asset groups.
mod router;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


use debouncer::Debouncer;
pub use router::WatchBindings;
use router::log_changes;
use watch_roots::WatchRoots;

/// Per-group TaskActor inboxes.
pub type TaskSenders = FxHashMap<AssetGroup, mpsc::Sender<TaskMsg>>;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    bindings: WatchBindings,
    tasks: TaskSenders,
    debouncer: Debouncer,
}

impl FsActor {
    /// Start watching every root of `bindings` immediately.
    ///
    /// Events buffer in the notify channel until `run` is awaited.
    pub fn new(bindings: WatchBindings, tasks: TaskSenders) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(bindings.roots());
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            bindings,
            tasks,
            debouncer: Debouncer::new(),
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            bindings,
            tasks,
            mut debouncer,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify delivers on a std channel; bridge it into the runtime
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.add_event(&event),
                    None => break,
                },
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    if dispatch_changes(&mut debouncer, &bindings, &tasks).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Route ready changes to their groups.
///
/// Returns `Err(())` once every TaskActor has shut down.
async fn dispatch_changes(
    debouncer: &mut Debouncer,
    bindings: &WatchBindings,
    tasks: &TaskSenders,
) -> Result<(), ()> {
    if crate::core::is_shutdown() {
        return Err(());
    }

    let Some(changes) = debouncer.take_if_ready() else {
        return Ok(());
    };

    log_changes(&changes);

    let mut delivered = false;
    for (group, paths) in bindings.route(&changes) {
        let Some(tx) = tasks.get(&group) else {
            continue;
        };
        crate::debug!("watch"; "{} <- {} change(s)", group, paths.len());
        delivered |= tx.send(TaskMsg::Trigger(paths)).await.is_ok();
    }

    if !delivered && tasks.values().all(mpsc::Sender::is_closed) {
        return Err(());
    }
    Ok(())
}
