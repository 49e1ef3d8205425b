//! Process-wide shutdown state.
//!
//! Ctrl+C sets a flag the watch loops poll. Once the dev server runs, it
//! also unblocks the request loop and wakes the actor runtime; a one-shot
//! task just exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use crossbeam::channel::Sender;
use tiny_http::Server;

/// Exit status of a task interrupted by Ctrl+C.
const INTERRUPTED: i32 = 130;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Set once the dev server is bound.
static SERVING: OnceLock<Serving> = OnceLock::new();

struct Serving {
    server: Arc<Server>,
    actors: Sender<()>,
}

/// Install the Ctrl+C handler. Call once at program start.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(request_shutdown).context("failed to set Ctrl+C handler")
}

fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);

    let Some(serving) = SERVING.get() else {
        std::process::exit(INTERRUPTED);
    };
    crate::log!("serve"; "shutting down...");
    let _ = serving.actors.send(());
    serving.server.unblock();
}

/// Hand the bound server and the actors' wake-up channel to the Ctrl+C
/// handler. Only the first registration counts.
pub fn register_server(server: Arc<Server>, actors: Sender<()>) {
    let _ = SERVING.set(Serving { server, actors });
}

/// Whether Ctrl+C was pressed.
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
