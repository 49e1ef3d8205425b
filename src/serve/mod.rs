//! Development server: static files from `dist/` plus live reload.
//!
//! HTML responses get the hot reload client injected before `</body>`; the
//! client itself is served from memory at [`HOTRELOAD_URL`].

mod lifecycle;
mod path;
mod response;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::actor::Coordinator;
use crate::config::PipelineConfig;
use crate::embed::HOTRELOAD_URL;
use crate::{debug, log};

/// Actual WebSocket port (may differ from the configured one if it was in use)
/// Updated by the coordinator after the WebSocket server binds
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Update the actual WebSocket port (called by coordinator after binding)
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

/// Get the actual WebSocket port, None until the WebSocket server is up
fn get_actual_ws_port() -> Option<u16> {
    match ACTUAL_WS_PORT.load(Ordering::Relaxed) {
        0 => None,
        port => Some(port),
    }
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    root: Arc<PathBuf>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop
pub fn bind_server(config: &PipelineConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        addr,
        root: Arc::new(config.paths.dist.clone()),
        shutdown_rx,
    })
}

impl BoundServer {
    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the actor system and the request loop (blocking until Ctrl+C).
    pub fn run(self, coordinator: Coordinator) -> Result<()> {
        let actor_handle =
            lifecycle::spawn_actors(coordinator.with_shutdown_signal(self.shutdown_rx));
        let result = run_request_loop(&self.server, &self.root);
        lifecycle::wait_for_shutdown(actor_handle);
        result
    }
}

fn run_request_loop(server: &Server, root: &Arc<PathBuf>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let root = Arc::clone(root);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &root) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, root: &Path) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let ws_port = get_actual_ws_port();
    if let Some(port) = ws_port
        && request.url().split('?').next() == Some(HOTRELOAD_URL)
    {
        return response::respond_hotreload_js(request, port);
    }

    debug!("serve"; "{} {}", request.method(), request.url());

    match path::resolve_path(request.url(), root) {
        Some(file) => response::respond_file(request, &file, ws_port),
        None => response::respond_not_found(request, root, ws_port),
    }
}
