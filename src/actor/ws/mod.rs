//! WebSocket Actor - Live Reload Broadcast
//!
//! This actor is responsible for:
//! - Managing WebSocket client connections
//! - Broadcasting css/reload/error messages to all connected clients
//! - Replaying outstanding errors to clients that connect later
//!
//! # Architecture
//!
//! ```text
//! TaskActor --(LiveReload)--> WsActor --[broadcast]--> Clients
//! ```

mod client_io;
mod delivery;

use std::collections::BTreeMap;
use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::core::AssetGroup;
use crate::reload::message::HotReloadMessage;

/// Error overlay content of one failed group.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingError {
    title: String,
    message: String,
}

impl PendingError {
    fn to_message(&self) -> HotReloadMessage {
        HotReloadMessage::error(&self.title, &self.message)
    }
}

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::UnboundedReceiver<WsMsg>,
    /// Connected clients (shared for broadcast + read threads)
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
    /// Outstanding errors, replayed to new clients
    errors: BTreeMap<AssetGroup, PendingError>,
}

impl WsActor {
    pub fn new(rx: mpsc::UnboundedReceiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            errors: BTreeMap::new(),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || {
            Self::client_reader_loop(clients_for_reader);
        });

        while let Some(msg) = self.rx.recv().await {
            if !self.handle(msg) {
                break;
            }
        }
    }

    /// Apply one message. Returns false on shutdown.
    fn handle(&mut self, msg: WsMsg) -> bool {
        match msg {
            WsMsg::Css { path } => {
                crate::debug!("ws"; "inject css: {}", path);
                self.broadcast(&HotReloadMessage::css(path));
            }

            WsMsg::Reload { reason } => {
                crate::debug!("ws"; "sending reload: {}", reason);
                self.broadcast(&HotReloadMessage::reload_with_reason(reason));
            }

            WsMsg::Error {
                group,
                title,
                message,
            } => {
                let error = PendingError { title, message };
                self.broadcast(&error.to_message());
                self.errors.insert(group, error);
            }

            WsMsg::ClearError { group } => {
                if self.errors.remove(&group).is_none() {
                    return true;
                }
                // Another group may still be broken; keep its overlay up
                match self.errors.values().next() {
                    Some(remaining) => self.broadcast(&remaining.to_message()),
                    None => self.broadcast(&HotReloadMessage::ClearError),
                }
            }

            WsMsg::AddClient(stream) => self.add_client(stream),

            WsMsg::Shutdown => {
                crate::debug!("ws"; "shutting down");
                for mut ws in self.clients.lock().drain(..) {
                    let _ = ws.close(None);
                }
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> WsActor {
        let (_tx, rx) = mpsc::unbounded_channel();
        WsActor::new(rx)
    }

    fn error(group: AssetGroup, message: &str) -> WsMsg {
        WsMsg::Error {
            group,
            title: group.error_title().to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_error_is_remembered_per_group() {
        let mut ws = actor();
        assert!(ws.handle(error(AssetGroup::Styles, "first")));
        assert!(ws.handle(error(AssetGroup::Styles, "second")));
        assert!(ws.handle(error(AssetGroup::Scripts, "js")));

        assert_eq!(ws.errors.len(), 2);
        assert_eq!(ws.errors[&AssetGroup::Styles].message, "second");
    }

    #[test]
    fn test_clear_error_only_removes_its_group() {
        let mut ws = actor();
        ws.handle(error(AssetGroup::Styles, "scss"));
        ws.handle(error(AssetGroup::Html, "html"));

        ws.handle(WsMsg::ClearError {
            group: AssetGroup::Styles,
        });
        assert_eq!(ws.errors.keys().copied().collect::<Vec<_>>(), [AssetGroup::Html]);

        ws.handle(WsMsg::ClearError {
            group: AssetGroup::Html,
        });
        assert!(ws.errors.is_empty());
    }

    #[test]
    fn test_clear_unknown_group_is_noop() {
        let mut ws = actor();
        ws.handle(error(AssetGroup::Html, "html"));
        assert!(ws.handle(WsMsg::ClearError {
            group: AssetGroup::Images,
        }));
        assert_eq!(ws.errors.len(), 1);
    }

    #[test]
    fn test_shutdown_stops() {
        let mut ws = actor();
        assert!(ws.handle(WsMsg::Reload {
            reason: "html".into(),
        }));
        assert!(!ws.handle(WsMsg::Shutdown));
    }
}
