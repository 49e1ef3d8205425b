use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::reload::message::HotReloadMessage;

use super::WsActor;

impl WsActor {
    /// Handshake a new connection and greet it.
    ///
    /// The client receives `connected` followed by every outstanding error,
    /// so a page opened while a group is broken shows the overlay at once.
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Keep blocking mode during handshake, switch to non-blocking after
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };

        if let Err(e) = ws.send(Self::text(&HotReloadMessage::connected())) {
            crate::log!("ws"; "failed to send connected message: {}", e);
            return;
        }

        for error in self.errors.values() {
            if let Err(e) = ws.send(Self::text(&error.to_message())) {
                crate::debug!("ws"; "failed to send pending error: {}", e);
                return;
            }
        }

        let _ = ws.get_ref().set_nonblocking(true);

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }

    /// Background thread that drops clients once they disconnect.
    ///
    /// Clients never send anything meaningful; reads only surface closes.
    pub(super) fn client_reader_loop(clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>) {
        while !crate::core::is_shutdown() {
            std::thread::sleep(Duration::from_millis(100));

            clients.lock().retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => {
                    crate::debug!("ws"; "client closed");
                    false
                }
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    true
                }
                Err(_) => false,
            });
        }
    }
}
