use tungstenite::protocol::Message;

use crate::reload::message::HotReloadMessage;

use super::WsActor;

impl WsActor {
    pub(super) fn text(msg: &HotReloadMessage) -> Message {
        Message::Text(msg.to_json().into())
    }

    /// Broadcast a message to all connected clients
    pub(super) fn broadcast(&self, msg: &HotReloadMessage) {
        let mut clients = self.clients.lock();
        let count = clients.len();

        if count == 0 {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        let msg = Self::text(msg);
        clients.retain_mut(|ws| match ws.send(msg.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", count);
    }
}
