//! Live reload handle.
//!
//! Tasks report results through a [`LiveReload`] handle instead of talking to
//! the WebSocket actor directly. The handle is cheap to clone and is a no-op
//! when no dev server is running (single tasks, initial batch).

use tokio::sync::mpsc::UnboundedSender;

use crate::actor::messages::WsMsg;
use crate::core::AssetGroup;

#[derive(Debug, Clone, Default)]
pub struct LiveReload {
    tx: Option<UnboundedSender<WsMsg>>,
}

impl LiveReload {
    /// Handle connected to the WebSocket actor.
    pub fn new(tx: UnboundedSender<WsMsg>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Handle that drops every notification.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Swap a stylesheet in connected browsers.
    pub fn css(&self, path: String) {
        self.send(WsMsg::Css { path });
    }

    /// Reload connected browsers.
    pub fn reload(&self, reason: String) {
        self.send(WsMsg::Reload { reason });
    }

    /// Show an error overlay for `group`.
    pub fn error(&self, group: AssetGroup, message: String) {
        self.send(WsMsg::Error {
            group,
            title: group.error_title().to_string(),
            message,
        });
    }

    /// Remove the overlay raised by `group`.
    pub fn clear_error(&self, group: AssetGroup) {
        self.send(WsMsg::ClearError { group });
    }

    fn send(&self, msg: WsMsg) {
        if let Some(tx) = &self.tx
            && tx.send(msg).is_err()
        {
            crate::debug!("reload"; "websocket actor gone, notification dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_disabled_is_noop() {
        LiveReload::disabled().reload("x".into());
    }

    #[test]
    fn test_messages_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let live = LiveReload::new(tx);

        live.css("/main.min.css".into());
        live.error(AssetGroup::Styles, "bad".into());
        live.clear_error(AssetGroup::Styles);

        assert!(matches!(rx.try_recv(), Ok(WsMsg::Css { path }) if path == "/main.min.css"));
        assert!(matches!(
            rx.try_recv(),
            Ok(WsMsg::Error { group: AssetGroup::Styles, title, .. }) if title == "SCSS Error"
        ));
        assert!(matches!(
            rx.try_recv(),
            Ok(WsMsg::ClearError { group: AssetGroup::Styles })
        ));
    }
}
