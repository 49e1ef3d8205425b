//! Hot Reload Message Protocol
//!
//! JSON messages pushed from the dev server to browser clients.
//!
//! # Message Types
//!
//! - `connected`: Handshake acknowledgement
//! - `css`: Swap one stylesheet in place (no page reload)
//! - `reload`: Trigger full page reload
//! - `error`: Show the error overlay
//! - `clear_error`: Hide the error overlay

use serde::{Deserialize, Serialize};

/// Hot reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Stylesheet update
    Css {
        /// URL path of the stylesheet (e.g., "/assets/styles/main.min.css")
        path: String,
    },

    /// Full page reload
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Task error (display overlay, no reload)
    Error { title: String, message: String },

    /// Clear error overlay (task succeeded after error)
    #[serde(rename = "clear_error")]
    ClearError,
}

impl HotReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn css(path: impl Into<String>) -> Self {
        Self::Css { path: path.into() }
    }

    pub fn reload_with_reason(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn parse(msg: &HotReloadMessage) -> Value {
        serde_json::from_str(&msg.to_json()).unwrap()
    }

    #[test]
    fn test_css_message() {
        let msg = HotReloadMessage::css("/assets/styles/main.min.css");
        assert_eq!(
            parse(&msg),
            json!({"type": "css", "path": "/assets/styles/main.min.css"})
        );
    }

    #[test]
    fn test_reload_message() {
        let msg = HotReloadMessage::reload_with_reason("scripts changed");
        assert_eq!(parse(&msg), json!({"type": "reload", "reason": "scripts changed"}));

        let bare = HotReloadMessage::Reload { reason: None };
        assert_eq!(bare.to_json(), r#"{"type":"reload"}"#);
    }

    #[test]
    fn test_error_and_clear() {
        let msg = HotReloadMessage::error("SCSS Error", "main.scss: expected `;`");
        assert_eq!(
            parse(&msg),
            json!({"type": "error", "title": "SCSS Error", "message": "main.scss: expected `;`"})
        );
        assert_eq!(HotReloadMessage::ClearError.to_json(), r#"{"type":"clear_error"}"#);
    }

    #[test]
    fn test_connected_carries_version() {
        let value = parse(&HotReloadMessage::connected());
        assert_eq!(value["type"], "connected");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_round_trip_through_serde() {
        let msg = HotReloadMessage::css("/a.css");
        let back: HotReloadMessage = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(back, msg);
    }
}
