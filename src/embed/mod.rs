//! Embedded static resources for the dev server.
//!
//! The hot reload client is minified by `build.rs` (overlay CSS inlined)
//! and served from memory, never written to `dist/`.

/// URL the injected `<script>` tag points at.
pub const HOTRELOAD_URL: &str = "/__assetpipe/hotreload.js";

/// Placeholder `build.rs` leaves in the client for the WebSocket port.
const WS_PORT_PLACEHOLDER: &str = "__ASSETPIPE_WS_PORT__";

const HOTRELOAD_CLIENT: &str = include_str!(concat!(env!("OUT_DIR"), "/hotreload.min.js"));

/// Live reload client script, connecting to `ws_port`.
pub fn hotreload_js(ws_port: u16) -> String {
    HOTRELOAD_CLIENT.replace(WS_PORT_PLACEHOLDER, &ws_port.to_string())
}

/// `<script>` tag injected into served HTML pages.
pub fn hotreload_tag() -> String {
    format!(r#"<script src="{HOTRELOAD_URL}" defer></script>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotreload_port_injected() {
        let js = hotreload_js(40001);
        assert!(js.contains("40001"));
        assert!(!js.contains(WS_PORT_PLACEHOLDER));
    }

    #[test]
    fn test_overlay_css_inlined() {
        let js = hotreload_js(1);
        assert!(!js.contains("__ASSETPIPE_OVERLAY_CSS__"));
        assert!(js.contains("__assetpipe_overlay"));
    }

    #[test]
    fn test_hotreload_tag() {
        assert!(hotreload_tag().contains(HOTRELOAD_URL));
    }
}
