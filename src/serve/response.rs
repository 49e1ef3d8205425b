//! HTTP response handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::embed::{hotreload_js, hotreload_tag};
use crate::utils::mime::{self, types};

/// Respond with a static file, injecting the hot reload client into HTML.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = maybe_inject_hotreload(body, content_type, ws_port);

    send_body(request, 200, content_type, body)
}

/// Respond with `dist/404.html` when present, plain text otherwise.
pub fn respond_not_found(request: Request, root: &Path, ws_port: Option<u16>) -> Result<()> {
    let custom_404 = root.join("404.html");
    let has_custom = custom_404.is_file();

    if is_head_request(&request) {
        let mime = if has_custom { types::HTML } else { types::PLAIN };
        return send_head(request, 404, mime);
    }

    if has_custom && let Ok(body) = fs::read(&custom_404) {
        let body = maybe_inject_hotreload(body, types::HTML, ws_port);
        return send_body(request, 404, types::HTML, body);
    }

    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with hotreload.js from memory.
pub fn respond_hotreload_js(request: Request, ws_port: u16) -> Result<()> {
    let body = hotreload_js(ws_port);
    send_body(request, 200, types::JAVASCRIPT, body.into_bytes())
}

/// Inject the hot reload client if the body is HTML and live reload is up.
pub fn maybe_inject_hotreload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    if !mime::is_html(content_type) || ws_port.is_none() {
        return body;
    }
    inject_before_body_end(&body, hotreload_tag().as_bytes())
}

/// Insert `script` before the last `</body>`, or append it when there is none.
fn inject_before_body_end(content: &[u8], script: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-store"));
    request.respond(response)?;
    Ok(())
}

fn send_body(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-store"));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    // Static ASCII names and values always form a valid header
    Header::from_bytes(key, value).unwrap_or_else(|()| unreachable!("invalid header {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body_end() {
        let out = maybe_inject_hotreload(
            b"<html><body><p>x</p></body></html>".to_vec(),
            types::HTML,
            Some(35729),
        );
        let html = String::from_utf8(out).unwrap();
        assert_eq!(
            html,
            format!("<html><body><p>x</p>{}</body></html>", hotreload_tag())
        );
    }

    #[test]
    fn test_inject_uses_last_body_and_ignores_case() {
        let out = inject_before_body_end(b"<pre></body></pre><BODY></BODY>", b"<s>");
        assert_eq!(out, b"<pre></body></pre><BODY><s></BODY>");
    }

    #[test]
    fn test_inject_appends_without_body() {
        let out = inject_before_body_end(b"<p>fragment</p>", b"<s>");
        assert_eq!(out, b"<p>fragment</p><s>");
    }

    #[test]
    fn test_no_injection_for_other_types() {
        let css = b"a{}".to_vec();
        assert_eq!(maybe_inject_hotreload(css.clone(), types::CSS, Some(1)), css);
    }

    #[test]
    fn test_no_injection_without_websocket() {
        let html = b"<body></body>".to_vec();
        assert_eq!(maybe_inject_hotreload(html.clone(), types::HTML, None), html);
    }
}
