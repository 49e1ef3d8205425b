//! Reload Module
//!
//! WebSocket-based live reload for the dev server.
//!
//! ```text
//! TaskActor --LiveReload--> WsActor --JSON--> Browser
//! ```
//!
//! # Modules
//!
//! - `live` - `LiveReload` handle given to tasks
//! - `message` - Hot reload message types (css, reload, error)
//! - `server` - WebSocket acceptor feeding the WsActor

pub mod live;
pub mod message;
pub mod server;

pub use live::LiveReload;
