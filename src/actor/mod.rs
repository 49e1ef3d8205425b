//! Actor System for Watch Mode
//!
//! Message-passing concurrency for `serve + watch`:
//!
//! ```text
//! FsActor --Trigger--> TaskActor (one per group) --(LiveReload)--> WsActor
//! (watch)              (coalesce + run)                          (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing and glob routing
//! - `task` - Per-group run state machine
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod task;
pub mod ws;

pub use coordinator::Coordinator;
