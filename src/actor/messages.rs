//! Actor Message Definitions
//!
//! ```text
//! FsActor --Trigger--> TaskActor --(LiveReload)--> WsActor
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

use crate::core::AssetGroup;

// =============================================================================
// TaskActor Messages
// =============================================================================

/// Messages to a group's TaskActor
#[derive(Debug)]
pub enum TaskMsg {
    /// Source files of the group changed
    Trigger(Vec<PathBuf>),
    /// A run finished; `failed` is true when it ended with an error
    Finished { failed: bool },
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Swap a stylesheet in place
    Css { path: String },
    /// Reload page
    Reload { reason: String },
    /// Task error (display overlay, no reload)
    Error {
        group: AssetGroup,
        title: String,
        message: String,
    },
    /// Clear the overlay raised by `group`
    ClearError { group: AssetGroup },
    /// Add client
    AddClient(TcpStream),
    /// Shutdown
    Shutdown,
}
