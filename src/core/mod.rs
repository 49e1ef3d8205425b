//! Core types - pure abstractions shared across the codebase.

mod group;
mod state;

pub use group::{AssetGroup, ReloadKind};
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
