//! Freshness detection by mtime, for incremental image optimization.

pub mod mtime;

pub use mtime::{get_mtime, is_output_fresh};
