//! Utility modules for the asset pipeline.

pub mod glob;
pub mod mime;
pub mod path;
pub mod plural;
pub mod size;
