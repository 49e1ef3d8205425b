//! Configuration section definitions.
//!
//! Each section maps to a top-level table in `assetpipe.toml`.

mod images;
mod paths;
mod scripts;
mod serve;
mod sprites;
mod styles;

pub use images::ImagesConfig;
pub use paths::{GroupPaths, PathsConfig};
pub use scripts::ScriptsConfig;
pub use serve::ServeConfig;
pub use sprites::{SpriteMode, SpritesConfig};
pub use styles::StylesConfig;
