//! `[sprites]` section configuration.
//!
//! ```toml
//! [sprites]
//! mode = "stack"        # "stack" | "symbol"
//! file = "sprite.svg"   # written into the sprites destination
//! ```

use serde::{Deserialize, Serialize};

/// Sprite sheet layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteMode {
    /// Nested `<svg id>` views, addressable as `sprite.svg#icon`.
    #[default]
    Stack,
    /// `<symbol id>` definitions for `<use href="sprite.svg#icon">`.
    Symbol,
}

/// SVG sprite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpritesConfig {
    pub mode: SpriteMode,
    /// Sprite file name.
    pub file: String,
}

impl Default for SpritesConfig {
    fn default() -> Self {
        Self {
            mode: SpriteMode::Stack,
            file: "sprite.svg".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SpriteMode;
    use crate::config::test_parse_config;

    #[test]
    fn test_sprites_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.sprites.mode, SpriteMode::Stack);
        assert_eq!(config.sprites.file, "sprite.svg");
    }

    #[test]
    fn test_sprites_symbol_mode() {
        let config = test_parse_config("[sprites]\nmode = \"symbol\"");
        assert_eq!(config.sprites.mode, SpriteMode::Symbol);
    }
}
