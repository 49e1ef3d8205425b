//! `[scripts]` section configuration.
//!
//! ```toml
//! [scripts]
//! bundle = "main"      # -> main.min.js + main.min.js.map
//! target = "es2015"    # transpile target
//! ```

use std::str::FromStr;

use oxc::syntax::es_target::ESTarget;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Script bundling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Bundle base name.
    pub bundle: String,
    /// Language level scripts are transpiled down to (e.g. `es2015`, `es2017`).
    pub target: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            bundle: "main".into(),
            target: "es2015".into(),
        }
    }
}

impl ScriptsConfig {
    /// Parsed transpile target.
    pub fn es_target(&self) -> Result<ESTarget, ConfigError> {
        ESTarget::from_str(&self.target)
            .map_err(|e| ConfigError::Validation(format!("scripts.target: {e}")))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bundle.is_empty() {
            return Err(ConfigError::Validation("scripts.bundle is empty".into()));
        }
        self.es_target().map(|_| ())
    }
}
