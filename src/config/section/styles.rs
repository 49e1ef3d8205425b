//! `[styles]` section configuration.
//!
//! ```toml
//! [styles]
//! bundle = "main"                                   # -> main.min.css + map
//! browsers = ["chrome 80", "firefox 78", "safari 13"] # vendor prefix targets
//! ```

use lightningcss::targets::Browsers;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Stylesheet bundling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Bundle base name.
    pub bundle: String,
    /// Oldest browser versions to prefix for, as `"<browser> <version>"`.
    pub browsers: Vec<String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            bundle: "main".into(),
            browsers: ["chrome 80", "edge 88", "firefox 78", "safari 13", "ios_saf 13"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl StylesConfig {
    /// Resolve the browser list into lightningcss targets.
    pub fn targets(&self) -> Result<Browsers, ConfigError> {
        let mut browsers = Browsers::default();
        for entry in &self.browsers {
            let (name, version) = parse_browser(entry)?;
            let slot = match name {
                "android" => &mut browsers.android,
                "chrome" => &mut browsers.chrome,
                "edge" => &mut browsers.edge,
                "firefox" => &mut browsers.firefox,
                "ie" => &mut browsers.ie,
                "ios_saf" => &mut browsers.ios_saf,
                "opera" => &mut browsers.opera,
                "safari" => &mut browsers.safari,
                "samsung" => &mut browsers.samsung,
                other => {
                    return Err(ConfigError::Validation(format!(
                        "styles.browsers: unknown browser `{other}`"
                    )));
                }
            };
            // Keep the oldest version when a browser is listed twice.
            *slot = Some(slot.map_or(version, |v| v.min(version)));
        }
        Ok(browsers)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bundle.trim().is_empty() {
            return Err(ConfigError::Validation("styles.bundle is empty".into()));
        }
        self.targets().map(|_| ())
    }
}

/// Parse `"safari 13.1"` into `("safari", 13 << 16 | 1 << 8)`.
fn parse_browser(entry: &str) -> Result<(&str, u32), ConfigError> {
    let invalid = || ConfigError::Validation(format!("styles.browsers: invalid entry `{entry}`"));

    let mut parts = entry.split_whitespace();
    let (Some(name), Some(version), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let mut numbers = version.split('.');
    let major: u32 = numbers.next().and_then(|n| n.parse().ok()).ok_or_else(invalid)?;
    let minor: u32 = match numbers.next() {
        Some(n) => n.parse().map_err(|_| invalid())?,
        None => 0,
    };
    if major > 0xff || minor > 0xff {
        return Err(invalid());
    }

    Ok((name, (major << 16) | (minor << 8)))
}
