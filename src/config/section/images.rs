//! `[images]` section configuration.
//!
//! ```toml
//! [images]
//! jpeg_quality = 80
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Image optimization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// JPEG re-encode quality (1-100).
    pub jpeg_quality: u8,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { jpeg_quality: 80 }
    }
}

impl ImagesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Validation(format!(
                "images.jpeg_quality must be within 1-100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_images_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.images.jpeg_quality, 80);
        assert!(config.images.validate().is_ok());
    }

    #[test]
    fn test_images_quality_out_of_range() {
        let config = test_parse_config("[images]\njpeg_quality = 0");
        assert!(config.images.validate().is_err());
    }
}
