//! Image stages: incremental skip and per-format optimization.
//!
//! | format             | optimization                                 |
//! |--------------------|----------------------------------------------|
//! | jpg / jpeg         | re-encode at the configured quality          |
//! | png                | lossless re-encode, best compression         |
//! | svg                | usvg normalization, no indentation           |
//! | json / webmanifest | whitespace removed                           |
//! | others             | unchanged                                    |
//!
//! The optimized bytes replace the original only when they are smaller.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::ImageFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use super::{StageError, Transform};
use crate::asset::Asset;
use crate::freshness::{get_mtime, is_output_fresh};
use crate::utils::plural::plural_count;
use crate::{debug, log};

// ============================================================================
// SkipFresh
// ============================================================================

/// Drop assets whose output already exists and is not older than the source.
pub struct SkipFresh {
    dest: PathBuf,
}

impl SkipFresh {
    pub fn new(dest: &Path) -> Self {
        Self {
            dest: dest.to_path_buf(),
        }
    }
}

impl Transform for SkipFresh {
    fn name(&self) -> &'static str {
        "skip-fresh"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        let total = assets.len();
        let stale: Vec<Asset> = assets
            .into_iter()
            .filter(|asset| {
                let source_mtime = asset.source.as_deref().and_then(get_mtime);
                let fresh = is_output_fresh(&self.dest.join(&asset.path), source_mtime);
                if fresh {
                    debug!("images"; "fresh {}", asset.path.display());
                }
                !fresh
            })
            .collect();

        let skipped = total - stale.len();
        if skipped > 0 {
            debug!("images"; "skipped {}", plural_count(skipped, "fresh image"));
        }
        Ok(stale)
    }
}

// ============================================================================
// OptimizeImages
// ============================================================================

/// Re-encode each image and keep the result when it is smaller.
///
/// An image that cannot be decoded is kept as-is with a warning; a broken
/// image in the source tree is not a build failure.
pub struct OptimizeImages {
    jpeg_quality: u8,
}

impl OptimizeImages {
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }

    fn optimize(&self, asset: &Asset) -> Result<Option<Vec<u8>>> {
        let data = &asset.contents;
        let optimized = match asset.extension().as_deref() {
            Some("jpg" | "jpeg") => Some(encode_jpeg(data, self.jpeg_quality)?),
            Some("png") => Some(encode_png(data)?),
            Some("svg") => optimize_svg(data)?,
            Some("json" | "webmanifest") => Some(compact_json(data)?),
            _ => None,
        };
        Ok(optimized)
    }
}

impl Transform for OptimizeImages {
    fn name(&self) -> &'static str {
        "optimize-images"
    }

    fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            match self.optimize(asset) {
                Ok(Some(data)) if data.len() < asset.contents.len() => {
                    debug!(
                        "images";
                        "{} {} -> {}",
                        asset.path.display(),
                        asset.contents.len(),
                        data.len()
                    );
                    asset.contents = data;
                }
                Ok(_) => {}
                Err(e) => {
                    log!("images"; "kept {} unoptimized: {:#}", asset.path.display(), e);
                }
            }
        }
        Ok(assets)
    }
}

fn encode_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
        .context("Failed to decode JPEG")?;
    let mut out = Cursor::new(Vec::new());
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))
        .context("Failed to encode JPEG")?;
    Ok(out.into_inner())
}

fn encode_png(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Png)
        .context("Failed to decode PNG")?;
    let mut out = Cursor::new(Vec::new());
    img.write_with_encoder(PngEncoder::new_with_quality(
        &mut out,
        CompressionType::Best,
        FilterType::Adaptive,
    ))
    .context("Failed to encode PNG")?;
    Ok(out.into_inner())
}

/// Normalize an SVG through usvg.
///
/// usvg is built without text shaping, so documents with `<text>` are left
/// alone rather than losing their text.
fn optimize_svg(data: &[u8]) -> Result<Option<Vec<u8>>> {
    if data.windows(5).any(|w| w == b"<text") {
        return Ok(None);
    }

    let tree = usvg::Tree::from_data(data, &usvg::Options::default())
        .context("Failed to parse SVG")?;
    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        attributes_indent: usvg::Indent::None,
        ..Default::default()
    };
    Ok(Some(tree.to_string(&write_options).into_bytes()))
}

fn compact_json(data: &[u8]) -> Result<Vec<u8>> {
    let value: serde_json::Value = serde_json::from_slice(data).context("Failed to parse JSON")?;
    serde_json::to_vec(&value).context("Failed to serialize JSON")
}
