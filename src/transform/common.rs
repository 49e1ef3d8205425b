//! Stages shared by several groups: concat, rename, source map files, size report.

use std::path::PathBuf;

use parcel_sourcemap::SourceMap;

use super::{StageError, Transform, text};
use crate::asset::Asset;
use crate::utils::plural::plural_count;
use crate::utils::size::format_bytes;
use crate::{debug, log};

/// Project root recorded in generated source maps. Source names are already
/// root-relative, so this only anchors them.
pub(super) const MAP_ROOT: &str = "/";

pub(super) fn map_error(err: parcel_sourcemap::SourceMapError) -> StageError {
    StageError::Other(format!("source map: {err}"))
}

// ============================================================================
// Concat
// ============================================================================

/// Join all assets into one file, merging their source maps.
///
/// Each part starts on a new line; its map is shifted by the number of
/// lines already emitted. No input means no output.
pub struct Concat {
    file: PathBuf,
}

impl Concat {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }
}

impl Transform for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        if assets.is_empty() {
            return Ok(assets);
        }

        let mut code = String::new();
        let mut map = SourceMap::new(MAP_ROOT);
        let mut has_map = false;
        let mut line: i64 = 0;

        for mut asset in assets {
            let part_map = asset.map.take();
            let part = text(&asset)?.trim_end_matches('\n');

            if let Some(mut part_map) = part_map {
                map.add_sourcemap(&mut part_map, line).map_err(map_error)?;
                has_map = true;
            }

            code.push_str(part);
            code.push('\n');
            line += part.matches('\n').count() as i64 + 1;
        }

        let mut bundle = Asset::new(&self.file, code);
        bundle.map = has_map.then_some(map);
        Ok(vec![bundle])
    }
}

// ============================================================================
// Rename
// ============================================================================

/// Insert a suffix between file stem and extension (`main.css` -> `main.min.css`).
pub struct Rename {
    suffix: String,
}

impl Rename {
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Transform for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let stem = asset
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = match asset.path.extension() {
                Some(ext) => format!("{stem}{}.{}", self.suffix, ext.to_string_lossy()),
                None => format!("{stem}{}", self.suffix),
            };
            asset.path.set_file_name(name);
        }
        Ok(assets)
    }
}

// ============================================================================
// SourceMaps
// ============================================================================

/// Emit `<file>.map` next to every asset that carries a source map and link
/// it with a `sourceMappingURL` comment.
pub struct SourceMaps;

impl Transform for SourceMaps {
    fn name(&self) -> &'static str {
        "sourcemaps"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        let mut out = Vec::with_capacity(assets.len() * 2);

        for mut asset in assets {
            let Some(mut map) = asset.map.take() else {
                out.push(asset);
                continue;
            };

            let map_name = format!("{}.map", asset.file_name());
            let comment = match asset.extension().as_deref() {
                Some("css") => format!("/*# sourceMappingURL={map_name} */\n"),
                _ => format!("//# sourceMappingURL={map_name}\n"),
            };
            if !asset.contents.ends_with(b"\n") {
                asset.contents.push(b'\n');
            }
            asset.contents.extend_from_slice(comment.as_bytes());

            let json = map.to_json(None).map_err(map_error)?;
            let map_asset = Asset::new(asset.path.with_file_name(&map_name), json);

            out.push(asset);
            out.push(map_asset);
        }

        Ok(out)
    }
}

// ============================================================================
// ReportSize
// ============================================================================

/// Log the total output size of a group (per file with `--verbose`).
pub struct ReportSize {
    label: &'static str,
}

impl ReportSize {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl Transform for ReportSize {
    fn name(&self) -> &'static str {
        "size"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        if assets.is_empty() {
            return Ok(assets);
        }

        let total: u64 = assets.iter().map(Asset::len).sum();
        for asset in &assets {
            debug!(self.label; "{} {}", asset.path.display(), format_bytes(asset.len()));
        }
        log!(self.label; "{} {}", plural_count(assets.len(), "file"), format_bytes(total));
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapped(name: &str, code: &str, source: &str) -> Asset {
        let mut map = SourceMap::new(MAP_ROOT);
        let src = map.add_source(source);
        map.add_mapping(
            0,
            0,
            Some(parcel_sourcemap::OriginalLocation::new(0, 0, src, None)),
        );
        let mut asset = Asset::new(name, code);
        asset.map = Some(map);
        asset
    }

    #[test]
    fn test_concat_joins_lines() {
        let out = Concat::new("main.js")
            .apply(vec![Asset::new("a.js", "a();\n"), Asset::new("b.js", "b();")])
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, PathBuf::from("main.js"));
        assert_eq!(out[0].contents, b"a();\nb();\n");
        assert!(out[0].map.is_none());
    }

    #[test]
    fn test_concat_empty_emits_nothing() {
        assert!(Concat::new("main.css").apply(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_concat_merges_maps() {
        let out = Concat::new("main.js")
            .apply(vec![
                mapped("a.js", "a()", "src/a.js"),
                mapped("b.js", "b()", "src/b.js"),
            ])
            .unwrap();
        let mut map = out.into_iter().next().unwrap().map.unwrap();
        let json = map.to_json(None).unwrap();
        assert!(json.contains("src/a.js"));
        assert!(json.contains("src/b.js"));
    }

    #[test]
    fn test_rename_suffix() {
        let out = Rename::suffix(".min")
            .apply(vec![Asset::new("main.css", ""), Asset::new("dir/LICENSE", "")])
            .unwrap();
        assert_eq!(out[0].path, PathBuf::from("main.min.css"));
        assert_eq!(out[1].path, PathBuf::from("dir/LICENSE.min"));
    }

    #[test]
    fn test_source_maps_css_comment() {
        let out = SourceMaps
            .apply(vec![mapped("main.min.css", "a{}", "src/a.scss")])
            .unwrap();
        assert_eq!(out.len(), 2);
        let css = String::from_utf8(out[0].contents.clone()).unwrap();
        assert!(css.ends_with("/*# sourceMappingURL=main.min.css.map */\n"));
        assert_eq!(out[1].path, PathBuf::from("main.min.css.map"));

        let json: serde_json::Value = serde_json::from_slice(&out[1].contents).unwrap();
        assert_eq!(json["version"], 3);
    }

    #[test]
    fn test_source_maps_js_comment() {
        let out = SourceMaps
            .apply(vec![mapped("main.min.js", "x()\n", "src/x.js")])
            .unwrap();
        let js = String::from_utf8(out[0].contents.clone()).unwrap();
        assert_eq!(js, "x()\n//# sourceMappingURL=main.min.js.map\n");
    }

    #[test]
    fn test_source_maps_skip_unmapped() {
        let out = SourceMaps.apply(vec![Asset::new("index.html", "<p>")]).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_report_size_passes_through() {
        let out = ReportSize::new("styles")
            .apply(vec![Asset::new("main.min.css", "a{}")])
            .unwrap();
        assert_eq!(out.len(), 1);
    }
}
