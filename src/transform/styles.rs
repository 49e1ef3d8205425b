//! Stylesheet stages: SCSS compilation (grass), prefixing and minification
//! (lightningcss).

use std::path::{Path, PathBuf};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use super::common::{MAP_ROOT, map_error};
use super::{StageError, Transform, source_name, text};
use crate::asset::Asset;
use crate::debug;

/// Whether a stylesheet is a partial (`_name.scss`), only compiled through
/// `@use`/`@import` from another file.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

// ============================================================================
// CompileScss
// ============================================================================

/// Compile SCSS (or indented `.sass`) to CSS. Partials are dropped, imports
/// resolve relative to the importing file.
pub struct CompileScss;

impl CompileScss {
    fn compile(asset: &Asset) -> Result<String, StageError> {
        let options = grass::Options::default().style(grass::OutputStyle::Expanded);

        let result = match asset.source.as_deref() {
            Some(path) => grass::from_path(path, &options),
            None => {
                let syntax = match asset.extension().as_deref() {
                    Some("sass") => grass::InputSyntax::Sass,
                    Some("css") => grass::InputSyntax::Css,
                    _ => grass::InputSyntax::Scss,
                };
                grass::from_string(text(asset)?.to_owned(), &options.input_syntax(syntax))
            }
        };

        result.map_err(|e| StageError::compile(asset.origin(), e))
    }
}

impl Transform for CompileScss {
    fn name(&self) -> &'static str {
        "scss"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        let mut out = Vec::with_capacity(assets.len());

        for mut asset in assets {
            if is_partial(&asset.path) {
                debug!("styles"; "partial {}", asset.path.display());
                continue;
            }

            let css = Self::compile(&asset)?;
            asset.contents = css.into_bytes();
            asset.path.set_extension("css");
            out.push(asset);
        }

        Ok(out)
    }
}

// ============================================================================
// PrefixCss
// ============================================================================

/// Add vendor prefixes for the configured browsers and record a source map
/// per file. Output stays readable; minification runs on the bundle.
pub struct PrefixCss {
    browsers: Browsers,
    root: PathBuf,
}

impl PrefixCss {
    pub fn new(browsers: Browsers, root: &Path) -> Self {
        Self {
            browsers,
            root: root.to_path_buf(),
        }
    }

    fn prefix(&self, asset: &Asset) -> Result<(String, SourceMap), StageError> {
        let origin = asset.origin();
        let filename = source_name(origin, &self.root);
        let source = text(asset)?;
        let targets = Targets::from(self.browsers);

        let mut sheet = parse(source, &filename, origin)?;
        sheet
            .minify(MinifyOptions {
                targets,
                ..MinifyOptions::default()
            })
            .map_err(|e| StageError::compile(origin, e))?;

        let mut map = SourceMap::new(MAP_ROOT);
        let index = map.add_source(&filename);
        map.set_source_content(index as usize, source)
            .map_err(map_error)?;

        let result = sheet
            .to_css(PrinterOptions {
                source_map: Some(&mut map),
                targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| StageError::compile(origin, e))?;

        Ok((result.code, map))
    }
}

impl Transform for PrefixCss {
    fn name(&self) -> &'static str {
        "prefix-css"
    }

    fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let (code, map) = self.prefix(asset)?;
            asset.contents = code.into_bytes();
            asset.map = Some(map);
        }
        Ok(assets)
    }
}

// ============================================================================
// MinifyCss
// ============================================================================

/// Minify each stylesheet (in practice the concatenated bundle).
///
/// When the asset already carries a source map, the minified output is
/// mapped through it back to the original files.
pub struct MinifyCss {
    browsers: Browsers,
}

impl MinifyCss {
    pub fn new(browsers: Browsers) -> Self {
        Self { browsers }
    }

    fn minify(&self, asset: &mut Asset) -> Result<(String, SourceMap), StageError> {
        let input_map = asset.map.take();
        let origin = asset.origin().to_path_buf();
        let filename = asset.path.to_string_lossy().into_owned();
        let source = text(asset)?;
        let targets = Targets::from(self.browsers);

        let mut sheet = parse(source, &filename, &origin)?;
        sheet
            .minify(MinifyOptions {
                targets,
                ..MinifyOptions::default()
            })
            .map_err(|e| StageError::compile(&origin, e))?;

        // Without an input map the output maps straight to this file.
        let mut map = SourceMap::new(MAP_ROOT);
        if input_map.is_none() {
            let index = map.add_source(&filename);
            map.set_source_content(index as usize, source)
                .map_err(map_error)?;
        }

        let result = sheet
            .to_css(PrinterOptions {
                minify: true,
                source_map: Some(&mut map),
                targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| StageError::compile(&origin, e))?;

        if let Some(mut input_map) = input_map {
            map.extends(&mut input_map).map_err(map_error)?;
        }

        Ok((result.code, map))
    }
}

impl Transform for MinifyCss {
    fn name(&self) -> &'static str {
        "minify-css"
    }

    fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let (code, map) = self.minify(asset)?;
            asset.contents = code.into_bytes();
            asset.map = Some(map);
        }
        Ok(assets)
    }
}

fn parse<'a>(
    source: &'a str,
    filename: &str,
    origin: &Path,
) -> Result<StyleSheet<'a, 'a>, StageError> {
    StyleSheet::parse(
        source,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| StageError::compile(origin, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StylesConfig;
    use crate::transform::Concat;
    use std::fs;
    use tempfile::TempDir;

    fn source(dir: &Path, rel: &str, content: &str) -> Asset {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        let mut asset = Asset::new(rel, content);
        asset.source = Some(path);
        asset
    }

    #[test]
    fn test_compile_scss_nesting() {
        let dir = TempDir::new().unwrap();
        let asset = source(dir.path(), "main.scss", "$c: red;\n.a { .b { color: $c; } }");

        let out = CompileScss.apply(vec![asset]).unwrap();
        assert_eq!(out[0].path, PathBuf::from("main.css"));
        let css = String::from_utf8(out[0].contents.clone()).unwrap();
        assert!(css.contains(".a .b"));
        assert!(css.contains("color: red"));
    }

    #[test]
    fn test_compile_scss_resolves_partial_import() {
        let dir = TempDir::new().unwrap();
        let main = source(dir.path(), "main.scss", "@import 'vars';\nbody { color: $brand; }");
        let partial = source(dir.path(), "_vars.scss", "$brand: #336699;");

        let out = CompileScss.apply(vec![partial, main]).unwrap();
        assert_eq!(out.len(), 1, "partials are not emitted");
        let css = String::from_utf8(out[0].contents.clone()).unwrap();
        assert!(css.contains("#336699"));
    }

    #[test]
    fn test_compile_scss_syntax_error_is_recoverable() {
        let dir = TempDir::new().unwrap();
        let asset = source(dir.path(), "broken.scss", ".a { color: red;");

        let err = CompileScss.apply(vec![asset]).unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("broken.scss"));
    }

    #[test]
    fn test_indented_sass_syntax() {
        let out = CompileScss
            .apply(vec![Asset::new("old.sass", ".a\n  color: red\n")])
            .unwrap();
        assert_eq!(out[0].path, PathBuf::from("old.css"));
        assert!(String::from_utf8_lossy(&out[0].contents).contains("color: red"));
    }

    #[test]
    fn test_prefix_css_keeps_output_readable() {
        let browsers = StylesConfig::default().targets().unwrap();
        let dir = TempDir::new().unwrap();
        let asset = source(dir.path(), "src/main.css", ".a {\n  user-select: none;\n}\n");

        let out = PrefixCss::new(browsers, dir.path()).apply(vec![asset]).unwrap();
        let css = String::from_utf8(out[0].contents.clone()).unwrap();
        assert!(css.contains("-webkit-user-select: none"), "{css}");
        assert!(css.contains('\n'));

        let mut map = out.into_iter().next().unwrap().map.unwrap();
        assert!(map.to_json(None).unwrap().contains("src/main.css"));
    }

    #[test]
    fn test_minify_runs_on_the_whole_bundle() {
        let browsers = StylesConfig::default().targets().unwrap();
        let dir = TempDir::new().unwrap();
        let a = source(dir.path(), "src/a.css", ".btn { color: red }\n");
        let b = source(dir.path(), "src/b.css", ".btn { color: red }\n");

        let prefixed = PrefixCss::new(browsers, dir.path()).apply(vec![a, b]).unwrap();
        let bundle = Concat::new("main.css").apply(prefixed).unwrap();
        let out = MinifyCss::new(browsers).apply(bundle).unwrap();

        let css = String::from_utf8(out[0].contents.clone()).unwrap();
        assert_eq!(css, ".btn{color:red}");

        let mut map = out.into_iter().next().unwrap().map.unwrap();
        let json: serde_json::Value = serde_json::from_str(&map.to_json(None).unwrap()).unwrap();
        let sources = json["sources"].as_array().unwrap();
        assert!(!sources.is_empty());
        assert!(sources.iter().all(|s| s.as_str().unwrap().starts_with("src/")), "{sources:?}");
    }

    #[test]
    fn test_minify_css_without_input_map() {
        let out = MinifyCss::new(Browsers::default())
            .apply(vec![Asset::new("main.css", ".b {\n  color: #ff0000;\n}\n")])
            .unwrap();
        assert_eq!(out[0].contents, b".b{color:red}");

        let mut map = out.into_iter().next().unwrap().map.unwrap();
        assert!(map.to_json(None).unwrap().contains("main.css"));
    }

    #[test]
    fn test_minify_css_invalid_is_recoverable() {
        let err = MinifyCss::new(Browsers::default())
            .apply(vec![Asset::new("a.css", ".a { color: red")])
            .map(|_| ())
            .err();
        // lightningcss recovers from unclosed blocks; either outcome must not be fatal.
        assert!(err.is_none_or(|e| e.is_recoverable()));
    }

    #[test]
    fn test_is_partial() {
        assert!(is_partial(Path::new("styles/_vars.scss")));
        assert!(!is_partial(Path::new("styles/main.scss")));
    }
}
