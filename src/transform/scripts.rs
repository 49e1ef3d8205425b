//! Script stage: parse, transpile, minify and generate a source map (oxc).

use std::path::{Path, PathBuf};

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::diagnostics::OxcDiagnostic;
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::syntax::es_target::ESTarget;
use oxc::transformer::{EngineTargets, TransformOptions, Transformer};
use parcel_sourcemap::SourceMap;

use super::common::{MAP_ROOT, map_error};
use super::{StageError, Transform, source_name, text};
use crate::asset::Asset;

/// Transpile each script to `target` (TypeScript types stripped), minify
/// and mangle it, and record a source map.
///
/// Files are treated as classic scripts: they are concatenated into one
/// bundle that shares the global scope, so top-level names are never
/// mangled or dropped. The minifier is held to the same target so it does
/// not reintroduce syntax the transformer lowered.
pub struct CompileJs {
    target: ESTarget,
    root: PathBuf,
}

impl CompileJs {
    pub fn new(target: ESTarget, root: &Path) -> Self {
        Self {
            target,
            root: root.to_path_buf(),
        }
    }

    fn compile(&self, asset: &Asset) -> Result<(String, SourceMap), StageError> {
        let origin = asset.origin();
        let name = source_name(origin, &self.root);
        let source = text(asset)?;

        let source_type = SourceType::from_path(&asset.path)
            .unwrap_or_default()
            .with_script(true);

        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, source, source_type).parse();
        if let Some(err) = parsed.errors.first() {
            return Err(diagnostic(origin, err));
        }
        let mut program = parsed.program;

        let semantic = SemanticBuilder::new().build(&program);
        if let Some(err) = semantic.errors.first() {
            return Err(diagnostic(origin, err));
        }
        let scoping = semantic.semantic.into_scoping();

        let target = self.target.to_string();
        let target_error = |e: String| StageError::Other(format!("target `{target}`: {e}"));
        let options = TransformOptions::from_target(&target).map_err(target_error)?;
        let engine_targets = EngineTargets::from_target(&target).map_err(target_error)?;
        let transformed = Transformer::new(&allocator, Path::new(&name), &options)
            .build_with_scoping(scoping, &mut program);
        if let Some(err) = transformed.errors.first() {
            return Err(diagnostic(origin, err));
        }

        let minified = Minifier::new(MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions {
                target: engine_targets,
                ..CompressOptions::smallest()
            }),
        })
        .minify(&allocator, &mut program);

        let output = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                source_map_path: Some(PathBuf::from(&name)),
                ..CodegenOptions::default()
            })
            .with_scoping(minified.scoping)
            .build(&program);

        let map = match output.map {
            Some(map) => SourceMap::from_json(MAP_ROOT, &map.to_json_string()).map_err(map_error)?,
            None => SourceMap::new(MAP_ROOT),
        };

        Ok((output.code, map))
    }
}

fn diagnostic(path: &Path, err: &OxcDiagnostic) -> StageError {
    StageError::compile(path, err)
}

impl Transform for CompileJs {
    fn name(&self) -> &'static str {
        "js"
    }

    fn apply(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let (code, map) = self.compile(asset)?;
            asset.contents = code.into_bytes();
            asset.map = Some(map);
            asset.path.set_extension("js");
        }
        Ok(assets)
    }
}
