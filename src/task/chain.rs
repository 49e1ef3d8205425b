//! Stage chain of each asset group.

use crate::config::{ConfigError, PipelineConfig};
use crate::core::AssetGroup;
use crate::transform::{
    CompileJs, CompileScss, Concat, InlineImports, MinifyCss, MinifyHtml, OptimizeImages,
    Pipeline, PrefixCss, Rename, ReportSize, SkipFresh, SourceMaps, SvgSprite,
};

/// Build the stage chain for `group`.
///
/// Fails only on configuration values that cannot be turned into stage
/// options (browser targets, transpile target).
pub fn stage_chain(group: AssetGroup, config: &PipelineConfig) -> Result<Pipeline, ConfigError> {
    let root = &config.root;
    let label = group.name();

    let chain = match group {
        AssetGroup::Styles => {
            let browsers = config.styles.targets()?;
            Pipeline::new()
                .pipe(CompileScss)
                .pipe(PrefixCss::new(browsers, root))
                .pipe(Concat::new(format!("{}.css", config.styles.bundle)))
                .pipe(MinifyCss::new(browsers))
                .pipe(Rename::suffix(".min"))
                .pipe(SourceMaps)
                .pipe(ReportSize::new(label))
        }
        AssetGroup::Scripts => Pipeline::new()
            .pipe(CompileJs::new(config.scripts.es_target()?, root))
            .pipe(Concat::new(format!("{}.js", config.scripts.bundle)))
            .pipe(Rename::suffix(".min"))
            .pipe(SourceMaps)
            .pipe(ReportSize::new(label)),
        AssetGroup::Html => Pipeline::new()
            .pipe(InlineImports::new(&config.paths.components))
            .pipe(MinifyHtml::new())
            .pipe(ReportSize::new(label)),
        AssetGroup::Images => Pipeline::new()
            .pipe(SkipFresh::new(&config.paths.images.dest))
            .pipe(OptimizeImages::new(config.images.jpeg_quality))
            .pipe(ReportSize::new(label)),
        AssetGroup::Sprites => Pipeline::new()
            .pipe(SvgSprite::new(config.sprites.mode, &config.sprites.file))
            .pipe(ReportSize::new(label)),
        AssetGroup::Fonts | AssetGroup::Lib => Pipeline::new(),
    };

    Ok(chain)
}
