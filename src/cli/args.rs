//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::AssetGroup;

/// Frontend asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (optional, default: assetpipe.toml)
    #[arg(short = 'C', long, global = true, default_value = "assetpipe.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Task to run (runs `default` when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Named tasks
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Compile, prefix, bundle and minify stylesheets
    Styles,

    /// Transpile, minify and bundle scripts
    Scripts,

    /// Inline components and minify HTML pages
    #[command(name = "htmlMinify")]
    HtmlMinify,

    /// Optimize images (skips images that are up to date)
    Images,

    /// Copy fonts
    Fonts,

    /// Copy vendored libraries
    Lib,

    /// Build the SVG sprite sheet
    #[command(name = "svgSprites")]
    SvgSprites,

    /// Remove previous output (keeps optimized images)
    Clean,

    /// Clean, build everything, then serve with live reload and watch
    Default,
}

impl Commands {
    /// The asset group a single-task command runs, if any.
    pub const fn group(self) -> Option<AssetGroup> {
        match self {
            Self::Styles => Some(AssetGroup::Styles),
            Self::Scripts => Some(AssetGroup::Scripts),
            Self::HtmlMinify => Some(AssetGroup::Html),
            Self::Images => Some(AssetGroup::Images),
            Self::Fonts => Some(AssetGroup::Fonts),
            Self::Lib => Some(AssetGroup::Lib),
            Self::SvgSprites => Some(AssetGroup::Sprites),
            Self::Clean | Self::Default => None,
        }
    }
}

impl Cli {
    /// Selected task, `default` when none was given.
    pub fn task(&self) -> Commands {
        self.command.unwrap_or(Commands::Default)
    }
}
