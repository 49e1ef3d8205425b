//! assetpipe - a frontend asset pipeline.
//!
//! Compiles, bundles and optimizes a static site's assets from `src/` into
//! `dist/`, then serves `dist/` with live reload while watching the sources.

mod actor;
mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod freshness;
mod logger;
mod pipeline;
mod reload;
mod serve;
mod task;
mod transform;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::PipelineConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = PipelineConfig::load(&cli)?;
    pipeline::run(cli.task(), config)
}
