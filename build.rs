//! Build script for minifying the embedded hot reload client.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use std::fs;
use std::path::Path;

const OVERLAY_CSS_PLACEHOLDER: &str = "__ASSETPIPE_OVERLAY_CSS__";

fn main() {
    let out_dir = std::env::var("OUT_DIR").unwrap();
    let out_path = Path::new(&out_dir);

    minify_hotreload_js_file(
        "src/embed/hotreload.js",
        "src/embed/hotreload-overlay.css",
        &out_path.join("hotreload.min.js"),
    );

    println!("cargo:rerun-if-changed=src/embed/hotreload.js");
    println!("cargo:rerun-if-changed=src/embed/hotreload-overlay.css");
}

fn minify_js(source: &str) -> String {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();

    let ret = Parser::new(&allocator, source, source_type).parse();
    assert!(ret.errors.is_empty(), "Parse errors: {:?}", ret.errors);

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);

    Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code
}

fn minify_hotreload_js_file(js_input: &str, css_input: &str, output: &Path) {
    let source = fs::read_to_string(js_input).expect("Failed to read hotreload.js");
    let css_source =
        fs::read_to_string(css_input).expect("Failed to read hotreload-overlay.css");
    let css = minify_css(&css_source);
    let escaped_css = escape_template_literal(&css);

    let count = source.matches(OVERLAY_CSS_PLACEHOLDER).count();
    assert_eq!(
        count, 1,
        "hotreload.js must contain exactly one {} placeholder",
        OVERLAY_CSS_PLACEHOLDER
    );

    let source = source.replace(OVERLAY_CSS_PLACEHOLDER, &escaped_css);
    fs::write(output, minify_js(&source)).expect("Failed to write minified hotreload JS");
}

fn escape_template_literal(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

fn minify_css(source: &str) -> String {
    let stylesheet =
        StyleSheet::parse(source, ParserOptions::default()).expect("Failed to parse CSS");
    stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .expect("Failed to minify CSS")
        .code
}
