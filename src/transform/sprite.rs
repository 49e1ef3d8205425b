//! SVG sprite sheet assembly (quick-xml).
//!
//! Every icon's root `<svg>` is unwrapped and re-emitted inside one document:
//!
//! - `stack`: nested `<svg id>` elements, hidden unless targeted, so
//!   `sprite.svg#icon` renders a single icon (`<img>`, CSS `url()`).
//! - `symbol`: `<symbol id>` definitions for `<use href="sprite.svg#icon">`.
//!
//! Ids come from the icon's path relative to the sprite source directory,
//! with directory separators replaced by `--` (`social/github.svg` becomes
//! `social--github`).

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{StageError, Transform, text};
use crate::asset::Asset;
use crate::config::SpriteMode;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const STACK_CSS: &str = ":root>svg{display:none}:root>svg:target{display:inline}";

/// One icon, unwrapped from its root element.
struct Icon<'a> {
    id: String,
    view_box: Option<String>,
    inner: &'a str,
}

/// Combine every input SVG into a single sprite file.
pub struct SvgSprite {
    mode: SpriteMode,
    file: PathBuf,
}

impl SvgSprite {
    pub fn new(mode: SpriteMode, file: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            file: file.into(),
        }
    }

    fn build(&self, icons: &[Icon<'_>]) -> std::io::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let tag = match self.mode {
            SpriteMode::Stack => "svg",
            SpriteMode::Symbol => "symbol",
        };

        writer
            .create_element("svg")
            .with_attribute(("xmlns", SVG_NS))
            .with_attribute(("xmlns:xlink", XLINK_NS))
            .write_inner_content(|w| {
                if self.mode == SpriteMode::Stack {
                    w.create_element("style")
                        .write_text_content(BytesText::from_escaped(STACK_CSS))?;
                }
                for icon in icons {
                    let mut element = w.create_element(tag).with_attribute(("id", icon.id.as_str()));
                    if let Some(view_box) = &icon.view_box {
                        element = element.with_attribute(("viewBox", view_box.as_str()));
                    }
                    element.write_inner_content(|w| w.get_mut().write_all(icon.inner.as_bytes()))?;
                }
                Ok(())
            })?;

        Ok(writer.into_inner().into_inner())
    }
}

impl Transform for SvgSprite {
    fn name(&self) -> &'static str {
        "svg-sprite"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, StageError> {
        if assets.is_empty() {
            return Ok(assets);
        }

        let icons = assets
            .iter()
            .map(|asset| parse_icon(asset, text(asset)?))
            .collect::<Result<Vec<_>, _>>()?;

        let contents = self
            .build(&icons)
            .map_err(|e| StageError::Other(format!("sprite: {e}")))?;
        Ok(vec![Asset::new(self.file.clone(), contents)])
    }
}

/// Split an icon into its root attributes and inner markup.
fn parse_icon<'a>(asset: &Asset, source: &'a str) -> Result<Icon<'a>, StageError> {
    let origin = asset.origin();
    let mut reader = Reader::from_str(source);

    loop {
        let event = reader
            .read_event()
            .map_err(|e| StageError::compile(origin, e))?;

        let (root, inner) = match event {
            Event::Start(e) if e.local_name().as_ref() == b"svg" => {
                let span = reader
                    .read_to_end(e.name())
                    .map_err(|err| StageError::compile(origin, err))?;
                let inner = &source[span.start as usize..span.end as usize];
                (e, inner.trim())
            }
            Event::Empty(e) if e.local_name().as_ref() == b"svg" => (e, ""),
            Event::Start(e) | Event::Empty(e) => {
                return Err(StageError::compile(
                    origin,
                    format!(
                        "root element is <{}>, not <svg>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ),
                ));
            }
            Event::Eof => return Err(StageError::compile(origin, "no <svg> element")),
            _ => continue,
        };

        let attr = |name: &str| -> Result<Option<String>, StageError> {
            match root.try_get_attribute(name) {
                Ok(Some(a)) => a
                    .unescape_value()
                    .map(|v| Some(v.into_owned()))
                    .map_err(|e| StageError::compile(origin, e)),
                Ok(None) => Ok(None),
                Err(e) => Err(StageError::compile(origin, e)),
            }
        };

        let view_box = match attr("viewBox")? {
            Some(view_box) => Some(view_box),
            None => match (attr("width")?, attr("height")?) {
                (Some(w), Some(h)) => Some(format!("0 0 {} {}", strip_px(&w), strip_px(&h))),
                _ => None,
            },
        };

        return Ok(Icon {
            id: icon_id(&asset.path),
            view_box,
            inner,
        });
    }
}

fn strip_px(value: &str) -> &str {
    value.trim().trim_end_matches("px")
}

/// `social/github.svg` -> `social--github`.
fn icon_id(path: &Path) -> String {
    let stem = path.with_extension("");
    let joined = stem
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("--");

    joined
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
