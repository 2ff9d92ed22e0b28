//! Built-in handlers for `box`, `row`, `column` and `text`.

use std::cell::RefCell;

use crossterm::style::{Attribute, Color, ContentStyle};
use tracing::trace;

use crate::cache::{content_key, BoundedCache};
use crate::engine::{PropValue, Props};
use crate::layout::{display_width, fit_height, join_lines, truncate_to_width, wrap_words};

use super::context::RenderContext;
use super::flow::{compose_column, compose_row};
use super::registry::RenderHandler;

// =============================================================================
// Containers
// =============================================================================

/// `box`: a row or column depending on `flexDirection` (column by default).
#[derive(Debug, Default, Clone, Copy)]
pub struct BoxHandler;

impl RenderHandler for BoxHandler {
    fn render(&self, ctx: &mut RenderContext<'_, '_>) -> String {
        match ctx.props().string("flexDirection") {
            Some("row" | "row-reverse") => compose_row(ctx),
            _ => compose_column(ctx),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RowHandler;

impl RenderHandler for RowHandler {
    fn render(&self, ctx: &mut RenderContext<'_, '_>) -> String {
        compose_row(ctx)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnHandler;

impl RenderHandler for ColumnHandler {
    fn render(&self, ctx: &mut RenderContext<'_, '_>) -> String {
        compose_column(ctx)
    }
}

// =============================================================================
// Text
// =============================================================================

/// Wrapped lines cached under a `hash:width` key.
///
/// The hash only samples long text, so the full source is kept to reject
/// collisions.
struct WrappedText {
    source: String,
    lines: Vec<String>,
}

/// `text`: word-wrapped, aligned and styled content.
///
/// Content comes from the node's text, or the `content` prop. Recognised
/// props: `wrap` (default true; false truncates instead), `textAlign`
/// (`left`/`center`/`right`), `color`, `background`, `bold`, `dim`,
/// `italic`, `underline`.
pub struct TextHandler {
    wraps: RefCell<BoundedCache<String, WrappedText>>,
}

impl Default for TextHandler {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_WRAP_CACHE_ENTRIES,
            crate::config::DEFAULT_WRAP_CACHE_WEIGHT,
        )
    }
}

impl TextHandler {
    /// Wrap cache bounded to `entries` entries and `weight` total lines.
    pub fn new(entries: usize, weight: usize) -> Self {
        Self {
            wraps: RefCell::new(BoundedCache::with_weight_limit(entries, weight)),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.wraps.borrow().len()
    }

    fn wrapped(&self, key: String, content: &str, width: u16) -> Vec<String> {
        if let Some(entry) = self.wraps.borrow().get(key.as_str()) {
            if entry.source == content {
                trace!(%key, "wrap cache hit");
                return entry.lines.clone();
            }
        }

        let lines = wrap_words(content, width as usize);
        let weight = lines.len().max(1);
        self.wraps.borrow_mut().insert(
            key,
            WrappedText {
                source: content.to_string(),
                lines: lines.clone(),
            },
            weight,
        );
        lines
    }
}

impl RenderHandler for TextHandler {
    fn render(&self, ctx: &mut RenderContext<'_, '_>) -> String {
        let props = ctx.props();
        let content = ctx
            .text()
            .or_else(|| props.string("content"))
            .unwrap_or("");

        let wrap = props.get("wrap").is_none_or(PropValue::as_bool);
        let width = ctx.effective_width().filter(|&w| w > 0);

        let mut lines: Vec<String> = match width {
            Some(w) if wrap => self.wrapped(content_key(ctx.node(), w), content, w),
            Some(w) => content
                .split('\n')
                .map(|l| truncate_to_width(l, w as usize).into_owned())
                .collect(),
            None if content.is_empty() => Vec::new(),
            None => content.split('\n').map(str::to_string).collect(),
        };

        if let Some(w) = width {
            align_lines(&mut lines, props.string("textAlign"), w as usize);
        }

        let style = text_style(props);
        if style != ContentStyle::default() {
            for line in lines.iter_mut().filter(|l| !l.is_empty()) {
                *line = style.apply(line.as_str()).to_string();
            }
        }

        if let Some(h) = ctx.target_height() {
            fit_height(&mut lines, h as usize);
        }
        join_lines(&lines)
    }
}

fn align_lines(lines: &mut [String], align: Option<&str>, width: usize) {
    let divisor = match align {
        Some("center") => 2,
        Some("right") => 1,
        _ => return,
    };
    for line in lines.iter_mut() {
        let slack = width.saturating_sub(display_width(line));
        if slack > 0 {
            line.insert_str(0, &" ".repeat(slack / divisor));
        }
    }
}

// =============================================================================
// Styling
// =============================================================================

/// Parse a color name or `#rrggbb`.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return Some(Color::Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        });
    }

    Some(match value.to_ascii_lowercase().replace('-', "_").as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        "dark_grey" | "dark_gray" => Color::DarkGrey,
        "dark_red" => Color::DarkRed,
        "dark_green" => Color::DarkGreen,
        "dark_yellow" => Color::DarkYellow,
        "dark_blue" => Color::DarkBlue,
        "dark_magenta" => Color::DarkMagenta,
        "dark_cyan" => Color::DarkCyan,
        _ => return None,
    })
}

/// Style from the visual props of a node.
pub fn text_style(props: &Props) -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = props.string("color").and_then(parse_color);
    style.background_color = props.string("background").and_then(parse_color);

    for (prop, attribute) in [
        ("bold", Attribute::Bold),
        ("dim", Attribute::Dim),
        ("italic", Attribute::Italic),
        ("underline", Attribute::Underlined),
    ] {
        if props.flag(prop) {
            style.attributes.set(attribute);
        }
    }
    style
}
