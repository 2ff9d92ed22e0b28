//! Text measurement in terminal cells.
//!
//! Every width here is a display width: ANSI escape sequences count as zero
//! cells, wide characters (CJK, most emoji) as two, combining marks as zero.
//! Composers rely on these helpers to align rendered, possibly styled,
//! output by column.

use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

const ESC: u8 = 0x1B;

// =============================================================================
// ANSI
// =============================================================================

/// Strip ANSI escape sequences. Borrows when there is nothing to strip.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.as_bytes().contains(&ESC) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    for segment in Segments::new(s) {
        if let Segment::Text(text) = segment {
            out.push_str(text);
        }
    }
    Cow::Owned(out)
}

/// A run of visible text or a single escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Escape(&'a str),
}

/// Splits a string into visible runs and escape sequences.
struct Segments<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Segments<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, pos: 0 }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        let bytes = self.s.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        if bytes[start] == ESC {
            self.pos = escape_end(bytes, start);
            return Some(Segment::Escape(&self.s[start..self.pos]));
        }

        // ESC is single-byte ASCII, so splitting on it never breaks UTF-8.
        let mut i = start;
        while i < bytes.len() && bytes[i] != ESC {
            i += 1;
        }
        self.pos = i;
        Some(Segment::Text(&self.s[start..i]))
    }
}

/// Byte index just past the escape sequence starting at `pos`.
fn escape_end(bytes: &[u8], pos: usize) -> usize {
    let len = bytes.len();
    let next = pos + 1;
    if next >= len {
        return len;
    }

    match bytes[next] {
        b'[' => {
            let mut i = next + 1;
            while i < len {
                let b = bytes[i];
                if (0x40..=0x7E).contains(&b) {
                    return i + 1;
                }
                if !(0x20..=0x3F).contains(&b) {
                    return i;
                }
                i += 1;
            }
            len
        }
        b']' | b'P' | b'^' | b'_' => {
            let mut i = next + 1;
            while i < len {
                match bytes[i] {
                    0x07 => return i + 1,
                    ESC if i + 1 < len && bytes[i + 1] == b'\\' => return i + 2,
                    _ => i += 1,
                }
            }
            len
        }
        // Two-byte sequence; step over a whole UTF-8 char if one follows.
        _ => {
            let mut i = next + 1;
            while i < len && (bytes[i] & 0xC0) == 0x80 {
                i += 1;
            }
            i
        }
    }
}

// =============================================================================
// Width
// =============================================================================

/// Display width of a single codepoint.
#[inline]
pub fn char_width(c: char) -> usize {
    match c as u32 {
        0x2600..=0x27BF => 2,
        0x1F300..=0x1F64F => 2,
        0x1F680..=0x1F6FF => 2,
        0x1F900..=0x1F9FF => 2,
        0x1FA70..=0x1FAFF => 2,
        _ => c.width().unwrap_or(0),
    }
}

/// Display width of one grapheme cluster.
pub fn grapheme_width(grapheme: &str) -> usize {
    let mut chars = grapheme.chars();
    let Some(first) = chars.next() else {
        return 0;
    };

    if grapheme.len() == first.len_utf8() {
        return char_width(first);
    }

    // Flags are regional indicator pairs.
    if (0x1F1E6..=0x1F1FF).contains(&(first as u32)) {
        return 2;
    }

    // ZWJ, VS16, skin tones and keycaps make an emoji presentation.
    if chars.any(|c| matches!(c as u32, 0x200D | 0xFE0F | 0x1F3FB..=0x1F3FF | 0x20E3)) {
        return 2;
    }

    first.width().unwrap_or(0)
}

/// Display width of a string, ignoring ANSI escapes.
pub fn display_width(s: &str) -> usize {
    if s.is_empty() {
        return 0;
    }
    if s.is_ascii() && !s.as_bytes().contains(&ESC) {
        return s.bytes().filter(|&b| b >= 0x20 && b != 0x7F).count();
    }
    strip_ansi(s).graphemes(true).map(grapheme_width).sum()
}

/// Widest line of a multi-line string.
pub fn max_line_width(s: &str) -> usize {
    split_lines(s).into_iter().map(display_width).max().unwrap_or(0)
}

/// Number of lines in a rendered block. The empty string has none.
pub fn line_count(s: &str) -> usize {
    split_lines(s).len()
}

/// Split a rendered block into lines.
///
/// The empty string has none. One trailing `\n` terminates the last line
/// rather than opening a new one, so `"\n"` is a single blank line.
pub fn split_lines(s: &str) -> Vec<&str> {
    if s.is_empty() {
        return Vec::new();
    }
    s.strip_suffix('\n').unwrap_or(s).split('\n').collect()
}

/// Inverse of [`split_lines`]: a block whose last line is blank gets a
/// terminating `\n` so it is not mistaken for one line fewer.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut block = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("\n");
    if lines.last().is_some_and(|l| l.as_ref().is_empty()) {
        block.push('\n');
    }
    block
}

// =============================================================================
// Fitting
// =============================================================================

/// Right-pad with spaces to `width` cells. Wider input is returned as is.
pub fn pad_to_width(s: &str, width: usize) -> Cow<'_, str> {
    let current = display_width(s);
    if current >= width {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + width - current);
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', width - current));
    Cow::Owned(out)
}

/// Cut to at most `width` cells at a grapheme boundary.
///
/// Escape sequences are kept even past the cut so trailing resets still
/// apply. A wide grapheme that would straddle the limit is dropped.
pub fn truncate_to_width(s: &str, width: usize) -> Cow<'_, str> {
    if display_width(s) <= width {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut used = 0;
    let mut full = false;
    for segment in Segments::new(s) {
        match segment {
            Segment::Escape(seq) => out.push_str(seq),
            Segment::Text(_) if full => {}
            Segment::Text(text) => {
                for g in text.graphemes(true) {
                    let gw = grapheme_width(g);
                    if used + gw > width {
                        full = true;
                        break;
                    }
                    out.push_str(g);
                    used += gw;
                }
            }
        }
    }
    Cow::Owned(out)
}

/// Truncate then pad: the result is exactly `width` cells wide.
pub fn fit_width(s: &str, width: usize) -> String {
    pad_to_width(&truncate_to_width(s, width), width).into_owned()
}

/// Pad with empty lines or drop trailing lines to exactly `height` lines.
pub fn fit_height(lines: &mut Vec<String>, height: usize) {
    lines.resize(height, String::new());
}

/// Same as [`fit_height`] on a rendered block.
pub fn fit_block_height(block: &str, height: usize) -> String {
    let mut lines: Vec<String> = split_lines(block).into_iter().map(str::to_string).collect();
    fit_height(&mut lines, height);
    join_lines(&lines)
}

// =============================================================================
// Wrapping
// =============================================================================

/// Word-wrap plain text to `max_width` cells.
///
/// Explicit newlines are hard breaks. Words wider than a line are broken at
/// grapheme boundaries. Whitespace that would start a wrapped line is
/// dropped. Empty input yields no lines; a zero width disables wrapping.
pub fn wrap_words(text: &str, max_width: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if max_width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        wrap_line(raw_line, max_width, &mut lines);
    }
    lines
}

fn wrap_line(line: &str, max_width: usize, lines: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_width = 0;

    for word in line.split_word_bounds() {
        let word_width: usize = word.graphemes(true).map(grapheme_width).sum();

        if current_width + word_width > max_width {
            if current_width > 0 {
                lines.push(current.trim_end().to_string());
                current.clear();
                current_width = 0;
            }
            if word_width > max_width {
                for g in word.graphemes(true) {
                    let gw = grapheme_width(g);
                    if current_width + gw > max_width && !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0;
                    }
                    current.push_str(g);
                    current_width += gw;
                }
                continue;
            }
            if word.chars().all(char::is_whitespace) {
                continue;
            }
        }

        current.push_str(word);
        current_width += word_width;
    }

    lines.push(current);
}

/// Lines needed to show `text` wrapped at `max_width`.
pub fn wrapped_height(text: &str, max_width: usize) -> usize {
    wrap_words(text, max_width).len()
}
