//! Clock text formatting and big-glyph rendering.
//!
//! Everything here is a pure transform: a duration becomes a clock string,
//! and a clock string becomes a block of glyph rows centered in a viewport.

use std::time::Duration;

use unicode_width::UnicodeWidthStr;

pub const GLYPH_WIDTH: usize = 8;
pub const GLYPH_HEIGHT: usize = 7;
/// Blank columns between adjacent glyphs.
pub const GLYPH_SPACING: usize = 2;

type Glyph = [&'static str; GLYPH_HEIGHT];

static BLANK: Glyph = ["        "; GLYPH_HEIGHT];

#[rustfmt::skip]
static DIGITS: [Glyph; 10] = [
    [" ██████ ", "██    ██", "██    ██", "██    ██", "██    ██", "██    ██", " ██████ "],
    ["   ██   ", " ████   ", "   ██   ", "   ██   ", "   ██   ", "   ██   ", " ██████ "],
    [" ██████ ", "██    ██", "      ██", " ██████ ", "██      ", "██      ", "████████"],
    [" ██████ ", "██    ██", "      ██", "  █████ ", "      ██", "██    ██", " ██████ "],
    ["██    ██", "██    ██", "██    ██", "████████", "      ██", "      ██", "      ██"],
    ["████████", "██      ", "██      ", "███████ ", "      ██", "██    ██", " ██████ "],
    [" ██████ ", "██      ", "██      ", "███████ ", "██    ██", "██    ██", " ██████ "],
    ["████████", "      ██", "     ██ ", "    ██  ", "   ██   ", "   ██   ", "   ██   "],
    [" ██████ ", "██    ██", "██    ██", " ██████ ", "██    ██", "██    ██", " ██████ "],
    [" ██████ ", "██    ██", "██    ██", " ███████", "      ██", "      ██", " ██████ "],
];

#[rustfmt::skip]
static COLON: Glyph = ["        ", "   ██   ", "   ██   ", "        ", "   ██   ", "   ██   ", "        "];

fn glyph(c: char) -> &'static Glyph {
    match c {
        '0'..='9' => &DIGITS[(c as u8 - b'0') as usize],
        ':' => &COLON,
        _ => &BLANK,
    }
}

/// The narrow interface the timer loop consumes.
pub trait ClockFace {
    /// Clock text for a duration, e.g. `04:59`.
    fn format(&self, d: Duration) -> String;
    /// A full-viewport picture of `text`, lines separated by `\n`.
    fn render(&self, text: &str, width: u16, height: u16) -> String;
}

/// Block-glyph face used in fullscreen mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFace;

impl ClockFace for BlockFace {
    fn format(&self, d: Duration) -> String {
        format_hms(d)
    }

    fn render(&self, text: &str, width: u16, height: u16) -> String {
        let width = usize::from(width);
        let height = usize::from(height);
        center_text(&render_big_time(text, width, height), width, height)
    }
}

/// Whole seconds of `d`, rounded to the nearest second.
pub fn whole_seconds(d: Duration) -> u64 {
    (d.as_millis().saturating_add(500) / 1000) as u64
}

/// `MM:SS`, or `HH:MM:SS` once an hour is reached.
pub fn format_hms(d: Duration) -> String {
    let total = whole_seconds(d);
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Seconds with one decimal, as printed in the session report.
pub fn format_report_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }
    format!("{:.1}s", d.as_secs_f64())
}

pub fn render_big_time(text: &str, width: usize, height: usize) -> String {
    let chars = text.chars().count();
    let total_width = (chars * (GLYPH_WIDTH + GLYPH_SPACING)).saturating_sub(GLYPH_SPACING);
    if width < total_width + 4 || height < GLYPH_HEIGHT + 2 {
        return text.to_string();
    }

    let gap = " ".repeat(GLYPH_SPACING);
    let mut lines = Vec::with_capacity(GLYPH_HEIGHT);
    for row in 0..GLYPH_HEIGHT {
        let mut line = String::with_capacity(total_width * 3);
        for (i, c) in text.chars().enumerate() {
            if i > 0 {
                line.push_str(&gap);
            }
            line.push_str(glyph(c)[row]);
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Pad `text` so that its block sits in the middle of a `width` x `height`
/// viewport. Every output line ends with `\n`.
pub fn center_text(text: &str, width: usize, height: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let v_offset = height.saturating_sub(lines.len()) / 2;

    let mut out = String::with_capacity((v_offset + lines.len()) * (width + 1));
    for _ in 0..v_offset {
        out.push('\n');
    }
    for line in lines {
        let h_offset = width.saturating_sub(line.width()) / 2;
        out.extend(std::iter::repeat(' ').take(h_offset));
        out.push_str(line);
        out.push('\n');
    }
    out
}
