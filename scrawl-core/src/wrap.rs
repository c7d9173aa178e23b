//! Greedy word wrap against measured glyph widths.
//!
//! Whitespace between two words on the same line is kept verbatim; the
//! whitespace at a break is dropped. A word wider than the line is broken
//! between characters.

use crate::FontMetrics;

/// Spaces a tab expands to before measuring.
const TAB_WIDTH: usize = 4;

/// Wrap `text` into lines no wider than `max_width` pixels.
///
/// Paragraphs are separated by newlines. A blank paragraph between two
/// non-blank ones comes back as an empty string so callers can keep the
/// vertical gap; blank paragraphs at the start or end are dropped, so blank
/// text yields no lines at all.
#[must_use]
pub fn wrap_text(text: &str, max_width: f32, metrics: &FontMetrics, font_size: f32) -> Vec<String> {
    let normalized = text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', &" ".repeat(TAB_WIDTH));

    let mut lines = Vec::new();
    for paragraph in normalized.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
        } else {
            wrap_paragraph(paragraph, max_width, metrics, font_size, &mut lines);
        }
    }

    let Some(first) = lines.iter().position(|l| !l.is_empty()) else {
        return Vec::new();
    };
    let last = lines.iter().rposition(|l| !l.is_empty()).unwrap_or(first);
    lines.truncate(last + 1);
    lines.drain(..first);
    lines
}

fn wrap_paragraph(
    paragraph: &str,
    max_width: f32,
    metrics: &FontMetrics,
    font_size: f32,
    out: &mut Vec<String>,
) {
    let mut line = String::new();
    let mut line_width = 0.0_f32;

    for (gap, word) in segments(paragraph) {
        let gap_width = metrics.measure(gap, font_size);
        let word_width = metrics.measure(word, font_size);

        if line_width + gap_width + word_width <= max_width {
            line.push_str(gap);
            line.push_str(word);
            line_width += gap_width + word_width;
            continue;
        }

        if !line.is_empty() {
            out.push(std::mem::take(&mut line));
            line_width = 0.0;
        }

        if word_width <= max_width {
            line.push_str(word);
            line_width = word_width;
            continue;
        }

        // Hard break an over-long word.
        for c in word.chars() {
            let char_width = metrics.char_em(c) * font_size;
            if !line.is_empty() && line_width + char_width > max_width {
                out.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
            line.push(c);
            line_width += char_width;
        }
    }

    if !line.is_empty() {
        out.push(line);
    }
}

/// Split a paragraph into `(preceding whitespace, word)` pairs. Trailing
/// whitespace is discarded.
fn segments(paragraph: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut gap_start = 0;
    let mut word_start = None;

    for (idx, c) in paragraph.char_indices() {
        match (c.is_whitespace(), word_start) {
            (false, None) => word_start = Some(idx),
            (true, Some(start)) => {
                out.push((&paragraph[gap_start..start], &paragraph[start..idx]));
                gap_start = idx;
                word_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = word_start {
        out.push((&paragraph[gap_start..start], &paragraph[start..]));
    }
    out
}
