//! Approximate glyph metrics for handwriting fonts.
//!
//! Widths are in em units (relative to font size). Handwriting faces vary a
//! lot less by glyph than by family, so characters are grouped into a few
//! width classes and each family gets an overall width factor. Non-ASCII
//! characters fall back to the regular lowercase width.

use crate::HandwrittenFont;

const SPACE: f32 = 0.28;
const NARROW: f32 = 0.26;
const REGULAR: f32 = 0.50;
const WIDE: f32 = 0.74;
const CAPITAL: f32 = 0.62;
const WIDE_CAPITAL: f32 = 0.82;
const DIGIT: f32 = 0.52;
const PUNCTUATION: f32 = 0.34;
const SYMBOL: f32 = 0.58;

/// Family width profiles, matched case-insensitively against the font family.
const FAMILY_FACTORS: &[(&str, f32)] = &[
    ("caveat", 0.88),
    ("kalam", 0.96),
    ("patrick hand", 0.92),
    ("shadows into light", 0.98),
    ("indie flower", 1.08),
    ("gloria hallelujah", 1.15),
    ("homemade apple", 1.25),
    ("dancing script", 0.94),
    ("architects daughter", 1.06),
];

/// Character-width model for one font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    width_factor: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self { width_factor: 1.0 }
    }
}

impl FontMetrics {
    /// Metrics with an explicit width factor (1.0 = reference handwriting).
    #[must_use]
    pub fn with_width_factor(width_factor: f32) -> Self {
        Self {
            width_factor: if width_factor.is_finite() && width_factor > 0.0 {
                width_factor
            } else {
                1.0
            },
        }
    }

    /// Metrics for a resolved font, chosen by family name.
    #[must_use]
    pub fn for_font(font: &HandwrittenFont) -> Self {
        Self::for_family(&font.family)
    }

    /// Metrics for a font family name. Unknown families use factor 1.0.
    #[must_use]
    pub fn for_family(family: &str) -> Self {
        let family = family.to_ascii_lowercase();
        FAMILY_FACTORS
            .iter()
            .find(|(name, _)| family.contains(name))
            .map_or_else(Self::default, |&(_, factor)| Self::with_width_factor(factor))
    }

    /// The family width factor.
    #[must_use]
    pub fn width_factor(&self) -> f32 {
        self.width_factor
    }

    /// Width of one character in em units.
    #[must_use]
    pub fn char_em(&self, c: char) -> f32 {
        let base = match c {
            ' ' | '\u{a0}' => SPACE,
            'i' | 'j' | 'l' | 'I' | 'f' | 't' | 'r' | '!' | '|' | '\'' | '.' | ',' | ':' | ';' => {
                NARROW
            }
            'm' | 'w' | '@' | '%' | '&' | '#' => WIDE,
            'M' | 'W' => WIDE_CAPITAL,
            'A'..='Z' => CAPITAL,
            '0'..='9' => DIGIT,
            '"' | '(' | ')' | '[' | ']' | '{' | '}' | '-' | '`' => PUNCTUATION,
            c if c.is_ascii_punctuation() => SYMBOL,
            _ => REGULAR,
        };
        base * self.width_factor
    }

    /// Rendered width of `text` in pixels at `font_size`.
    #[must_use]
    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|c| self.char_em(c)).sum::<f32>() * font_size
    }
}
