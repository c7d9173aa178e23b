//! Page styles and page geometry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LayoutError;

/// Canvas page size in pixels at 96 px/in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width in canvas pixels.
    pub width: f32,
    /// Page height in canvas pixels.
    pub height: f32,
}

impl PageGeometry {
    /// A4 portrait (210 × 297 mm) at 96 px/in.
    pub const A4: Self = Self {
        width: 794.0,
        height: 1123.0,
    };

    /// Create a geometry with the given pixel size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Named paper preset controlling margins and line pitch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStyle {
    /// Notebook paper: blue rules and a red margin line.
    #[default]
    Ruled,
    /// Blank paper.
    Plain,
    /// Square grid.
    Grid,
    /// Dot grid.
    Dotted,
}

/// Margins, line pitch and text size for a page style, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleMetrics {
    /// Space above the first line slot.
    pub margin_top: f32,
    /// Space right of the text column.
    pub margin_right: f32,
    /// Space below the last line slot.
    pub margin_bottom: f32,
    /// Space left of the text column.
    pub margin_left: f32,
    /// Distance between consecutive baselines (and rules, on ruled paper).
    pub line_height: f32,
    /// Glyph size.
    pub font_size: f32,
    /// How far the baseline sits above the bottom of its slot.
    pub baseline_offset: f32,
}

impl StyleMetrics {
    /// Width available to text on a page of `geometry`.
    #[must_use]
    pub fn content_width(&self, geometry: PageGeometry) -> f32 {
        (geometry.width - self.margin_left - self.margin_right).max(0.0)
    }

    /// Height available to line slots on a page of `geometry`.
    #[must_use]
    pub fn content_height(&self, geometry: PageGeometry) -> f32 {
        (geometry.height - self.margin_top - self.margin_bottom).max(0.0)
    }

    /// Number of line slots per page. Always at least one.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn lines_per_page(&self, geometry: PageGeometry) -> usize {
        if self.line_height <= 0.0 {
            return 1;
        }
        ((self.content_height(geometry) / self.line_height).floor() as usize).max(1)
    }

    /// Baseline of the zero-based `slot` on a page.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn baseline_y(&self, slot: usize) -> f32 {
        self.margin_top + (slot as f32 + 1.0) * self.line_height - self.baseline_offset
    }
}

impl PageStyle {
    /// All supported styles.
    pub const ALL: [Self; 4] = [Self::Ruled, Self::Plain, Self::Grid, Self::Dotted];

    /// Layout constants for this style.
    #[must_use]
    pub fn metrics(self) -> StyleMetrics {
        match self {
            Self::Ruled => StyleMetrics {
                margin_top: 96.0,
                margin_right: 48.0,
                margin_bottom: 48.0,
                margin_left: 96.0,
                line_height: 32.0,
                font_size: 22.0,
                baseline_offset: 6.0,
            },
            Self::Plain => StyleMetrics {
                margin_top: 72.0,
                margin_right: 64.0,
                margin_bottom: 72.0,
                margin_left: 64.0,
                line_height: 30.0,
                font_size: 20.0,
                baseline_offset: 8.0,
            },
            Self::Grid => StyleMetrics {
                margin_top: 56.0,
                margin_right: 56.0,
                margin_bottom: 56.0,
                margin_left: 56.0,
                line_height: 28.0,
                font_size: 19.0,
                baseline_offset: 6.0,
            },
            Self::Dotted => StyleMetrics {
                margin_top: 60.0,
                margin_right: 60.0,
                margin_bottom: 60.0,
                margin_left: 60.0,
                line_height: 30.0,
                font_size: 20.0,
                baseline_offset: 7.0,
            },
        }
    }

    /// Lowercase token used on the wire and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ruled => "ruled",
            Self::Plain => "plain",
            Self::Grid => "grid",
            Self::Dotted => "dotted",
        }
    }
}

impl fmt::Display for PageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageStyle {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ruled" | "lined" => Ok(Self::Ruled),
            "plain" | "blank" => Ok(Self::Plain),
            "grid" => Ok(Self::Grid),
            "dotted" | "dots" => Ok(Self::Dotted),
            _ => Err(LayoutError::UnknownStyle(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruled_capacity_on_a4() {
        let metrics = PageStyle::Ruled.metrics();
        // (1123 - 96 - 48) / 32 = 30.59
        assert_eq!(metrics.lines_per_page(PageGeometry::A4), 30);
        assert!((metrics.content_width(PageGeometry::A4) - 650.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_every_style_fits_a4() {
        for style in PageStyle::ALL {
            let metrics = style.metrics();
            assert!(metrics.lines_per_page(PageGeometry::A4) >= 20, "{style}");
            assert!(metrics.content_width(PageGeometry::A4) > 500.0, "{style}");
        }
    }

    #[test]
    fn test_tiny_page_still_has_one_slot() {
        let metrics = PageStyle::Ruled.metrics();
        assert_eq!(metrics.lines_per_page(PageGeometry::new(100.0, 50.0)), 1);
    }

    #[test]
    fn test_baselines_step_by_line_height() {
        let metrics = PageStyle::Plain.metrics();
        let first = metrics.baseline_y(0);
        let second = metrics.baseline_y(1);
        assert!((first - (72.0 + 30.0 - 8.0)).abs() < f32::EPSILON);
        assert!((second - first - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_style_tokens_round_trip() {
        for style in PageStyle::ALL {
            assert_eq!(style.as_str().parse::<PageStyle>().expect("parse"), style);
        }
        assert_eq!("Lined".parse::<PageStyle>().expect("alias"), PageStyle::Ruled);
        assert!("parchment".parse::<PageStyle>().is_err());
    }

    #[test]
    fn test_style_serde_lowercase() {
        let json = serde_json::to_string(&PageStyle::Dotted).expect("serialize");
        assert_eq!(json, "\"dotted\"");
    }
}
