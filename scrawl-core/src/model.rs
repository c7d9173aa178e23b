//! Answers, font records and the paginated output they turn into.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::{LayoutError, LayoutResult, PageStyle};

/// One generated answer, tied to the question it responds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Question number (starts at 1).
    pub question_number: u32,
    /// Plain answer text.
    pub content: String,
    /// Informational word count. Pagination never looks at it.
    #[serde(default)]
    pub word_count: u32,
}

impl Answer {
    /// Create an answer, counting the words of `content`.
    #[must_use]
    pub fn new(question_number: u32, content: impl Into<String>) -> Self {
        let content = content.into();
        let word_count = u32::try_from(content.split_whitespace().count()).unwrap_or(u32::MAX);
        Self {
            question_number,
            content,
            word_count,
        }
    }
}

/// A resolved handwriting typeface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandwrittenFont {
    /// Stable identifier, part of the layout cache key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// CSS font family used when drawing glyphs.
    pub family: String,
    /// Where the font resource can be loaded from.
    pub url: String,
}

impl HandwrittenFont {
    /// Create a font record.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        family: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            family: family.into(),
            url: url.into(),
        }
    }
}

/// A single positioned line of text. `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasLine {
    /// Line text, interior whitespace preserved.
    pub text: String,
    /// Left edge in canvas pixels.
    pub x: f32,
    /// Baseline in canvas pixels.
    pub y: f32,
    /// Font size in canvas pixels.
    pub font_size: f32,
}

/// One page of positioned lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasPage {
    /// 1-based, gapless page number.
    pub page_number: u32,
    /// Lines in top-to-bottom order.
    pub lines: Vec<CanvasLine>,
    /// Page style the lines were placed for.
    pub style: PageStyle,
}

impl CanvasPage {
    /// Create an empty page.
    #[must_use]
    pub fn new(page_number: u32, style: PageStyle) -> Self {
        Self {
            page_number,
            lines: Vec::new(),
            style,
        }
    }

    /// Number of lines on the page.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// The paginated result of a layout pass.
///
/// The line total is derived from the pages every time it is asked for, and
/// serialized as `totalLines` alongside them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Layout {
    /// Pages in ascending page-number order.
    pub pages: Vec<CanvasPage>,
}

impl Layout {
    /// Wrap an ordered page list.
    #[must_use]
    pub fn new(pages: Vec<CanvasPage>) -> Self {
        Self { pages }
    }

    /// Sum of line counts over all pages.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.pages.iter().map(CanvasPage::line_count).sum()
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Per-page line counts, in page order.
    #[must_use]
    pub fn lines_per_page(&self) -> Vec<usize> {
        self.pages.iter().map(CanvasPage::line_count).collect()
    }

    /// Serialize the layout to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> LayoutResult<String> {
        serde_json::to_string(self).map_err(LayoutError::Serialization)
    }

    /// Deserialize a layout from JSON. Any `totalLines` in the input is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> LayoutResult<Self> {
        serde_json::from_str(json).map_err(LayoutError::Serialization)
    }
}

impl Serialize for Layout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Layout", 2)?;
        state.serialize_field("pages", &self.pages)?;
        state.serialize_field("totalLines", &self.total_lines())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, y: f32) -> CanvasLine {
        CanvasLine {
            text: text.to_string(),
            x: 96.0,
            y,
            font_size: 22.0,
        }
    }

    #[test]
    fn test_answer_new_counts_words() {
        let answer = Answer::new(1, "  the quick\tbrown\nfox ");
        assert_eq!(answer.word_count, 4);
        assert_eq!(answer.question_number, 1);
    }

    #[test]
    fn test_answer_deserialize_camel_case() {
        let json = r#"{"questionNumber": 3, "content": "Photosynthesis"}"#;
        let answer: Answer = serde_json::from_str(json).expect("parse");
        assert_eq!(answer.question_number, 3);
        assert_eq!(answer.word_count, 0);
    }

    #[test]
    fn test_total_lines_tracks_pages() {
        let mut page1 = CanvasPage::new(1, PageStyle::Ruled);
        page1.lines.push(line("a", 10.0));
        page1.lines.push(line("b", 20.0));
        let mut page2 = CanvasPage::new(2, PageStyle::Ruled);
        page2.lines.push(line("c", 10.0));

        let mut layout = Layout::new(vec![page1, page2]);
        assert_eq!(layout.total_lines(), 3);
        assert_eq!(layout.lines_per_page(), vec![2, 1]);

        layout.pages[1].lines.clear();
        assert_eq!(layout.total_lines(), 2);
    }

    #[test]
    fn test_layout_json_carries_total_lines() {
        let mut page = CanvasPage::new(1, PageStyle::Plain);
        page.lines.push(line("hello", 40.0));
        let layout = Layout::new(vec![page]);

        let json = layout.to_json().expect("serialize");
        assert!(json.contains("\"totalLines\":1"));
        assert!(json.contains("\"pageNumber\":1"));
        assert!(json.contains("\"fontSize\":22.0"));
    }

    #[test]
    fn test_layout_json_ignores_stale_total() {
        let json = r#"{"pages":[{"pageNumber":1,"lines":[],"style":"ruled"}],"totalLines":99}"#;
        let layout = Layout::from_json(json).expect("parse");
        assert_eq!(layout.total_lines(), 0);
        assert_eq!(layout.page_count(), 1);
    }
}
