//! The layout engine: answers in, paginated lines out.
//!
//! Pagination is a pure function of the answers, the font and the page
//! style. The engine adds a private cache in front of it keyed by those
//! three inputs.

use std::sync::Arc;

use crate::cache::{CacheStats, LayoutCache, LayoutCacheConfig, LayoutKey};
use crate::wrap::wrap_text;
use crate::{
    Answer, CanvasLine, CanvasPage, FontMetrics, HandwrittenFont, Layout, LayoutError,
    LayoutResult, PageGeometry, PageStyle, StyleMetrics,
};

/// Configuration for a layout engine.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Canvas page size.
    pub geometry: PageGeometry,
    /// Empty line slots left between consecutive answers.
    pub answer_gap_lines: usize,
    /// Cache bounds.
    pub cache: LayoutCacheConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::A4,
            answer_gap_lines: 1,
            cache: LayoutCacheConfig::default(),
        }
    }
}

/// Paginates answers and caches the results per input combination.
#[derive(Debug)]
pub struct LayoutEngine {
    config: LayoutConfig,
    cache: LayoutCache,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    /// Create an engine with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// Create an engine with custom configuration.
    #[must_use]
    pub fn with_config(config: LayoutConfig) -> Self {
        let cache = LayoutCache::with_config(config.cache.clone());
        Self { config, cache }
    }

    /// Get the engine configuration.
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `answers` on pages of `style` using `font`'s metrics.
    ///
    /// Identical inputs return the cached layout; any change to an answer's
    /// text, the font id or the style re-paginates from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoAnswers`] for an empty slice and
    /// [`LayoutError::InvalidQuestionNumber`] for a question number of 0.
    pub fn calculate_layout(
        &mut self,
        answers: &[Answer],
        font: &HandwrittenFont,
        style: PageStyle,
    ) -> LayoutResult<Arc<Layout>> {
        validate_answers(answers)?;

        let key = LayoutKey::new(answers, font, style);
        if let Some(layout) = self.cache.get(&key) {
            tracing::debug!("Layout cache hit {:016x}", key.value());
            return Ok(layout);
        }

        let layout = Arc::new(paginate(answers, font, style, &self.config));
        tracing::debug!(
            "Paginated {} answers into {} pages ({} lines, style {}, font {})",
            answers.len(),
            layout.page_count(),
            layout.total_lines(),
            style,
            font.id
        );
        self.cache.insert(key, Arc::clone(&layout));
        Ok(layout)
    }

    /// Drop every cached layout. The engine stays usable.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Cache hit/miss/eviction counters.
    #[must_use]
    pub fn cache_stats(&self) -> &CacheStats {
        self.cache.stats()
    }

    /// Number of layouts currently cached.
    #[must_use]
    pub fn cached_layouts(&self) -> usize {
        self.cache.len()
    }

    /// Tear the engine down, releasing its cache.
    pub fn destroy(mut self) {
        tracing::debug!("Destroying layout engine ({} cached layouts)", self.cache.len());
        self.cache.clear();
    }
}

fn validate_answers(answers: &[Answer]) -> LayoutResult<()> {
    if answers.is_empty() {
        return Err(LayoutError::NoAnswers);
    }
    if let Some(bad) = answers.iter().find(|a| a.question_number == 0) {
        return Err(LayoutError::InvalidQuestionNumber(bad.question_number));
    }
    Ok(())
}

/// Paginate without caching.
///
/// Answers are placed in ascending question order (ties keep input order).
/// The result always has at least one page.
#[must_use]
pub fn paginate(
    answers: &[Answer],
    font: &HandwrittenFont,
    style: PageStyle,
    config: &LayoutConfig,
) -> Layout {
    let style_metrics = style.metrics();
    let font_metrics = FontMetrics::for_font(font);
    let max_width = style_metrics.content_width(config.geometry);
    let capacity = style_metrics.lines_per_page(config.geometry);

    let mut ordered: Vec<&Answer> = answers.iter().collect();
    ordered.sort_by_key(|a| a.question_number);

    let mut cursor = PageCursor::new(style, style_metrics, capacity);
    let mut placed_any = false;

    for answer in ordered {
        let lines = wrap_text(
            &answer.content,
            max_width,
            &font_metrics,
            style_metrics.font_size,
        );
        if lines.is_empty() {
            continue;
        }
        if placed_any {
            cursor.skip(config.answer_gap_lines);
        }
        for text in lines {
            if text.is_empty() {
                cursor.skip(1);
            } else {
                cursor.place(text);
            }
        }
        placed_any = true;
    }

    cursor.finish()
}

/// Tracks the open page and the next free line slot on it.
struct PageCursor {
    sealed: Vec<CanvasPage>,
    current: CanvasPage,
    slot: usize,
    capacity: usize,
    metrics: StyleMetrics,
}

impl PageCursor {
    fn new(style: PageStyle, metrics: StyleMetrics, capacity: usize) -> Self {
        Self {
            sealed: Vec::new(),
            current: CanvasPage::new(1, style),
            slot: 0,
            capacity,
            metrics,
        }
    }

    fn place(&mut self, text: String) {
        if self.slot >= self.capacity {
            self.seal();
        }
        self.current.lines.push(CanvasLine {
            text,
            x: self.metrics.margin_left,
            y: self.metrics.baseline_y(self.slot),
            font_size: self.metrics.font_size,
        });
        self.slot += 1;
    }

    /// Leave `count` slots empty. Gaps never open a page.
    fn skip(&mut self, count: usize) {
        if self.slot > 0 {
            self.slot = (self.slot + count).min(self.capacity);
        }
    }

    fn seal(&mut self) {
        let next = CanvasPage::new(self.current.page_number + 1, self.current.style);
        self.sealed.push(std::mem::replace(&mut self.current, next));
        self.slot = 0;
    }

    fn finish(mut self) -> Layout {
        self.sealed.push(self.current);
        Layout::new(self.sealed)
    }
}
