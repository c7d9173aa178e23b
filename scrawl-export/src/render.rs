//! Page rasterization.
//!
//! Each [`CanvasPage`] is drawn as an SVG document (paper background, style
//! decoration, one `<text>` per line) and rasterized with resvg into a
//! tiny-skia pixmap, which is then PNG-encoded. The [`PageRasterizer`] trait
//! lets callers swap the renderer out.

use std::fmt::Write;
use std::sync::Arc;

use scrawl_core::{CanvasPage, PageGeometry, PageStyle, StyleMetrics};

use crate::error::{RenderError, RenderResult};

/// Font database the SVG rasterizer resolves text against.
pub use usvg::fontdb::Database as FontDatabase;

/// Paper background.
const PAPER_COLOR: &str = "#ffffff";
/// Horizontal rules on ruled paper.
const RULE_COLOR: &str = "#a8c6e8";
/// Vertical margin line on ruled paper.
const MARGIN_COLOR: &str = "#e57373";
/// Grid lines.
const GRID_COLOR: &str = "#d6e4f0";
/// Dots on dotted paper.
const DOT_COLOR: &str = "#b0bec5";
/// Distance of the margin line left of the text column.
const MARGIN_LINE_INSET: f32 = 16.0;
const DOT_RADIUS: f32 = 1.2;

/// Target drawing surface for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSurface {
    /// Surface width in pixels.
    pub width_px: u32,
    /// Surface height in pixels.
    pub height_px: u32,
    /// Page geometry the lines were positioned against.
    pub geometry: PageGeometry,
}

/// How text is inked onto the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkStyle {
    /// Font family used for every line.
    pub font_family: String,
    /// CSS color for the handwriting strokes.
    pub stroke_color: String,
    /// Paper decoration.
    pub style: PageStyle,
}

/// One rasterized, PNG-encoded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPage {
    /// Source page number.
    pub page_number: u32,
    /// PNG bytes.
    pub png: Vec<u8>,
    /// Pixel width.
    pub width_px: u32,
    /// Pixel height.
    pub height_px: u32,
}

/// Renders a page onto a surface.
///
/// Implementations must be callable from any thread.
pub trait PageRasterizer: Send + Sync {
    /// Rasterize `page` onto `surface` using `ink`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the page cannot be drawn or encoded.
    fn rasterize(
        &self,
        page: &CanvasPage,
        surface: &PageSurface,
        ink: &InkStyle,
    ) -> RenderResult<RasterPage>;
}

/// SVG-based rasterizer backed by resvg.
#[derive(Clone)]
pub struct SvgRasterizer {
    fontdb: Arc<FontDatabase>,
}

impl SvgRasterizer {
    /// Create a rasterizer that resolves fonts from `fontdb`.
    #[must_use]
    pub fn new(fontdb: Arc<FontDatabase>) -> Self {
        Self { fontdb }
    }

    /// Create a rasterizer using the fonts installed on this system.
    #[must_use]
    pub fn with_system_fonts() -> Self {
        let mut db = FontDatabase::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "Loaded system fonts");
        Self::new(Arc::new(db))
    }

    /// Create a rasterizer from raw font file bytes (TTF/OTF/WOFF as supported by fontdb).
    #[must_use]
    pub fn with_font_data(data: Vec<u8>) -> Self {
        let mut db = FontDatabase::new();
        db.load_font_data(data);
        tracing::debug!(faces = db.len(), "Loaded font data");
        Self::new(Arc::new(db))
    }

    /// Number of font faces available for text.
    #[must_use]
    pub fn font_faces(&self) -> usize {
        self.fontdb.len()
    }

    fn rasterize_svg(&self, svg: &str, surface: &PageSurface) -> RenderResult<tiny_skia::Pixmap> {
        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fontdb);

        let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| RenderError::Svg(e.to_string()))?;

        let mut pixmap = tiny_skia::Pixmap::new(surface.width_px, surface.height_px).ok_or(
            RenderError::Surface {
                width: surface.width_px,
                height: surface.height_px,
            },
        )?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::with_system_fonts()
    }
}

impl std::fmt::Debug for SvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRasterizer")
            .field("font_faces", &self.fontdb.len())
            .finish()
    }
}

impl PageRasterizer for SvgRasterizer {
    fn rasterize(
        &self,
        page: &CanvasPage,
        surface: &PageSurface,
        ink: &InkStyle,
    ) -> RenderResult<RasterPage> {
        let svg = page_to_svg(page, surface, ink);
        let pixmap = self.rasterize_svg(&svg, surface)?;
        let png = pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))?;

        tracing::trace!(
            page = page.page_number,
            lines = page.lines.len(),
            bytes = png.len(),
            "Rasterized page"
        );

        Ok(RasterPage {
            page_number: page.page_number,
            png,
            width_px: surface.width_px,
            height_px: surface.height_px,
        })
    }
}

/// Build the SVG document for a page.
///
/// The view box is the layout geometry, so line coordinates are used as-is
/// and scaled to the surface by the renderer.
#[must_use]
pub fn page_to_svg(page: &CanvasPage, surface: &PageSurface, ink: &InkStyle) -> String {
    let geometry = surface.geometry;
    let metrics = ink.style.metrics();
    let mut svg = String::with_capacity(4096 + page.lines.len() * 128);

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        surface.width_px, surface.height_px, geometry.width, geometry.height,
    );
    let _ = write!(
        svg,
        "<rect width=\"{}\" height=\"{}\" fill=\"{PAPER_COLOR}\"/>",
        geometry.width, geometry.height,
    );

    match ink.style {
        PageStyle::Ruled => ruled_decoration(&mut svg, &metrics, geometry),
        PageStyle::Grid => grid_decoration(&mut svg, &metrics, geometry),
        PageStyle::Dotted => dotted_decoration(&mut svg, &metrics, geometry),
        PageStyle::Plain => {}
    }

    let family = escape_xml(&ink.font_family);
    let fill = escape_xml(&ink.stroke_color);
    for line in &page.lines {
        let _ = write!(
            svg,
            "<text xml:space=\"preserve\" x=\"{}\" y=\"{}\" font-size=\"{}\" font-family=\"&apos;{family}&apos;, cursive\" fill=\"{fill}\">{}</text>",
            line.x,
            line.y,
            line.font_size,
            escape_xml(&line.text),
        );
    }

    svg.push_str("</svg>");
    svg
}

/// Row positions of the writing lines, one per slot.
#[allow(clippy::cast_precision_loss)]
fn rule_rows(metrics: &StyleMetrics, geometry: PageGeometry) -> impl Iterator<Item = f32> {
    let top = metrics.margin_top;
    let pitch = metrics.line_height;
    (1..=metrics.lines_per_page(geometry)).map(move |k| top + k as f32 * pitch)
}

fn ruled_decoration(svg: &mut String, metrics: &StyleMetrics, geometry: PageGeometry) {
    for y in rule_rows(metrics, geometry) {
        let _ = write!(
            svg,
            "<line x1=\"0\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"{RULE_COLOR}\" stroke-width=\"1\"/>",
            geometry.width,
        );
    }
    let x = (metrics.margin_left - MARGIN_LINE_INSET).max(0.0);
    let _ = write!(
        svg,
        "<line x1=\"{x}\" y1=\"0\" x2=\"{x}\" y2=\"{}\" stroke=\"{MARGIN_COLOR}\" stroke-width=\"1.5\"/>",
        geometry.height,
    );
}

fn grid_decoration(svg: &mut String, metrics: &StyleMetrics, geometry: PageGeometry) {
    let pitch = metrics.line_height.max(1.0);
    let mut x = 0.0;
    while x <= geometry.width {
        let _ = write!(
            svg,
            "<line x1=\"{x}\" y1=\"0\" x2=\"{x}\" y2=\"{}\" stroke=\"{GRID_COLOR}\" stroke-width=\"0.75\"/>",
            geometry.height,
        );
        x += pitch;
    }
    let mut y = 0.0;
    while y <= geometry.height {
        let _ = write!(
            svg,
            "<line x1=\"0\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"{GRID_COLOR}\" stroke-width=\"0.75\"/>",
            geometry.width,
        );
        y += pitch;
    }
}

fn dotted_decoration(svg: &mut String, metrics: &StyleMetrics, geometry: PageGeometry) {
    let pitch = metrics.line_height.max(1.0);
    let right = geometry.width - metrics.margin_right;
    for y in rule_rows(metrics, geometry) {
        let mut x = metrics.margin_left;
        while x <= right {
            let _ = write!(
                svg,
                "<circle cx=\"{x}\" cy=\"{y}\" r=\"{DOT_RADIUS}\" fill=\"{DOT_COLOR}\"/>",
            );
            x += pitch;
        }
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_core::CanvasLine;

    fn surface(width_px: u32, height_px: u32) -> PageSurface {
        PageSurface {
            width_px,
            height_px,
            geometry: PageGeometry::A4,
        }
    }

    fn ink(style: PageStyle) -> InkStyle {
        InkStyle {
            font_family: "Caveat".into(),
            stroke_color: "#1a237e".into(),
            style,
        }
    }

    fn page_with(text: &str) -> CanvasPage {
        let mut page = CanvasPage::new(1, PageStyle::Ruled);
        page.lines.push(CanvasLine {
            text: text.into(),
            x: 96.0,
            y: 122.0,
            font_size: 22.0,
        });
        page
    }

    fn empty_fonts() -> SvgRasterizer {
        SvgRasterizer::new(Arc::new(FontDatabase::new()))
    }

    #[test]
    fn test_svg_escapes_text_and_preserves_spaces() {
        let svg = page_to_svg(&page_with("a <b> &  c"), &surface(100, 140), &ink(PageStyle::Plain));
        assert!(svg.contains("xml:space=\"preserve\""));
        assert!(svg.contains("a &lt;b&gt; &amp;  c"));
        assert!(svg.contains("fill=\"#1a237e\""));
        assert!(svg.contains("&apos;Caveat&apos;, cursive"));
    }

    #[test]
    fn test_svg_uses_layout_view_box() {
        let svg = page_to_svg(&page_with("x"), &surface(2480, 3508), &ink(PageStyle::Plain));
        assert!(svg.contains("width=\"2480\" height=\"3508\""));
        assert!(svg.contains("viewBox=\"0 0 794 1123\""));
    }

    #[test]
    fn test_ruled_paper_has_rule_per_line_and_margin() {
        let svg = page_to_svg(&page_with("x"), &surface(100, 140), &ink(PageStyle::Ruled));
        let capacity = PageStyle::Ruled.metrics().lines_per_page(PageGeometry::A4);
        assert_eq!(svg.matches(RULE_COLOR).count(), capacity);
        assert_eq!(svg.matches(MARGIN_COLOR).count(), 1);
    }

    #[test]
    fn test_plain_paper_is_undecorated() {
        let svg = page_to_svg(&page_with("x"), &surface(100, 140), &ink(PageStyle::Plain));
        assert!(!svg.contains("<line"));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn test_grid_and_dotted_decorations() {
        let grid = page_to_svg(&page_with("x"), &surface(100, 140), &ink(PageStyle::Grid));
        assert!(grid.matches(GRID_COLOR).count() > 10);
        let dotted = page_to_svg(&page_with("x"), &surface(100, 140), &ink(PageStyle::Dotted));
        assert!(dotted.contains("<circle"));
    }

    #[test]
    fn test_rasterize_produces_png_of_surface_size() {
        let raster = empty_fonts()
            .rasterize(&page_with("hello"), &surface(60, 85), &ink(PageStyle::Ruled))
            .expect("rasterize");
        assert_eq!(raster.page_number, 1);
        assert_eq!((raster.width_px, raster.height_px), (60, 85));
        assert_eq!(&raster.png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_zero_surface_is_an_error() {
        let err = empty_fonts()
            .rasterize(&page_with("hello"), &surface(0, 85), &ink(PageStyle::Plain))
            .expect_err("zero width");
        assert!(matches!(err, RenderError::Surface { width: 0, .. } | RenderError::Svg(_)));
    }
}
