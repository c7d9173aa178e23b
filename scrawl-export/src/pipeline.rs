//! Batched PDF export.
//!
//! [`PdfExporter`] renders pages in batches, yields to the runtime between
//! batches and reports progress through a single callback slot. Only the
//! current batch is held as raw pixels; finished pages are kept as PNG and
//! re-encoded one at a time off the async executor during assembly.

use std::sync::Arc;
use std::time::Instant;

use scrawl_core::{CanvasPage, HandwrittenFont, PageGeometry, PageStyle};

use crate::error::{ExportError, ExportResult};
use crate::estimate::{
    estimate_file_size, estimate_memory_usage, format_file_size, recommended_batch_size,
    should_use_progressive,
};
use crate::options::{ExportOptions, ResolvedExportOptions};
use crate::pdf::{assemble_pdf, PaperSize, PdfBlob};
use crate::progress::{CancelFlag, ExportProgress, ExportStage, ProgressCallback};
use crate::render::{InkStyle, PageRasterizer, PageSurface, RasterPage, SvgRasterizer};

/// Title written into exported documents.
const DOCUMENT_TITLE: &str = "Handwritten Answers";

/// Exports canvas pages to PDF.
///
/// Holds no state between exports apart from the progress callback. One
/// export per instance at a time; overlapping exports would interleave
/// their progress on the shared callback.
pub struct PdfExporter {
    rasterizer: Arc<dyn PageRasterizer>,
    geometry: PageGeometry,
    on_progress: Option<ProgressCallback>,
}

impl PdfExporter {
    /// Create an exporter that renders with system fonts.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rasterizer(SvgRasterizer::with_system_fonts())
    }

    /// Create an exporter with a custom rasterizer.
    #[must_use]
    pub fn with_rasterizer(rasterizer: impl PageRasterizer + 'static) -> Self {
        Self {
            rasterizer: Arc::new(rasterizer),
            geometry: PageGeometry::A4,
            on_progress: None,
        }
    }

    /// Set the geometry the pages were laid out against.
    #[must_use]
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Register the progress callback, replacing any previous one.
    pub fn set_progress_callback<F>(&mut self, callback: F)
    where
        F: Fn(ExportProgress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(callback));
    }

    /// Remove the progress callback.
    pub fn clear_progress_callback(&mut self) {
        self.on_progress = None;
    }

    fn emit(&self, progress: ExportProgress) {
        if let Some(ref callback) = self.on_progress {
            callback(progress);
        }
    }

    /// Export `pages` to a PDF.
    ///
    /// # Errors
    ///
    /// - [`ExportError::Validation`] if `options` break any rule; nothing is
    ///   rendered and no progress is reported.
    /// - [`ExportError::EmptyDocument`] if `pages` is empty.
    /// - [`ExportError::Render`] for the first page that fails to render.
    /// - [`ExportError::Encoding`] if the document cannot be assembled.
    pub async fn export_to_pdf(
        &self,
        pages: &[CanvasPage],
        font: &HandwrittenFont,
        stroke_color: &str,
        style: PageStyle,
        options: Option<&ExportOptions>,
    ) -> ExportResult<PdfBlob> {
        self.export_to_pdf_with_cancel(
            pages,
            font,
            stroke_color,
            style,
            options,
            &CancelFlag::new(),
        )
        .await
    }

    /// Export `pages` to a PDF, stopping at the next batch boundary once
    /// `cancel` is raised.
    ///
    /// # Errors
    ///
    /// As [`export_to_pdf`](Self::export_to_pdf), plus
    /// [`ExportError::Cancelled`] when cancelled. A cancelled export
    /// discards everything rendered so far.
    pub async fn export_to_pdf_with_cancel(
        &self,
        pages: &[CanvasPage],
        font: &HandwrittenFont,
        stroke_color: &str,
        style: PageStyle,
        options: Option<&ExportOptions>,
        cancel: &CancelFlag,
    ) -> ExportResult<PdfBlob> {
        let resolved = match options {
            Some(options) => options.resolve()?,
            None => ResolvedExportOptions::default(),
        };
        if pages.is_empty() {
            return Err(ExportError::EmptyDocument);
        }

        let started = Instant::now();
        self.emit(ExportProgress::stage(ExportStage::Preparing));

        let mut ordered: Vec<&CanvasPage> = pages.iter().collect();
        ordered.sort_by_key(|page| page.page_number);

        let total = ordered.len();
        let quality = resolved.quality;
        let batch_size = resolved
            .batch_size
            .map_or_else(|| recommended_batch_size(total, quality), std::num::NonZeroUsize::get);

        tracing::info!(
            pages = total,
            quality,
            format = %resolved.format,
            orientation = %resolved.orientation,
            batch_size,
            estimated_size = %format_file_size(estimate_file_size(total, quality)),
            "Starting PDF export"
        );
        if should_use_progressive(total, quality) {
            tracing::warn!(
                pages = total,
                quality,
                memory_mb = estimate_memory_usage(total, quality),
                batch_size,
                "Large export, rendering progressively"
            );
        }

        let (width_px, height_px) = resolved.surface_size_px();
        let surface = PageSurface {
            width_px,
            height_px,
            geometry: self.geometry,
        };
        let ink = InkStyle {
            font_family: font.family.clone(),
            stroke_color: stroke_color.to_string(),
            style,
        };

        let mut rendered: Vec<RasterPage> = Vec::with_capacity(total);
        for batch in ordered.chunks(batch_size) {
            if cancel.is_cancelled() {
                tracing::warn!(pages_done = rendered.len(), "Export cancelled");
                return Err(ExportError::Cancelled);
            }

            for page in batch {
                let raster = self
                    .rasterizer
                    .rasterize(page, &surface, &ink)
                    .map_err(|source| {
                        tracing::error!(page = page.page_number, error = %source, "Page render failed");
                        ExportError::Render {
                            page_number: page.page_number,
                            source,
                        }
                    })?;
                rendered.push(raster);
            }

            tracing::debug!(pages_done = rendered.len(), pages_total = total, "Batch rendered");
            self.emit(ExportProgress::rendering(rendered.len(), total));
            tokio::task::yield_now().await;
        }

        if cancel.is_cancelled() {
            tracing::warn!(pages_done = rendered.len(), "Export cancelled before encoding");
            return Err(ExportError::Cancelled);
        }

        self.emit(ExportProgress::stage(ExportStage::Encoding));
        let (width_mm, height_mm) = resolved.paper_size_mm();
        let paper = PaperSize {
            width_mm,
            height_mm,
            dpi: quality,
        };
        let data = tokio::task::spawn_blocking(move || assemble_pdf(DOCUMENT_TITLE, paper, rendered))
            .await
            .map_err(|e| ExportError::Encoding(format!("encoding task failed: {e}")))??;

        let blob = PdfBlob::new(data);
        tracing::info!(
            pages = total,
            size = %format_file_size(blob.size() as u64),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "PDF export complete"
        );
        self.emit(ExportProgress::stage(ExportStage::Complete));
        Ok(blob)
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PdfExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfExporter")
            .field("geometry", &self.geometry)
            .field("has_progress_callback", &self.on_progress.is_some())
            .finish_non_exhaustive()
    }
}
