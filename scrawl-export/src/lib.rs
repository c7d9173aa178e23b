//! # Scrawl Export
//!
//! Batched PDF export for laid-out answer pages.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │ ExportOptions│──▶│  batches of  │──▶│ resvg raster │──▶│ printpdf │
//! │  (validated) │   │ CanvasPages  │   │  → PNG pages │   │ assembly │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────┘
//!                          │ yield + progress per batch
//! ```
//!
//! The estimators in [`estimate`] size batches so that only one batch of
//! full-resolution surfaces is alive at a time. Assembly re-encodes the
//! retained PNG pages one by one into JPEG streams, so encoding adds at most
//! a single raw page on top of the compressed output.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod estimate;
pub mod options;
pub mod pdf;
pub mod pipeline;
pub mod progress;
pub mod render;

pub use error::{ExportError, ExportResult, RenderError, RenderResult};
pub use estimate::{
    estimate_file_size, estimate_memory_usage, format_file_size, quality_factor,
    raster_megabytes, recommended_batch_size, should_use_progressive,
};
pub use options::{
    validate_options, ExportOptions, Orientation, PaperFormat, ResolvedExportOptions,
    ValidationReport,
};
pub use pdf::{PdfBlob, PDF_MIME};
pub use pipeline::PdfExporter;
pub use progress::{CancelFlag, ExportProgress, ExportStage, ProgressCallback};
pub use render::{FontDatabase, InkStyle, PageRasterizer, PageSurface, RasterPage, SvgRasterizer};
