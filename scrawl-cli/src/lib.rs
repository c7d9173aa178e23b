//! # Scrawl CLI
//!
//! Reads answers from a JSON file, paginates them onto handwriting pages and
//! writes the result as a PDF.
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap (each flag also has an env var)
//! - `ExportJobConfig` - Plain job description built from the arguments
//! - [`run`] - Layout, optional dry-run estimation, export and file output

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use scrawl_core::{Answer, HandwrittenFont, Layout, LayoutEngine, PageStyle};
use scrawl_export::{
    estimate_file_size, estimate_memory_usage, format_file_size, recommended_batch_size,
    should_use_progressive, ExportOptions, ExportProgress, ExportStage, FontDatabase, PdfExporter,
    SvgRasterizer,
};

/// Font family used when none is given.
pub const DEFAULT_FONT_FAMILY: &str = "Caveat";
/// Ink color used when none is given.
pub const DEFAULT_STROKE_COLOR: &str = "#1a237e";

/// Command-line arguments for scrawl.
#[derive(Debug, Clone, Parser)]
#[command(name = "scrawl")]
#[command(about = "Lay out answers as handwriting and export them to PDF")]
#[command(version)]
pub struct CliArgs {
    /// JSON file holding an array of answers
    #[arg(long, env = "SCRAWL_ANSWERS")]
    pub answers: PathBuf,

    /// Where to write the PDF
    #[arg(short, long, env = "SCRAWL_OUTPUT", default_value = "answers.pdf")]
    pub output: PathBuf,

    /// Page style (ruled, plain, grid, dotted)
    #[arg(long, env = "SCRAWL_STYLE", default_value = "ruled")]
    pub style: String,

    /// Rendering quality in DPI (72-600)
    #[arg(long, env = "SCRAWL_QUALITY")]
    pub quality: Option<u32>,

    /// Paper format (a4, a5, letter, legal)
    #[arg(long, env = "SCRAWL_FORMAT")]
    pub format: Option<String>,

    /// Page orientation (portrait, landscape)
    #[arg(long, env = "SCRAWL_ORIENTATION")]
    pub orientation: Option<String>,

    /// Pages rendered per batch (defaults to a size derived from page count and quality)
    #[arg(long, env = "SCRAWL_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Handwriting font family
    #[arg(long, env = "SCRAWL_FONT_FAMILY", default_value = DEFAULT_FONT_FAMILY)]
    pub font_family: String,

    /// Font file (TTF/OTF) to render with
    #[arg(long, env = "SCRAWL_FONT_FILE")]
    pub font_file: Option<PathBuf>,

    /// Skip scanning installed system fonts
    #[arg(long)]
    pub no_system_fonts: bool,

    /// Ink color for the handwriting
    #[arg(long, env = "SCRAWL_STROKE_COLOR", default_value = DEFAULT_STROKE_COLOR)]
    pub stroke_color: String,

    /// Print estimates without rendering
    #[arg(long)]
    pub dry_run: bool,

    /// Also write the computed layout as JSON
    #[arg(long)]
    pub layout_json: Option<PathBuf>,
}

/// Export job configuration.
#[derive(Debug, Clone)]
pub struct ExportJobConfig {
    /// Answers file.
    pub answers_path: PathBuf,
    /// PDF destination.
    pub output_path: PathBuf,
    /// Page style token, parsed when the job runs.
    pub style: String,
    /// Font to lay out and render with.
    pub font: HandwrittenFont,
    /// Optional font file for rendering.
    pub font_file: Option<PathBuf>,
    /// Whether installed fonts are loaded for rendering.
    pub system_fonts: bool,
    /// Ink color.
    pub stroke_color: String,
    /// Export options, validated by the exporter.
    pub options: ExportOptions,
    /// Estimate only.
    pub dry_run: bool,
    /// Optional layout JSON destination.
    pub layout_json: Option<PathBuf>,
}

impl ExportJobConfig {
    /// Create a job with default settings.
    #[must_use]
    pub fn new(answers_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            answers_path: answers_path.into(),
            output_path: output_path.into(),
            style: PageStyle::default().to_string(),
            font: font_for_family(DEFAULT_FONT_FAMILY, None),
            font_file: None,
            system_fonts: true,
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            options: ExportOptions::default(),
            dry_run: false,
            layout_json: None,
        }
    }

    /// Parse the configured page style.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown style token.
    pub fn page_style(&self) -> anyhow::Result<PageStyle> {
        self.style
            .parse()
            .with_context(|| format!("invalid --style {:?}", self.style))
    }
}

impl From<CliArgs> for ExportJobConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            answers_path: args.answers,
            output_path: args.output,
            style: args.style,
            font: font_for_family(&args.font_family, args.font_file.as_deref()),
            font_file: args.font_file,
            system_fonts: !args.no_system_fonts,
            stroke_color: args.stroke_color,
            options: ExportOptions {
                quality: args.quality,
                format: args.format,
                orientation: args.orientation,
                batch_size: args.batch_size,
            },
            dry_run: args.dry_run,
            layout_json: args.layout_json,
        }
    }
}

/// Build a font record for `family`, pointing at `file` when one is given.
#[must_use]
pub fn font_for_family(family: &str, file: Option<&Path>) -> HandwrittenFont {
    let id = family.trim().to_ascii_lowercase().replace(' ', "-");
    let url = file.map_or_else(
        || format!("system:{id}"),
        |path| format!("file://{}", path.display()),
    );
    HandwrittenFont::new(id, family, family, url)
}

/// Read answers from a JSON array.
///
/// Missing word counts are filled in from the content.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not an answer array.
pub async fn load_answers(path: &Path) -> anyhow::Result<Vec<Answer>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read answers from {}", path.display()))?;
    let mut answers: Vec<Answer> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of answers", path.display()))?;
    for answer in &mut answers {
        if answer.word_count == 0 {
            answer.word_count =
                u32::try_from(answer.content.split_whitespace().count()).unwrap_or(u32::MAX);
        }
    }
    Ok(answers)
}

/// Build the rasterizer for a job.
///
/// Font directories are scanned on the blocking pool.
///
/// # Errors
///
/// Returns an error if the font file cannot be read.
pub async fn build_rasterizer(config: &ExportJobConfig) -> anyhow::Result<SvgRasterizer> {
    let font_data = match config.font_file {
        Some(ref path) => Some(
            tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read font file {}", path.display()))?,
        ),
        None => None,
    };
    let system_fonts = config.system_fonts;

    let db = tokio::task::spawn_blocking(move || {
        let mut db = FontDatabase::new();
        if system_fonts {
            db.load_system_fonts();
        }
        if let Some(data) = font_data {
            db.load_font_data(data);
        }
        db
    })
    .await
    .context("font loading task failed")?;

    tracing::debug!(faces = db.len(), "Font database ready");
    Ok(SvgRasterizer::new(std::sync::Arc::new(db)))
}

/// Pre-flight estimates for an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunReport {
    /// Pages in the layout.
    pub pages: usize,
    /// Total lines in the layout.
    pub lines: usize,
    /// Rendering quality in DPI.
    pub quality: u32,
    /// Estimated PDF size in bytes.
    pub estimated_bytes: u64,
    /// Estimated unbatched memory in MB.
    pub estimated_memory_mb: f64,
    /// Pages per batch that would be used.
    pub batch_size: usize,
    /// Whether progressive rendering is recommended.
    pub progressive: bool,
}

impl DryRunReport {
    /// Estimate the export of `layout` with `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid.
    pub fn new(layout: &Layout, options: &ExportOptions) -> anyhow::Result<Self> {
        let resolved = options.resolve()?;
        let pages = layout.page_count();
        let quality = resolved.quality;
        Ok(Self {
            pages,
            lines: layout.total_lines(),
            quality,
            estimated_bytes: estimate_file_size(pages, quality),
            estimated_memory_mb: estimate_memory_usage(pages, quality),
            batch_size: resolved
                .batch_size
                .map_or_else(|| recommended_batch_size(pages, quality), std::num::NonZeroUsize::get),
            progressive: should_use_progressive(pages, quality),
        })
    }
}

impl fmt::Display for DryRunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pages:        {} ({} lines)", self.pages, self.lines)?;
        writeln!(f, "quality:      {} dpi", self.quality)?;
        writeln!(f, "size:         ~{}", format_file_size(self.estimated_bytes))?;
        writeln!(f, "memory:       ~{:.0} MB unbatched", self.estimated_memory_mb)?;
        writeln!(f, "batch size:   {}", self.batch_size)?;
        write!(
            f,
            "progressive:  {}",
            if self.progressive { "yes" } else { "no" }
        )
    }
}

/// What a job produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Estimates only; nothing was rendered.
    DryRun(DryRunReport),
    /// A PDF was written.
    Exported {
        /// Output path.
        path: PathBuf,
        /// Pages exported.
        pages: usize,
        /// Bytes written.
        bytes: usize,
    },
}

/// Run an export job.
///
/// # Errors
///
/// Returns an error if the answers cannot be loaded or laid out, the options
/// are invalid, rendering fails, or an output file cannot be written.
pub async fn run(config: &ExportJobConfig) -> anyhow::Result<RunOutcome> {
    let style = config.page_style()?;
    let answers = load_answers(&config.answers_path).await?;

    let mut engine = LayoutEngine::new();
    let layout = engine
        .calculate_layout(&answers, &config.font, style)
        .context("layout failed")?;
    tracing::info!(
        answers = answers.len(),
        pages = layout.page_count(),
        lines = layout.total_lines(),
        %style,
        "Layout computed"
    );

    if let Some(ref path) = config.layout_json {
        let json = layout.to_json().context("failed to serialize layout")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write layout to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Layout written");
    }

    if config.dry_run {
        return Ok(RunOutcome::DryRun(DryRunReport::new(&layout, &config.options)?));
    }

    let rasterizer = build_rasterizer(config).await?;
    let mut exporter = PdfExporter::with_rasterizer(rasterizer)
        .with_geometry(engine.config().geometry);
    exporter.set_progress_callback(log_progress);

    let blob = exporter
        .export_to_pdf(
            &layout.pages,
            &config.font,
            &config.stroke_color,
            style,
            Some(&config.options),
        )
        .await
        .context("PDF export failed")?;
    engine.destroy();

    let bytes = blob.size();
    tokio::fs::write(&config.output_path, blob.into_bytes())
        .await
        .with_context(|| format!("failed to write {}", config.output_path.display()))?;

    Ok(RunOutcome::Exported {
        path: config.output_path.clone(),
        pages: layout.page_count(),
        bytes,
    })
}

fn log_progress(progress: ExportProgress) {
    match progress.stage {
        ExportStage::Rendering => tracing::info!(
            done = progress.pages_done,
            total = progress.pages_total,
            "Rendering"
        ),
        stage => tracing::info!(stage = stage.as_str(), "Export progress"),
    }
}
