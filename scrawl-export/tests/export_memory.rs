//! Peak memory of a many-page export at print resolution.
//!
//! Kept in its own test binary so no other test inflates the process
//! high-water mark.

#![cfg(target_os = "linux")]

use std::sync::Arc;

use scrawl_core::{CanvasPage, HandwrittenFont, PageStyle};
use scrawl_export::{raster_megabytes, ExportOptions, FontDatabase, PdfExporter, SvgRasterizer};

const MIB: f64 = 1024.0 * 1024.0;

/// Read a `kB` field such as `VmHWM` from `/proc/self/status`.
fn status_kib(field: &str) -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status
        .lines()
        .find_map(|line| line.strip_prefix(field)?.strip_prefix(':'))?
        .trim()
        .trim_end_matches("kB")
        .trim()
        .parse()
        .ok()
}

#[allow(clippy::cast_precision_loss)]
fn mib(kib: u64) -> f64 {
    kib as f64 / 1024.0
}

#[tokio::test]
async fn test_peak_memory_is_bounded_by_batch_not_page_count() {
    let Some(rss_before) = status_kib("VmRSS") else {
        eprintln!("/proc/self/status unavailable, skipping");
        return;
    };

    let quality = 150;
    let batch_size = 1;
    let pages: Vec<CanvasPage> = (1..=16).map(|n| CanvasPage::new(n, PageStyle::Plain)).collect();
    let font = HandwrittenFont::new("kalam-regular", "Kalam", "Kalam", "kalam.ttf");
    let exporter = PdfExporter::with_rasterizer(SvgRasterizer::new(Arc::new(FontDatabase::new())));

    let blob = exporter
        .export_to_pdf(
            &pages,
            &font,
            "#000",
            PageStyle::Plain,
            Some(&ExportOptions {
                batch_size: Some(batch_size),
                ..ExportOptions::with_quality(quality)
            }),
        )
        .await
        .expect("export");

    let peak = status_kib("VmHWM").expect("VmHWM");
    let growth_mb = mib(peak.saturating_sub(rss_before));

    // One batch of surfaces plus decode and re-encode working copies, a
    // fixed allowance for the runtime, and the document itself. Holding
    // every page as raw pixels would need several times this.
    let page_mb = raster_megabytes(quality);
    let budget_mb = 6.0 * page_mb * batch_size as f64 + 64.0 + 2.0 * blob.size() as f64 / MIB;
    let all_pages_raw_mb = page_mb * pages.len() as f64;

    assert!(budget_mb < all_pages_raw_mb, "budget {budget_mb:.0}MB");
    assert!(
        growth_mb < budget_mb,
        "peak grew by {growth_mb:.0}MB, budget {budget_mb:.0}MB"
    );
}
