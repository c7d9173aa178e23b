//! Size, memory and batching heuristics.
//!
//! All estimates derive from the raster area of an A4 surface at the
//! requested quality, so they grow with both page count and quality.
//! They guide batching and pre-flight warnings; actual output varies with
//! page content.

use crate::options::MIN_QUALITY;

/// Quality the factors are normalised against.
const REFERENCE_DPI: f64 = 96.0;
/// A4 side lengths in inches.
const A4_WIDTH_IN: f64 = 210.0 / 25.4;
const A4_HEIGHT_IN: f64 = 297.0 / 25.4;
const BYTES_PER_PIXEL: f64 = 4.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Fixed PDF overhead (header, xref, trailer).
const PDF_OVERHEAD_BYTES: f64 = 1024.0;
/// Encoded page size at the reference quality.
const PAGE_BYTES_AT_REFERENCE: f64 = 48.0 * 1024.0;

/// Baseline process memory attributed to an export.
const BASE_MEMORY_MB: f64 = 32.0;
/// Unbatched memory above which progressive rendering is recommended.
const PROGRESSIVE_MEMORY_MB: f64 = 512.0;
/// Render cost (pages × quality factor) above which progressive rendering is recommended.
const PROGRESSIVE_COST_THRESHOLD: f64 = 10.0;

/// Memory a batch of rasters may use.
const BATCH_BUDGET_MB: f64 = 256.0;
/// Floor for the batch budget once retained pages are subtracted.
const MIN_BATCH_BUDGET_MB: f64 = 96.0;
/// Largest batch ever recommended.
pub const MAX_BATCH_SIZE: usize = 16;

/// Raster area relative to the reference quality: `(quality / 96)²`.
#[must_use]
pub fn quality_factor(quality: u32) -> f64 {
    let ratio = f64::from(quality.max(1)) / REFERENCE_DPI;
    ratio * ratio
}

/// Size of one RGBA page surface at `quality`, in MiB.
#[must_use]
pub fn raster_megabytes(quality: u32) -> f64 {
    let dpi = f64::from(quality.max(1));
    (A4_WIDTH_IN * dpi) * (A4_HEIGHT_IN * dpi) * BYTES_PER_PIXEL / MIB
}

/// Estimated size of the exported PDF in bytes.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn estimate_file_size(page_count: usize, quality: u32) -> u64 {
    let pages = page_count as f64;
    let bytes = PDF_OVERHEAD_BYTES + pages * PAGE_BYTES_AT_REFERENCE * quality_factor(quality);
    bytes.ceil() as u64
}

/// Estimated peak memory in MB for rendering every page in a single pass.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate_memory_usage(page_count: usize, quality: u32) -> f64 {
    BASE_MEMORY_MB + page_count as f64 * raster_megabytes(quality)
}

/// Whether the document is big enough to warrant batched, progress-reporting export.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn should_use_progressive(page_count: usize, quality: u32) -> bool {
    let cost = page_count as f64 * quality_factor(quality);
    cost > PROGRESSIVE_COST_THRESHOLD
        || estimate_memory_usage(page_count, quality) > PROGRESSIVE_MEMORY_MB
}

/// Pages to render between yields.
///
/// The batch budget shrinks as encoded pages pile up, and each batch must
/// fit its rasters into what is left. Higher quality means larger rasters
/// and therefore smaller batches.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn recommended_batch_size(page_count: usize, quality: u32) -> usize {
    let quality = quality.max(MIN_QUALITY);
    let retained_mb = estimate_file_size(page_count, quality) as f64 / MIB;
    let budget = (BATCH_BUDGET_MB - retained_mb).max(MIN_BATCH_BUDGET_MB);
    let fit = (budget / raster_megabytes(quality)).floor() as usize;
    fit.clamp(1, MAX_BATCH_SIZE)
}

/// Human-readable byte count: `"500 B"`, `"1.0 KB"`, `"1.0 MB"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB_BYTES: u64 = KIB * KIB;

    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB_BYTES {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB_BYTES as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(500), "500 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }

    #[test]
    fn test_progressive_reference_points() {
        assert!(should_use_progressive(25, 300));
        assert!(!should_use_progressive(5, 96));
    }

    #[test]
    fn test_progressive_for_huge_low_quality_documents() {
        assert!(should_use_progressive(200, 72));
        assert!(!should_use_progressive(1, 300));
    }

    #[test]
    fn test_batch_shrinks_at_high_quality() {
        for pages in [1, 2, 5, 10, 25, 50, 100, 500] {
            let high = recommended_batch_size(pages, 600);
            let mid = recommended_batch_size(pages, 300);
            assert!(high < mid, "{pages} pages: {high} !< {mid}");
            assert!(high >= 1);
        }
    }

    #[test]
    fn test_batch_capped() {
        assert_eq!(recommended_batch_size(10, 72), MAX_BATCH_SIZE);
    }

    #[test]
    fn test_file_size_positive() {
        assert!(estimate_file_size(0, 72) > 0);
        assert!(estimate_file_size(1, 96) > 48 * 1024);
    }

    #[test]
    fn test_memory_positive() {
        assert!(estimate_memory_usage(0, 72) > 0.0);
    }

    #[test]
    fn test_quality_factor_reference() {
        assert!((quality_factor(96) - 1.0).abs() < f64::EPSILON);
        assert!(quality_factor(300) > quality_factor(150));
    }

    proptest! {
        #[test]
        fn prop_file_size_monotonic(pages in 0usize..500, extra in 0usize..100, q in 72u32..=600, dq in 0u32..200) {
            let q2 = (q + dq).min(600);
            prop_assert!(estimate_file_size(pages + extra, q) >= estimate_file_size(pages, q));
            prop_assert!(estimate_file_size(pages, q2) >= estimate_file_size(pages, q));
        }

        #[test]
        fn prop_memory_monotonic(pages in 0usize..500, extra in 0usize..100, q in 72u32..=600, dq in 0u32..200) {
            let q2 = (q + dq).min(600);
            prop_assert!(estimate_memory_usage(pages + extra, q) >= estimate_memory_usage(pages, q));
            prop_assert!(estimate_memory_usage(pages, q2) >= estimate_memory_usage(pages, q));
        }

        #[test]
        fn prop_batch_non_increasing_in_quality(pages in 1usize..500, q in 72u32..=600, dq in 0u32..200) {
            let q2 = (q + dq).min(600);
            prop_assert!(recommended_batch_size(pages, q2) <= recommended_batch_size(pages, q));
        }

        #[test]
        fn prop_progressive_monotonic(pages in 0usize..200, extra in 0usize..50, q in 72u32..=600) {
            if should_use_progressive(pages, q) {
                prop_assert!(should_use_progressive(pages + extra, q));
            }
        }
    }
}
