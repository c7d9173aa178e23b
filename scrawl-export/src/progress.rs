//! Export progress reporting and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Stage of a running export. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStage {
    /// Options resolved, batching planned.
    Preparing,
    /// Pages are being rasterized.
    Rendering,
    /// Rendered pages are being assembled into the PDF.
    Encoding,
    /// The PDF is ready.
    Complete,
}

impl ExportStage {
    /// Stage name as reported to callers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Rendering => "rendering",
            Self::Encoding => "encoding",
            Self::Complete => "complete",
        }
    }
}

/// A progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProgress {
    /// Current stage.
    pub stage: ExportStage,
    /// Pages rendered so far, during rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_done: Option<usize>,
    /// Pages in the document, during rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_total: Option<usize>,
}

impl ExportProgress {
    /// A stage transition with no page counts.
    #[must_use]
    pub fn stage(stage: ExportStage) -> Self {
        Self {
            stage,
            pages_done: None,
            pages_total: None,
        }
    }

    /// Rendering progress after a batch.
    #[must_use]
    pub fn rendering(pages_done: usize, pages_total: usize) -> Self {
        Self {
            stage: ExportStage::Rendering,
            pages_done: Some(pages_done),
            pages_total: Some(pages_total),
        }
    }

    /// Fraction of pages rendered, when counts are known.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> Option<f32> {
        match (self.pages_done, self.pages_total) {
            (Some(done), Some(total)) if total > 0 => Some(done as f32 / total as f32),
            _ => None,
        }
    }
}

/// Progress callback type.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Cooperative cancellation token, checked between batches.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// A flag that has not been raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
