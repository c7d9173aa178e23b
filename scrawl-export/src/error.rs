//! Export error types.

use thiserror::Error;

/// Result type for single-page rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while rendering one page.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The generated SVG could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// The drawing surface could not be allocated.
    #[error("Failed to create {width}x{height} drawing surface")]
    Surface {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The rendered surface could not be encoded.
    #[error("Page encoding failed: {0}")]
    Encode(String),
}

/// Errors that abort an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export options broke one or more rules. Every violation is listed.
    #[error("Invalid export options: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// There were no pages to export.
    #[error("Nothing to export: the document has no pages")]
    EmptyDocument,

    /// A page failed to render.
    #[error("Failed to render page {page_number}: {source}")]
    Render {
        /// Page that failed.
        page_number: u32,
        /// Underlying cause.
        #[source]
        source: RenderError,
    },

    /// The rendered pages could not be assembled into a PDF.
    #[error("PDF encoding failed: {0}")]
    Encoding(String),

    /// The export was cancelled at a batch boundary.
    #[error("Export cancelled")]
    Cancelled,
}

impl ExportError {
    /// The failing page, for render errors.
    #[must_use]
    pub fn page_number(&self) -> Option<u32> {
        match self {
            Self::Render { page_number, .. } => Some(*page_number),
            _ => None,
        }
    }

    /// Whether the export stopped because it was cancelled rather than failed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Validation messages, for option errors.
    #[must_use]
    pub fn validation_errors(&self) -> &[String] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_error() {
        let err = ExportError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Invalid export options: a; b");
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn test_render_error_carries_page_and_cause() {
        let err = ExportError::Render {
            page_number: 4,
            source: RenderError::Surface {
                width: 0,
                height: 10,
            },
        };
        assert_eq!(err.page_number(), Some(4));
        assert!(err.to_string().contains("page 4"));
        let cause = std::error::Error::source(&err).expect("source");
        assert!(cause.to_string().contains("0x10"));
    }

    #[test]
    fn test_cancelled_is_not_a_page_failure() {
        let err = ExportError::Cancelled;
        assert!(err.is_cancelled());
        assert_eq!(err.page_number(), None);
    }
}
