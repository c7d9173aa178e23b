//! Export options and their validation.
//!
//! Options arrive partially specified (from JSON or the command line) as
//! [`ExportOptions`]. Validation reports every broken rule at once;
//! [`ExportOptions::resolve`] turns a valid set into typed
//! [`ResolvedExportOptions`] with defaults filled in.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ExportError, ExportResult};

/// Lowest accepted quality (DPI-equivalent).
pub const MIN_QUALITY: u32 = 72;
/// Highest accepted quality (DPI-equivalent).
pub const MAX_QUALITY: u32 = 600;
/// Quality used when none is given.
pub const DEFAULT_QUALITY: u32 = 150;

const MM_PER_INCH: f32 = 25.4;

/// A single broken option rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// Quality outside the accepted range.
    #[error("quality must be between {MIN_QUALITY} and {MAX_QUALITY} (got {0})")]
    QualityOutOfRange(u32),
    /// Unknown paper format.
    #[error("unsupported format '{0}' (expected one of: a4, a5, letter, legal)")]
    UnsupportedFormat(String),
    /// Unknown orientation.
    #[error("unsupported orientation '{0}' (expected portrait or landscape)")]
    UnsupportedOrientation(String),
    /// Batch size of zero.
    #[error("batchSize must be at least 1 (got {0})")]
    BatchSizeTooSmall(usize),
}

/// Paper sizes the exporter can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperFormat {
    /// ISO A4, 210 × 297 mm.
    #[default]
    A4,
    /// ISO A5, 148 × 210 mm.
    A5,
    /// US Letter, 8.5 × 11 in.
    Letter,
    /// US Legal, 8.5 × 14 in.
    Legal,
}

impl PaperFormat {
    /// Portrait width and height in millimetres.
    #[must_use]
    pub fn size_mm(self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
        }
    }

    /// Lowercase token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A4 => "a4",
            Self::A5 => "a5",
            Self::Letter => "letter",
            Self::Legal => "legal",
        }
    }
}

impl fmt::Display for PaperFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperFormat {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            _ => Err(OptionError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Taller than wide.
    #[default]
    Portrait,
    /// Wider than tall.
    Landscape,
}

impl Orientation {
    /// Lowercase token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            _ => Err(OptionError::UnsupportedOrientation(s.to_string())),
        }
    }
}

/// Export options as supplied by a caller. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    /// Rendering density in DPI, 72–600. Default 150.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
    /// Paper format token. Default `a4`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Orientation token. Default `portrait`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    /// Pages per batch. Default: recommended for the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

/// Outcome of [`validate_options`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// True when no rule was broken.
    pub valid: bool,
    /// One message per broken rule.
    pub errors: Vec<String>,
}

/// Check every option rule and report all violations.
///
/// Fields that are not set are not checked.
#[must_use]
pub fn validate_options(options: &ExportOptions) -> ValidationReport {
    let errors: Vec<String> = options
        .violations()
        .iter()
        .map(ToString::to_string)
        .collect();
    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

impl ExportOptions {
    /// Options with only a quality set.
    #[must_use]
    pub fn with_quality(quality: u32) -> Self {
        Self {
            quality: Some(quality),
            ..Self::default()
        }
    }

    /// Check every option rule and report all violations.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        validate_options(self)
    }

    /// Every broken rule, in field order.
    #[must_use]
    pub fn violations(&self) -> Vec<OptionError> {
        self.check().err().unwrap_or_default()
    }

    /// Validate and fill in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Validation`] listing every broken rule.
    pub fn resolve(&self) -> ExportResult<ResolvedExportOptions> {
        self.check().map_err(|errors| {
            ExportError::Validation(errors.iter().map(ToString::to_string).collect())
        })
    }

    /// Parse every field once, collecting all violations.
    fn check(&self) -> Result<ResolvedExportOptions, Vec<OptionError>> {
        let mut errors = Vec::new();

        let quality = self.quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            errors.push(OptionError::QualityOutOfRange(quality));
        }
        let format: PaperFormat = parse_or_default(self.format.as_deref(), &mut errors);
        let orientation: Orientation = parse_or_default(self.orientation.as_deref(), &mut errors);
        if self.batch_size == Some(0) {
            errors.push(OptionError::BatchSizeTooSmall(0));
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ResolvedExportOptions {
            quality,
            format,
            orientation,
            batch_size: self.batch_size.and_then(NonZeroUsize::new),
        })
    }
}

fn parse_or_default<T>(token: Option<&str>, errors: &mut Vec<OptionError>) -> T
where
    T: FromStr<Err = OptionError> + Default,
{
    match token.map(str::parse::<T>) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            errors.push(e);
            T::default()
        }
        None => T::default(),
    }
}

/// Validated, typed export options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedExportOptions {
    /// Rendering density in DPI.
    pub quality: u32,
    /// Paper format.
    pub format: PaperFormat,
    /// Page orientation.
    pub orientation: Orientation,
    /// Explicit batch size, if the caller chose one.
    pub batch_size: Option<NonZeroUsize>,
}

impl Default for ResolvedExportOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            format: PaperFormat::default(),
            orientation: Orientation::default(),
            batch_size: None,
        }
    }
}

impl ResolvedExportOptions {
    /// Paper width and height in millimetres, orientation applied.
    #[must_use]
    pub fn paper_size_mm(&self) -> (f32, f32) {
        let (w, h) = self.format.size_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Drawing surface size in pixels at the configured quality.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn surface_size_px(&self) -> (u32, u32) {
        let (w_mm, h_mm) = self.paper_size_mm();
        let dpi = self.quality as f32;
        let to_px = |mm: f32| ((mm / MM_PER_INCH * dpi).round() as u32).max(1);
        (to_px(w_mm), to_px(h_mm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(
        quality: Option<u32>,
        format: Option<&str>,
        orientation: Option<&str>,
        batch_size: Option<usize>,
    ) -> ExportOptions {
        ExportOptions {
            quality,
            format: format.map(String::from),
            orientation: orientation.map(String::from),
            batch_size,
        }
    }

    #[test]
    fn test_valid_options() {
        let report = validate_options(&options(Some(300), Some("a4"), Some("portrait"), None));
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_every_violation_reported() {
        let report = validate_options(&options(Some(1000), None, None, Some(0)));
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("quality"));
        assert!(report.errors[1].contains("batchSize"));
    }

    #[test]
    fn test_all_four_rules() {
        let report = validate_options(&options(Some(10), Some("tabloid"), Some("sideways"), Some(0)));
        assert_eq!(report.errors.len(), 4);
    }

    #[test]
    fn test_unset_fields_not_checked() {
        assert!(validate_options(&ExportOptions::default()).valid);
    }

    #[test]
    fn test_quality_bounds_inclusive() {
        assert!(ExportOptions::with_quality(72).validate().valid);
        assert!(ExportOptions::with_quality(600).validate().valid);
        assert!(!ExportOptions::with_quality(71).validate().valid);
        assert!(!ExportOptions::with_quality(601).validate().valid);
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let resolved = ExportOptions::default().resolve().expect("resolve");
        assert_eq!(resolved, ResolvedExportOptions::default());
        assert_eq!(resolved.quality, DEFAULT_QUALITY);
    }

    #[test]
    fn test_resolve_parses_tokens_case_insensitively() {
        let resolved = options(Some(96), Some("Letter"), Some("LANDSCAPE"), Some(3))
            .resolve()
            .expect("resolve");
        assert_eq!(resolved.format, PaperFormat::Letter);
        assert_eq!(resolved.orientation, Orientation::Landscape);
        assert_eq!(resolved.batch_size.map(NonZeroUsize::get), Some(3));
    }

    #[test]
    fn test_resolve_rejects_with_all_errors() {
        let err = options(Some(5), Some("b5"), None, None)
            .resolve()
            .expect_err("invalid");
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn test_resolve_and_validate_agree() {
        let bad = options(Some(700), Some("a3"), Some("sideways"), Some(0));
        let report = bad.validate();
        let err = bad.resolve().expect_err("invalid");
        assert_eq!(err.validation_errors(), report.errors.as_slice());
        assert_eq!(bad.violations().len(), 4);

        let good = options(Some(600), Some("LETTER"), Some("landscape"), Some(3));
        assert!(good.validate().valid);
        assert!(good.violations().is_empty());
        let resolved = good.resolve().expect("valid");
        assert_eq!(resolved.format, PaperFormat::Letter);
        assert_eq!(resolved.orientation, Orientation::Landscape);
        assert_eq!(resolved.batch_size.map(NonZeroUsize::get), Some(3));
    }

    #[test]
    fn test_landscape_swaps_sides() {
        let mut resolved = ResolvedExportOptions::default();
        assert_eq!(resolved.paper_size_mm(), (210.0, 297.0));
        resolved.orientation = Orientation::Landscape;
        assert_eq!(resolved.paper_size_mm(), (297.0, 210.0));
    }

    #[test]
    fn test_surface_size_tracks_quality() {
        let mut resolved = ResolvedExportOptions {
            quality: 96,
            ..Default::default()
        };
        assert_eq!(resolved.surface_size_px(), (794, 1123));
        resolved.quality = 300;
        assert_eq!(resolved.surface_size_px(), (2480, 3508));
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let json = r#"{"quality": 300, "format": "a4", "batchSize": 4}"#;
        let parsed: ExportOptions = serde_json::from_str(json).expect("parse");
        assert_eq!(parsed.batch_size, Some(4));
        assert_eq!(parsed.orientation, None);
    }
}
