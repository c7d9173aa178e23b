//! # Scrawl Core
//!
//! Data model and pagination engine for handwritten answer sheets.
//! Everything in this crate is synchronous and free of I/O.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 scrawl-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Model           │  Layout Engine           │
//! │  - Answer        │  - Word wrap             │
//! │  - Font record   │  - Pagination            │
//! │  - Pages/lines   │  - Content-keyed cache   │
//! ├─────────────────────────────────────────────┤
//! │  Page styles     │  Font metrics            │
//! │  - Margins       │  - Width classes         │
//! │  - Line pitch    │  - Family profiles       │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod style;
pub mod wrap;

pub use cache::{CacheStats, LayoutCache, LayoutCacheConfig, LayoutKey};
pub use engine::{LayoutConfig, LayoutEngine};
pub use error::{LayoutError, LayoutResult};
pub use metrics::FontMetrics;
pub use model::{Answer, CanvasLine, CanvasPage, HandwrittenFont, Layout};
pub use style::{PageGeometry, PageStyle, StyleMetrics};

/// Scrawl core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
