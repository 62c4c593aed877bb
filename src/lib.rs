//! # textmend
//!
//! Rewrite hard-to-extract document regions — inline mathematics and
//! handwriting — by cross-checking their extracted lines against a cropped
//! image of the source region with a vision language model.
//!
//! ## Why this crate?
//!
//! Layout-aware extraction gets ordinary body text right, but inline math
//! comes out as mangled symbols and handwriting as noise. Instead of
//! re-running OCR, this crate shows the model the region image next to the
//! extracted lines and asks it to fix only what is wrong, then rebuilds the
//! corrected text as typed, formatted spans inside the document tree.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Document
//!  │
//!  ├─ 1. Dispatch  enumerate eligible blocks, bounded worker pool
//!  ├─ 2. Extract   per-line formatted text + cropped region image
//!  ├─ 3. Model     Gemini call with JSON shape contract, linear backoff on 429
//!  ├─ 4. Validate  corrected line count must equal extracted line count
//!  └─ 5. Reconcile parse markup into spans, replace each line's children
//! ```
//!
//! Correction is all-or-nothing per block: a block whose response fails
//! validation — or whose model call fails — silently keeps its original
//! text. There is never partial or garbled output.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use textmend::{correct_document, CorrectionConfig, Document};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let document: Document = /* produced by upstream extraction */
//! #       Document::default();
//!     // Credential auto-detected from GOOGLE_API_KEY
//!     let config = CorrectionConfig::builder().enabled(true).build()?;
//!     let summary = correct_document(&document, &config).await?;
//!     eprintln!(
//!         "corrected {}/{} blocks",
//!         summary.corrected, summary.total_blocks
//!     );
//!     Ok(())
//! }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod correct;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod schema;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CorrectionConfig, CorrectionConfigBuilder};
pub use correct::correct_document;
pub use error::{CorrectionError, ModelError};
pub use output::{BlockOutcome, CorrectionSummary};
pub use pipeline::model::{ModelClient, VisionModel};
pub use progress::{CorrectionProgress, NoopProgress};
pub use schema::{
    Block, BlockKind, Document, ExtractionMethod, Line, Page, PolygonBox, Span, SpanFormat,
    SpanId, CORRECTABLE_KINDS,
};
