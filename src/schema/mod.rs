//! The in-memory document tree the correction pipeline mutates.
//!
//! The tree is produced by upstream extraction and shared across correction
//! workers: each worker rewrites the lines of its own block and registers
//! new spans with the owning page. Identity allocation is the only
//! cross-block mutation and is serialized inside [`Page::add_full_block`].
//!
//! ```text
//! Document ─▶ Page ─▶ Block ─▶ Line ─▶ SpanId ──lookup──▶ Span (page arena)
//! ```

pub mod block;
pub mod page;
pub mod polygon;
pub mod span;

pub use block::{Block, BlockKind, Line, CORRECTABLE_KINDS};
pub use page::{Document, Page, SpanId};
pub use polygon::PolygonBox;
pub use span::{ExtractionMethod, Span, SpanFormat};
