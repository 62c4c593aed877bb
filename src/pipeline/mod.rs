//! Pipeline stages for block correction.
//!
//! Each submodule implements exactly one transformation step, independently
//! testable and swappable without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! region ──▶ encode ──▶ model ──▶ markup
//! (crop)     (base64)   (VLM+retry) (fragments)
//! ```
//!
//! 1. [`region`] — crop the block's box out of the page raster, with margin
//! 2. [`encode`] — PNG-encode and base64-wrap the crop for the request body
//! 3. [`model`]  — the [`model::VisionModel`] seam plus the retry/backoff
//!    adapter; the only stage with network I/O
//! 4. [`gemini`] — the bundled Generative Language API implementation
//! 5. [`markup`] — parse accepted corrections into typed fragments

pub mod encode;
pub mod gemini;
pub mod markup;
pub mod model;
pub mod region;
