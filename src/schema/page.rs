//! Pages and the document root, including span identity allocation.
//!
//! The span arena is the one piece of state shared by concurrent correction
//! workers: every synthesized span must receive a fresh identity even when
//! several blocks finish at once. Allocation is serialized behind a mutex
//! ([`Page::add_full_block`]); everything else a worker mutates belongs to
//! its own disjoint block.

use crate::schema::block::{Block, BlockKind};
use crate::schema::polygon::PolygonBox;
use crate::schema::span::Span;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Page-local identity of a span, allocated by [`Page::add_full_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanId(pub u32);

/// A document page: document-space bounds, a lower-resolution raster, and an
/// ordered sequence of blocks.
#[derive(Debug)]
pub struct Page {
    pub polygon: PolygonBox,
    pub lowres_image: DynamicImage,
    pub blocks: Vec<Block>,
    spans: Mutex<Vec<Span>>,
}

impl Page {
    pub fn new(polygon: PolygonBox, lowres_image: DynamicImage) -> Self {
        Self {
            polygon,
            lowres_image,
            blocks: Vec::new(),
            spans: Mutex::new(Vec::new()),
        }
    }

    /// A white RGB raster, handy for tests and synthetic documents.
    pub fn blank_raster(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([255, 255, 255]),
        ))
    }

    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Blocks of the given kinds, in document order.
    pub fn contained_blocks<'a>(
        &'a self,
        kinds: &'a [BlockKind],
    ) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks.iter().filter(move |b| kinds.contains(&b.kind))
    }

    /// Register a span with the page, allocating its identity.
    ///
    /// Safe to call from concurrent correction workers; the arena lock
    /// serializes allocation so identities are unique and dense.
    pub fn add_full_block(&self, span: Span) -> SpanId {
        let mut spans = self.spans.lock().unwrap_or_else(|e| e.into_inner());
        spans.push(span);
        SpanId(spans.len() as u32 - 1)
    }

    /// Look up a span by identity. Returns a clone; spans are small.
    pub fn span(&self, id: SpanId) -> Option<Span> {
        self.spans
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id.0 as usize)
            .cloned()
    }

    /// Number of spans registered with the page.
    pub fn span_count(&self) -> usize {
        self.spans.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// The document root: an ordered sequence of pages.
#[derive(Debug, Default)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }
}
