//! Blocks and lines: the structural units the correction pipeline operates on.

use crate::schema::page::{Page, SpanId};
use crate::schema::polygon::PolygonBox;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// Classification of a block, supplied by upstream layout analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Ordinary body text.
    Text,
    /// A paragraph containing inline mathematics.
    TextInlineMath,
    /// A handwritten region.
    Handwriting,
    /// A caption directly above or below a figure or table.
    Caption,
}

/// The block kinds the correction pipeline targets.
pub const CORRECTABLE_KINDS: [BlockKind; 2] = [BlockKind::TextInlineMath, BlockKind::Handwriting];

impl BlockKind {
    /// Whether blocks of this kind are eligible for VLM correction.
    pub fn needs_correction(&self) -> bool {
        CORRECTABLE_KINDS.contains(self)
    }
}

/// One row of extracted text within a block.
///
/// `structure` is the ordered list of child span identities; the correction
/// pipeline replaces it atomically when a block's correction is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub polygon: PolygonBox,
    pub structure: Vec<SpanId>,
}

impl Line {
    pub fn new(polygon: PolygonBox) -> Self {
        Self {
            polygon,
            structure: Vec::new(),
        }
    }

    /// Render the line's spans with their inline tags, concatenated in
    /// order. This is the exact representation sent to the model and the
    /// round-trip counterpart of the markup parser.
    pub fn formatted_text(&self, page: &Page) -> String {
        self.structure
            .iter()
            .filter_map(|id| page.span(*id))
            .map(|span| span.formatted_text())
            .collect()
    }
}

/// A structural region of a page owning an ordered sequence of lines.
///
/// Lines sit behind a mutex so a correction worker can rewrite its own
/// block's structure while other workers touch disjoint blocks. The guard is
/// never held across an await point.
#[derive(Debug)]
pub struct Block {
    pub kind: BlockKind,
    pub polygon: PolygonBox,
    lines: Mutex<Vec<Line>>,
}

impl Block {
    pub fn new(kind: BlockKind, polygon: PolygonBox, lines: Vec<Line>) -> Self {
        Self {
            kind,
            polygon,
            lines: Mutex::new(lines),
        }
    }

    /// Exclusive access to the block's lines.
    pub fn lines(&self) -> MutexGuard<'_, Vec<Line>> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Assemble the block's text for rendering. `Caption` and `Handwriting`
    /// blocks wrap their content in a paragraph tag with newlines collapsed
    /// to spaces; every other kind returns the joined text unchanged.
    pub fn assemble_html(&self, page: &Page) -> String {
        let text: String = self
            .lines()
            .iter()
            .map(|line| line.formatted_text(page))
            .collect();
        match self.kind {
            BlockKind::Caption | BlockKind::Handwriting => {
                format!("<p>{}</p>", text.replace('\n', " "))
            }
            _ => text,
        }
    }
}
