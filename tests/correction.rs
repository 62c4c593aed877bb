//! End-to-end pipeline tests over an in-memory document.
//!
//! No network: a scripted [`VisionModel`] is injected through
//! `CorrectionConfig::model`, so these exercise the real dispatcher,
//! orchestrator, validator, markup parser, and span reconciliation.

use async_trait::async_trait;
use image::DynamicImage;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use textmend::{
    correct_document, Block, BlockKind, BlockOutcome, CorrectionConfig, Document,
    ExtractionMethod, Line, ModelError, Page, PolygonBox, Span, SpanFormat, VisionModel,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Recover the extracted lines the orchestrator serialized into the prompt.
/// The request payload is the last fenced JSON block.
fn extracted_lines_from_prompt(prompt: &str) -> Vec<String> {
    let start = prompt.rfind("```json\n").expect("payload fence") + "```json\n".len();
    let end = prompt[start..].find("\n```").expect("closing fence") + start;
    let payload: Value = serde_json::from_str(&prompt[start..end]).expect("payload is JSON");
    payload["extracted_lines"]
        .as_array()
        .expect("extracted_lines array")
        .iter()
        .map(|v| v.as_str().expect("string line").to_string())
        .collect()
}

fn line_box(i: usize) -> PolygonBox {
    let y = 10.0 * i as f32;
    PolygonBox::new(0.0, y, 200.0, y + 10.0)
}

/// A page with `n_blocks` eligible blocks of `lines_per_block` lines, each
/// line owning a single extracted plain span.
fn document_with_blocks(n_blocks: usize, lines_per_block: usize) -> Document {
    let mut page = Page::new(
        PolygonBox::from_size(612.0, 792.0),
        Page::blank_raster(120, 160),
    );
    for b in 0..n_blocks {
        let mut lines = Vec::new();
        for l in 0..lines_per_block {
            let mut line = Line::new(line_box(l));
            let span = Span::extracted(
                line.polygon,
                format!("block {b} line {l}\n"),
                SpanFormat::Plain,
                "Times",
                400.0,
                10.0,
            );
            line.structure.push(page.add_full_block(span));
            lines.push(line);
        }
        let kind = if b % 2 == 0 {
            BlockKind::TextInlineMath
        } else {
            BlockKind::Handwriting
        };
        page.push_block(Block::new(kind, PolygonBox::new(0.0, 0.0, 200.0, 100.0), lines));
    }
    Document::new(vec![page])
}

fn config_with(model: Arc<dyn VisionModel>, concurrency: usize) -> CorrectionConfig {
    CorrectionConfig::builder()
        .enabled(true)
        .model(model)
        .max_concurrency(concurrency)
        .build()
        .expect("valid config")
}

/// Snapshot of a block's line structure and rendered text, for
/// byte-identity assertions.
fn snapshot_block(page: &Page, block: &Block) -> Vec<(Vec<textmend::SpanId>, String)> {
    block
        .lines()
        .iter()
        .map(|line| (line.structure.clone(), line.formatted_text(page)))
        .collect()
}

// ── Scripted models ──────────────────────────────────────────────────────────

/// Echoes the extracted lines back as corrections, tracking how many
/// requests were in flight simultaneously.
struct EchoModel {
    inflight: AtomicUsize,
    max_inflight: AtomicUsize,
    calls: AtomicUsize,
}

impl EchoModel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inflight: AtomicUsize::new(0),
            max_inflight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl VisionModel for EchoModel {
    async fn generate(
        &self,
        prompt: &str,
        _image: &DynamicImage,
        _schema: &Value,
    ) -> Result<String, ModelError> {
        let now = self.inflight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_inflight.fetch_max(now, Ordering::SeqCst);
        // Yield so the dispatcher can actually overlap units.
        tokio::time::sleep(Duration::from_millis(5)).await;
        let corrected = extracted_lines_from_prompt(prompt);
        self.inflight.fetch_sub(1, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "corrected_lines": corrected }).to_string())
    }
}

/// Always answers with the same fixed corrected lines.
struct FixedModel {
    lines: Vec<&'static str>,
}

#[async_trait]
impl VisionModel for FixedModel {
    async fn generate(
        &self,
        _prompt: &str,
        _image: &DynamicImage,
        _schema: &Value,
    ) -> Result<String, ModelError> {
        Ok(json!({ "corrected_lines": self.lines.clone() }).to_string())
    }
}

/// Always fails with a non-retryable error.
struct BrokenModel;

#[async_trait]
impl VisionModel for BrokenModel {
    async fn generate(
        &self,
        _prompt: &str,
        _image: &DynamicImage,
        _schema: &Value,
    ) -> Result<String, ModelError> {
        Err(ModelError::Api {
            status: Some(500),
            message: "backend unavailable".into(),
        })
    }
}

/// Answers with a payload missing the contracted field.
struct WrongShapeModel;

#[async_trait]
impl VisionModel for WrongShapeModel {
    async fn generate(
        &self,
        _prompt: &str,
        _image: &DynamicImage,
        _schema: &Value,
    ) -> Result<String, ModelError> {
        Ok(json!({ "lines": ["looks plausible\n"] }).to_string())
    }
}

// ── Reconciliation ───────────────────────────────────────────────────────────

#[tokio::test]
async fn accepted_correction_rebuilds_lines_as_synthesized_spans() {
    let document = document_with_blocks(1, 2);
    let model = Arc::new(FixedModel {
        lines: vec![
            "corrected <b>first</b> line",
            "with <math>x = 1</math> inline",
        ],
    });
    let summary = correct_document(&document, &config_with(model, 1))
        .await
        .unwrap();
    assert_eq!(summary.corrected, 1);

    let page = &document.pages[0];
    let block = &page.blocks[0];
    let lines = block.lines();

    // Line 0: plain "corrected ", bold "first", plain " line\n".
    let texts: Vec<Span> = lines[0]
        .structure
        .iter()
        .map(|id| page.span(*id).unwrap())
        .collect();
    assert_eq!(texts.len(), 3);
    assert_eq!(texts[0].text, "corrected ");
    assert_eq!(texts[0].formats, vec![SpanFormat::Plain]);
    assert_eq!(texts[1].text, "first");
    assert_eq!(texts[1].formats, vec![SpanFormat::Bold]);
    assert_eq!(texts[2].text, " line\n");

    // Terminator on the last fragment only.
    assert!(!texts[0].text.ends_with('\n'));
    assert!(!texts[1].text.ends_with('\n'));
    assert!(texts[2].text.ends_with('\n'));

    // Synthesized provenance and placeholder font metadata throughout.
    for span in &texts {
        assert_eq!(span.text_extraction_method, ExtractionMethod::Vlm);
        assert_eq!(span.font, "Unknown");
        assert_eq!(span.font_weight, 0.0);
        assert_eq!(span.font_size, 0.0);
    }

    // Line 1 ends with the math fragment's terminator via the plain tail.
    let last_line = lines[1].formatted_text(page);
    assert_eq!(last_line, "with <math>x = 1</math> inline\n");
    // Spans inherit their line's geometry.
    let line1_spans: Vec<Span> = lines[1]
        .structure
        .iter()
        .map(|id| page.span(*id).unwrap())
        .collect();
    assert!(line1_spans.iter().all(|s| s.polygon == lines[1].polygon));
}

// ── Validation failures leave blocks untouched ───────────────────────────────

#[tokio::test]
async fn line_count_mismatch_rejects_and_keeps_lines_byte_identical() {
    let document = document_with_blocks(1, 2);
    let page = &document.pages[0];
    let before = snapshot_block(page, &page.blocks[0]);
    let spans_before = page.span_count();

    // Two extracted lines, three corrected: the whole response is invalid.
    let model = Arc::new(FixedModel {
        lines: vec!["one\n", "two\n", "three\n"],
    });
    let summary = correct_document(&document, &config_with(model, 1))
        .await
        .unwrap();

    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.corrected, 0);
    assert_eq!(snapshot_block(page, &page.blocks[0]), before);
    assert_eq!(page.span_count(), spans_before);
}

#[tokio::test]
async fn missing_field_rejects_and_keeps_lines() {
    let document = document_with_blocks(1, 1);
    let page = &document.pages[0];
    let before = snapshot_block(page, &page.blocks[0]);

    let summary = correct_document(&document, &config_with(Arc::new(WrongShapeModel), 1))
        .await
        .unwrap();

    assert_eq!(summary.rejected, 1);
    assert_eq!(snapshot_block(page, &page.blocks[0]), before);
}

#[tokio::test]
async fn model_failure_errors_the_block_and_keeps_lines() {
    let document = document_with_blocks(2, 1);
    let page = &document.pages[0];
    let before: Vec<_> = page
        .blocks
        .iter()
        .map(|b| snapshot_block(page, b))
        .collect();

    let summary = correct_document(&document, &config_with(Arc::new(BrokenModel), 2))
        .await
        .unwrap();

    assert_eq!(summary.errored, 2);
    assert_eq!(summary.corrected, 0);
    let after: Vec<_> = page
        .blocks
        .iter()
        .map(|b| snapshot_block(page, b))
        .collect();
    assert_eq!(after, before);
}

// ── Dispatch ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pool_smaller_than_block_count_settles_every_block_exactly_once() {
    let n_blocks = 8;
    let pool = 3;
    let document = document_with_blocks(n_blocks, 2);
    let model = EchoModel::new();
    let spans_before = document.pages[0].span_count();

    let summary = correct_document(&document, &config_with(Arc::clone(&model) as _, pool))
        .await
        .unwrap();

    assert_eq!(summary.total_blocks, n_blocks);
    assert_eq!(summary.settled(), n_blocks);
    assert_eq!(summary.corrected, n_blocks);
    assert_eq!(model.calls.load(Ordering::SeqCst), n_blocks);
    assert!(model.max_inflight.load(Ordering::SeqCst) <= pool);

    // Every new span identity is unique and every line was rewritten.
    let page = &document.pages[0];
    let mut seen = std::collections::HashSet::new();
    for block in &page.blocks {
        for line in block.lines().iter() {
            assert!(!line.structure.is_empty(), "line lost its children");
            for id in &line.structure {
                assert!(seen.insert(*id), "duplicate span identity {id:?}");
                assert!(
                    page.span(*id).is_some(),
                    "line references an unregistered span"
                );
            }
        }
    }
    assert_eq!(page.span_count(), spans_before + seen.len());
}

#[tokio::test]
async fn ineligible_blocks_are_not_dispatched() {
    let mut page = Page::new(
        PolygonBox::from_size(612.0, 792.0),
        Page::blank_raster(120, 160),
    );
    let mut line = Line::new(line_box(0));
    line.structure.push(page.add_full_block(Span::extracted(
        line.polygon,
        "plain body text\n",
        SpanFormat::Plain,
        "Times",
        400.0,
        10.0,
    )));
    page.push_block(Block::new(
        BlockKind::Text,
        PolygonBox::new(0.0, 0.0, 200.0, 100.0),
        vec![line],
    ));
    let document = Document::new(vec![page]);

    let model = EchoModel::new();
    let summary = correct_document(&document, &config_with(Arc::clone(&model) as _, 2))
        .await
        .unwrap();

    assert_eq!(summary.total_blocks, 0);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    // The text block's content is untouched.
    let page = &document.pages[0];
    assert_eq!(
        page.blocks[0].lines()[0].formatted_text(page),
        "plain body text\n"
    );
}

#[tokio::test]
async fn empty_block_is_rejected_without_a_model_call() {
    let mut page = Page::new(
        PolygonBox::from_size(612.0, 792.0),
        Page::blank_raster(120, 160),
    );
    page.push_block(Block::new(
        BlockKind::Handwriting,
        PolygonBox::new(0.0, 0.0, 200.0, 100.0),
        vec![],
    ));
    let document = Document::new(vec![page]);

    let model = EchoModel::new();
    let summary = correct_document(&document, &config_with(Arc::clone(&model) as _, 2))
        .await
        .unwrap();

    assert_eq!(summary.rejected, 1);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

// ── Progress events ──────────────────────────────────────────────────────────

struct CountingProgress {
    started: AtomicUsize,
    completed: AtomicUsize,
    corrected: AtomicUsize,
}

impl textmend::CorrectionProgress for CountingProgress {
    fn on_start(&self, total: usize) {
        self.started.store(total, Ordering::SeqCst);
    }
    fn on_block_complete(&self, outcome: BlockOutcome, _total: usize) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        if outcome == BlockOutcome::Corrected {
            self.corrected.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[tokio::test]
async fn progress_fires_once_per_block() {
    let document = document_with_blocks(5, 1);
    let progress = Arc::new(CountingProgress {
        started: AtomicUsize::new(0),
        completed: AtomicUsize::new(0),
        corrected: AtomicUsize::new(0),
    });
    let config = CorrectionConfig::builder()
        .enabled(true)
        .model(EchoModel::new() as _)
        .max_concurrency(2)
        .progress(Arc::clone(&progress) as _)
        .build()
        .unwrap();

    let summary = correct_document(&document, &config).await.unwrap();

    assert_eq!(progress.started.load(Ordering::SeqCst), 5);
    assert_eq!(progress.completed.load(Ordering::SeqCst), 5);
    assert_eq!(
        progress.corrected.load(Ordering::SeqCst),
        summary.corrected
    );
}
