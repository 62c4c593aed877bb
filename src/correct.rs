//! Correction entry point: per-block orchestration and concurrent dispatch.
//!
//! [`correct_document`] enumerates the eligible blocks of a document and
//! runs one unit of work per block through a bounded pool
//! (`buffer_unordered`). Each unit runs its whole sequence — extract lines,
//! build prompt, crop, call the model, validate, reconcile — to completion;
//! the only suspension points are the network call and the backoff sleep.
//!
//! Corrections are strictly all-or-nothing per block: a response is applied
//! only when it carries exactly one corrected line per extracted line, and
//! any failure leaves the block's original spans untouched. Expected model
//! failures are absorbed upstream by the [`ModelClient`]; an `Err` escaping
//! a unit of work is a programming error and is propagated to the caller
//! after every unit has settled.

use crate::config::CorrectionConfig;
use crate::error::CorrectionError;
use crate::output::{BlockOutcome, CorrectionSummary};
use crate::pipeline::gemini::GeminiModel;
use crate::pipeline::markup;
use crate::pipeline::model::{ModelClient, VisionModel};
use crate::pipeline::region;
use crate::prompts;
use crate::schema::{Block, Document, Page, Span, CORRECTABLE_KINDS};
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The structural contract sent with every request: an object with a
/// required array-of-strings field. Constraining the model's output shape
/// makes the payload deterministically parseable.
pub fn corrected_lines_schema() -> Value {
    json!({
        "type": "OBJECT",
        "required": ["corrected_lines"],
        "properties": {
            "corrected_lines": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        }
    })
}

/// Correct every eligible block of `document` in place.
///
/// Returns a [`CorrectionSummary`] with one settled outcome per eligible
/// block. A disabled config is a no-op; a missing credential fails here,
/// before any request is made.
pub async fn correct_document(
    document: &Document,
    config: &CorrectionConfig,
) -> Result<CorrectionSummary, CorrectionError> {
    if !config.enabled {
        debug!("Correction disabled; skipping");
        return Ok(CorrectionSummary::default());
    }

    let start = Instant::now();
    let model = resolve_model(config)?;
    let client = ModelClient::new(model, config);

    let targets: Vec<(&Page, &Block)> = document
        .pages
        .iter()
        .flat_map(|page| {
            page.contained_blocks(&CORRECTABLE_KINDS)
                .map(move |block| (page, block))
        })
        .collect();
    let total = targets.len();
    info!("Correcting {total} eligible block(s)");
    if let Some(ref cb) = config.progress {
        cb.on_start(total);
    }

    let results: Vec<Result<BlockOutcome, CorrectionError>> =
        stream::iter(targets.into_iter().map(|(page, block)| {
            let client = &client;
            async move {
                let result = process_block(page, block, client, config).await;
                if let (Some(cb), Ok(outcome)) = (config.progress.as_ref(), &result) {
                    cb.on_block_complete(*outcome, total);
                }
                result
            }
        }))
        .buffer_unordered(config.max_concurrency)
        .collect()
        .await;

    // Every unit has settled; now surface the first unexpected failure.
    let mut summary = CorrectionSummary {
        total_blocks: total,
        ..Default::default()
    };
    let mut first_err: Option<CorrectionError> = None;
    for result in results {
        match result {
            Ok(outcome) => summary.record(outcome),
            Err(e) if first_err.is_none() => first_err = Some(e),
            Err(e) => warn!("Additional unit-of-work failure: {e}"),
        }
    }
    if let Some(e) = first_err {
        return Err(e);
    }

    summary.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Correction complete: {}/{} corrected, {} rejected, {} errored in {}ms",
        summary.corrected, total, summary.rejected, summary.errored, summary.duration_ms
    );
    if let Some(ref cb) = config.progress {
        cb.on_complete(total, summary.corrected);
    }
    Ok(summary)
}

/// Pick the model: a pre-built override, else the bundled Gemini client.
fn resolve_model(config: &CorrectionConfig) -> Result<Arc<dyn VisionModel>, CorrectionError> {
    if let Some(ref model) = config.model {
        return Ok(Arc::clone(model));
    }
    Ok(Arc::new(GeminiModel::from_config(config)?))
}

/// Run the full correction sequence for one block.
pub(crate) async fn process_block(
    page: &Page,
    block: &Block,
    client: &ModelClient,
    config: &CorrectionConfig,
) -> Result<BlockOutcome, CorrectionError> {
    // Guard dropped before any await: the formatted lines are the only
    // representation the model sees.
    let extracted: Vec<String> = block
        .lines()
        .iter()
        .map(|line| line.formatted_text(page))
        .collect();
    if extracted.is_empty() {
        debug!("Block has no lines to correct");
        return Ok(BlockOutcome::Rejected);
    }

    let prompt = prompts::build_rewriting_prompt(&extracted)
        .map_err(|e| CorrectionError::Internal(format!("request serialization: {e}")))?;
    let image = region::crop_block_region(page, block, config.margin);

    let Some(response) = client
        .generate(&prompt, &image, &corrected_lines_schema())
        .await
    else {
        return Ok(BlockOutcome::Errored);
    };

    let Some(corrected) = corrected_lines(&response) else {
        warn!("Response is missing a usable corrected_lines field");
        return Ok(BlockOutcome::Rejected);
    };
    if corrected.len() != extracted.len() {
        warn!(
            "Line-count mismatch: {} corrected vs {} extracted; keeping original lines",
            corrected.len(),
            extracted.len()
        );
        return Ok(BlockOutcome::Rejected);
    }

    apply_corrections(page, block, &corrected);
    Ok(BlockOutcome::Corrected)
}

/// Pull the corrected lines out of the response, requiring every element to
/// be a string.
fn corrected_lines(response: &Value) -> Option<Vec<String>> {
    response
        .get("corrected_lines")?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Rebuild each line's structure from its corrected text.
///
/// The line's previous children are discarded, fragments become synthesized
/// spans registered with the page, and the line terminator is appended to
/// the last fragment only, preserving the one-line-per-input-line
/// convention.
fn apply_corrections(page: &Page, block: &Block, corrected: &[String]) {
    let mut lines = block.lines();
    for (line, text) in lines.iter_mut().zip(corrected) {
        line.structure.clear();
        let fragments = markup::parse_fragments(text);
        let last = fragments.len().saturating_sub(1);
        for (idx, fragment) in fragments.into_iter().enumerate() {
            let mut content = fragment.content;
            if idx == last {
                content.push('\n');
            }
            let id = page.add_full_block(Span::synthesized(line.polygon, content, fragment.format));
            line.structure.push(id);
        }
    }
}
