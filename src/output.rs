//! Per-block outcomes and the run-level summary.

use serde::{Deserialize, Serialize};

/// How a single block's unit of work settled.
///
/// Blocks never transition back: each is processed exactly once per run, and
/// anything other than `Corrected` leaves the block's lines byte-identical
/// to their pre-call state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockOutcome {
    /// The response validated and the block's lines were rebuilt.
    Corrected,
    /// Structural validation failed (missing field, line-count mismatch, or
    /// a block with nothing to correct); original lines kept.
    Rejected,
    /// The model call produced no usable response (exhausted retries or a
    /// non-retryable failure); original lines kept.
    Errored,
}

/// Aggregate statistics for one correction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionSummary {
    /// Eligible blocks found across all pages.
    pub total_blocks: usize,
    /// Blocks whose lines were rewritten.
    pub corrected: usize,
    /// Blocks rejected by structural validation.
    pub rejected: usize,
    /// Blocks whose model call failed.
    pub errored: usize,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
}

impl CorrectionSummary {
    /// Fold one settled outcome into the counters.
    pub fn record(&mut self, outcome: BlockOutcome) {
        match outcome {
            BlockOutcome::Corrected => self.corrected += 1,
            BlockOutcome::Rejected => self.rejected += 1,
            BlockOutcome::Errored => self.errored += 1,
        }
    }

    /// Outcomes recorded so far.
    pub fn settled(&self) -> usize {
        self.corrected + self.rejected + self.errored
    }
}
