//! Progress-callback trait for per-block correction events.
//!
//! Inject an `Arc<dyn CorrectionProgress>` via
//! [`crate::config::CorrectionConfigBuilder::progress`] to receive real-time
//! events as the dispatcher works through the eligible blocks. The callback
//! approach keeps the library ignorant of how the host application surfaces
//! progress — a terminal bar, a channel, a database row all work.

use crate::output::BlockOutcome;

/// Called by the dispatcher as it processes each eligible block.
///
/// Implementations must be `Send + Sync`: blocks are corrected concurrently,
/// so `on_block_complete` may fire from interleaved workers in any order.
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait CorrectionProgress: Send + Sync {
    /// Called once before any block is corrected.
    fn on_start(&self, total_blocks: usize) {
        let _ = total_blocks;
    }

    /// Called when a block's unit of work settles, whatever its outcome.
    fn on_block_complete(&self, outcome: BlockOutcome, total_blocks: usize) {
        let _ = (outcome, total_blocks);
    }

    /// Called once after all blocks have been attempted.
    fn on_complete(&self, total_blocks: usize, corrected: usize) {
        let _ = (total_blocks, corrected);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl CorrectionProgress for NoopProgress {}
