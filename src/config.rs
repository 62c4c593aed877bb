//! Configuration for a correction run.
//!
//! Every knob lives in [`CorrectionConfig`], built via its
//! [`CorrectionConfigBuilder`]. Keeping the whole surface in one struct makes
//! it trivial to share across workers, log, and diff two runs to understand
//! why their outputs differ.

use crate::error::CorrectionError;
use crate::pipeline::model::VisionModel;
use crate::progress::CorrectionProgress;
use std::fmt;
use std::sync::Arc;

/// Configuration for [`crate::correct::correct_document`].
///
/// # Example
/// ```rust
/// use textmend::CorrectionConfig;
///
/// let config = CorrectionConfig::builder()
///     .enabled(true)
///     .api_key("AIza…")
///     .max_concurrency(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct CorrectionConfig {
    /// Master gate. When false, [`crate::correct::correct_document`] is a
    /// no-op and no credential is required. Default: false.
    pub enabled: bool,

    /// API credential for the bundled Gemini client. Falls back to the
    /// `GOOGLE_API_KEY` environment variable; if neither is set while
    /// `enabled` is true, the run aborts with
    /// [`CorrectionError::MissingCredential`] before any request is made.
    pub api_key: Option<String>,

    /// Model identifier. Default: "gemini-1.5-flash".
    pub model_id: String,

    /// Maximum attempts per model call. Default: 3.
    ///
    /// Only rate-limit failures consume retries; any other failure class
    /// aborts the call on the first attempt.
    pub max_retries: u32,

    /// Number of blocks corrected concurrently. Default: 3.
    ///
    /// Model calls are network-bound, so a small pool already hides most of
    /// the latency. Raise it if your quota allows; lower it if you see
    /// rate-limit errors on every block.
    pub max_concurrency: usize,

    /// Per-request timeout in seconds. Default: 60.
    ///
    /// A timed-out call is not retried — timeouts fall into the
    /// non-retryable class, unlike rate limits.
    pub timeout_secs: u64,

    /// Linear backoff unit in seconds. Default: 2.
    ///
    /// After rate-limited attempt `n` the worker sleeps `n *
    /// retry_base_secs` — 2 s, then 4 s, and so on. Linear, not exponential:
    /// quota windows recover on a fixed cadence, so doubling waits past the
    /// window gains nothing.
    pub retry_base_secs: u64,

    /// Fraction of the block box added symmetrically around the crop on each
    /// axis. Default: 0.01.
    ///
    /// A sliver of surrounding context helps the model read glyphs that were
    /// clipped by a tight layout box.
    pub margin: f32,

    /// Pre-built model override. Takes precedence over `api_key`/`model_id`.
    /// Useful in tests or when the caller needs custom middleware.
    pub model: Option<Arc<dyn VisionModel>>,

    /// Progress callback fired by the dispatcher.
    pub progress: Option<Arc<dyn CorrectionProgress>>,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            model_id: "gemini-1.5-flash".to_string(),
            max_retries: 3,
            max_concurrency: 3,
            timeout_secs: 60,
            retry_base_secs: 2,
            margin: 0.01,
            model: None,
            progress: None,
        }
    }
}

impl fmt::Debug for CorrectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectionConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_id", &self.model_id)
            .field("max_retries", &self.max_retries)
            .field("max_concurrency", &self.max_concurrency)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry_base_secs", &self.retry_base_secs)
            .field("margin", &self.margin)
            .field("model", &self.model.as_ref().map(|_| "<dyn VisionModel>"))
            .finish()
    }
}

impl CorrectionConfig {
    /// Create a new builder for `CorrectionConfig`.
    pub fn builder() -> CorrectionConfigBuilder {
        CorrectionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CorrectionConfig`].
#[derive(Debug)]
pub struct CorrectionConfigBuilder {
    config: CorrectionConfig,
}

impl CorrectionConfigBuilder {
    pub fn enabled(mut self, v: bool) -> Self {
        self.config.enabled = v;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model_id(mut self, id: impl Into<String>) -> Self {
        self.config.model_id = id.into();
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.max(1);
        self
    }

    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.config.max_concurrency = n.max(1);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn retry_base_secs(mut self, secs: u64) -> Self {
        self.config.retry_base_secs = secs;
        self
    }

    pub fn margin(mut self, frac: f32) -> Self {
        self.config.margin = frac;
        self
    }

    pub fn model(mut self, model: Arc<dyn VisionModel>) -> Self {
        self.config.model = Some(model);
        self
    }

    pub fn progress(mut self, progress: Arc<dyn CorrectionProgress>) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CorrectionConfig, CorrectionError> {
        let c = &self.config;
        if c.max_concurrency == 0 {
            return Err(CorrectionError::InvalidConfig(
                "max_concurrency must be ≥ 1".into(),
            ));
        }
        if c.max_retries == 0 {
            return Err(CorrectionError::InvalidConfig(
                "max_retries must be ≥ 1".into(),
            ));
        }
        if !(0.0..1.0).contains(&c.margin) {
            return Err(CorrectionError::InvalidConfig(format!(
                "margin must be in [0, 1), got {}",
                c.margin
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = CorrectionConfig::default();
        assert!(!c.enabled);
        assert_eq!(c.model_id, "gemini-1.5-flash");
        assert_eq!(c.max_retries, 3);
        assert_eq!(c.max_concurrency, 3);
        assert_eq!(c.timeout_secs, 60);
        assert_eq!(c.retry_base_secs, 2);
        assert!((c.margin - 0.01).abs() < f32::EPSILON);
    }

    #[test]
    fn builder_clamps_pool_and_retries_to_one() {
        let c = CorrectionConfig::builder()
            .max_concurrency(0)
            .max_retries(0)
            .build()
            .unwrap();
        assert_eq!(c.max_concurrency, 1);
        assert_eq!(c.max_retries, 1);
    }

    #[test]
    fn build_rejects_out_of_range_margin() {
        let err = CorrectionConfig::builder().margin(1.5).build().unwrap_err();
        assert!(err.to_string().contains("margin"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = CorrectionConfig::builder().api_key("secret").build().unwrap();
        let dump = format!("{:?}", c);
        assert!(!dump.contains("secret"));
        assert!(dump.contains("<redacted>"));
    }
}
