//! Model boundary: the [`VisionModel`] trait and the retry adapter.
//!
//! [`ModelClient`] is the only layer that talks to the service. Its contract
//! with callers is deliberately lossy: expected failures — rate-limit
//! exhaustion, timeouts, API errors, unparseable payloads — are absorbed
//! into `None` so a bad block degrades to "no correction" instead of
//! aborting the run. Only construction-time problems (missing credential)
//! are allowed to fail hard, and those surface before any request is made.
//!
//! ## Retry strategy
//!
//! Rate-limit failures retry with **linear** backoff: after failed attempt
//! `n` the worker sleeps `n * retry_base_secs` (2 s, 4 s, … by default) up
//! to `max_retries` attempts, with no sleep after the final failure. Every
//! other failure class aborts on the first attempt — quota errors are the
//! one signal where waiting provably helps, so nothing else is retried.

use crate::config::CorrectionConfig;
use crate::error::ModelError;
use async_trait::async_trait;
use image::DynamicImage;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// An opaque vision-capable generative model.
///
/// Given a prompt, an image, and a response-shape contract, return the raw
/// textual payload or a classified failure. Implementations must be
/// stateless per call aside from their own connection pooling.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        image: &DynamicImage,
        response_schema: &Value,
    ) -> Result<String, ModelError>;
}

/// Retry/backoff wrapper around a [`VisionModel`].
pub struct ModelClient {
    model: Arc<dyn VisionModel>,
    max_retries: u32,
    retry_base: Duration,
}

impl ModelClient {
    pub fn new(model: Arc<dyn VisionModel>, config: &CorrectionConfig) -> Self {
        Self {
            model,
            max_retries: config.max_retries,
            retry_base: Duration::from_secs(config.retry_base_secs),
        }
    }

    /// Submit a request and parse the payload as JSON.
    ///
    /// Returns `None` for every expected failure mode: exhausted rate-limit
    /// retries, any non-retryable service failure, and payloads that are not
    /// valid JSON. Callers receive a sentinel, never an error.
    pub async fn generate(
        &self,
        prompt: &str,
        image: &DynamicImage,
        response_schema: &Value,
    ) -> Option<Value> {
        for attempt in 1..=self.max_retries {
            match self.model.generate(prompt, image, response_schema).await {
                Ok(payload) => match serde_json::from_str(&payload) {
                    Ok(value) => {
                        debug!("Model responded with {} payload bytes", payload.len());
                        return Some(value);
                    }
                    Err(e) => {
                        warn!("Model payload is not valid JSON: {e}");
                        return None;
                    }
                },
                Err(e) if e.is_retryable() => {
                    if attempt == self.max_retries {
                        warn!(
                            "Rate limited on final attempt {attempt}/{}; giving up",
                            self.max_retries
                        );
                        break;
                    }
                    let wait = self.retry_base * attempt;
                    warn!(
                        "{e}. Retrying in {}s (attempt {attempt}/{})",
                        wait.as_secs(),
                        self.max_retries
                    );
                    sleep(wait).await;
                }
                Err(e) => {
                    warn!("Model request failed: {e}");
                    return None;
                }
            }
        }
        None
    }
}
