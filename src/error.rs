//! Error types for the textmend library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CorrectionError`] — **Fatal**: the correction run cannot proceed at
//!   all (missing credential, invalid configuration) or hit a programming
//!   error inside a unit of work. Returned as `Err(CorrectionError)` from
//!   [`crate::correct::correct_document`].
//!
//! * [`ModelError`] — **Per-call**: a single model request failed (rate
//!   limit, timeout, API error, malformed payload). These never escape the
//!   [`crate::pipeline::model::ModelClient`] adapter — expected failures are
//!   absorbed into an empty result and the affected block simply keeps its
//!   original text.
//!
//! The separation mirrors the per-block all-or-nothing contract: one
//! uncorrectable block degrades silently, while a misconfiguration aborts
//! before any request is made.

use thiserror::Error;

/// Fatal errors returned by the correction entry points.
#[derive(Debug, Error)]
pub enum CorrectionError {
    /// Correction is enabled but no API credential was supplied.
    #[error(
        "API credential is not set.\n\
         Provide CorrectionConfig::api_key or set GOOGLE_API_KEY."
    )]
    MissingCredential,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    /// Unexpected internal error escaping a unit of work.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single model request's failure, classified for the retry policy.
///
/// Only [`ModelError::RateLimited`] is retryable; every other class aborts
/// the request immediately. Timeouts and transient network errors are
/// deliberately non-retryable — the policy retries exactly what the service
/// signals as a quota problem, nothing more.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The service rejected the request for quota reasons (HTTP 429).
    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The request exceeded the per-call timeout.
    #[error("Request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// The service returned a non-retryable error.
    #[error("API error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Api { status: Option<u16>, message: String },

    /// The request image could not be encoded.
    #[error("Image encoding failed: {0}")]
    Encoding(String),

    /// The response body did not contain the expected payload.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ModelError {
    /// Whether the retry/backoff policy applies to this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::RateLimited { .. })
    }
}
