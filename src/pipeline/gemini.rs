//! Gemini implementation of [`VisionModel`] over the Generative Language
//! REST API.
//!
//! The request carries the prompt and the cropped region as an inline base64
//! PNG, plus a `generationConfig` pinning temperature to 0 (transcription,
//! not creativity) and constraining the output to the caller's response
//! schema as JSON. Failure classification happens here so the retry adapter
//! never inspects HTTP details: 429 → rate-limited, transport timeout →
//! timeout, anything else non-success → API error.

use crate::config::CorrectionConfig;
use crate::error::{CorrectionError, ModelError};
use crate::pipeline::encode;
use crate::pipeline::model::VisionModel;
use async_trait::async_trait;
use image::DynamicImage;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::debug;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// A configured Gemini endpoint.
///
/// Construction is the fatal path: a missing credential aborts the run
/// before any request is attempted.
#[derive(Debug)]
pub struct GeminiModel {
    http: reqwest::Client,
    api_key: String,
    model_id: String,
    timeout: Duration,
}

impl GeminiModel {
    /// Build a client from the run configuration.
    ///
    /// The credential comes from `config.api_key`, falling back to the
    /// `GOOGLE_API_KEY` environment variable.
    pub fn from_config(config: &CorrectionConfig) -> Result<Self, CorrectionError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or(CorrectionError::MissingCredential)?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| CorrectionError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model_id: config.model_id.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

/// Assemble the generateContent request body.
fn build_request_body(prompt: &str, image_b64: &str, response_schema: &Value) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "text": prompt },
                { "inline_data": { "mime_type": "image/png", "data": image_b64 } }
            ]
        }],
        "generationConfig": {
            "temperature": 0,
            "response_mime_type": "application/json",
            "response_schema": response_schema
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

fn classify_transport_error(e: reqwest::Error, started: Instant) -> ModelError {
    if e.is_timeout() {
        ModelError::Timeout {
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    } else {
        ModelError::Api {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl VisionModel for GeminiModel {
    async fn generate(
        &self,
        prompt: &str,
        image: &DynamicImage,
        response_schema: &Value,
    ) -> Result<String, ModelError> {
        let image_b64 =
            encode::encode_region(image).map_err(|e| ModelError::Encoding(e.to_string()))?;
        let body = build_request_body(prompt, &image_b64, response_schema);
        let url = format!("{API_BASE}/{}:generateContent", self.model_id);

        let started = Instant::now();
        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, started))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            return Err(ModelError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: Some(status.as_u16()),
                message,
            });
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;
        debug!(
            "Gemini answered in {}ms with {} candidate(s)",
            started.elapsed().as_millis(),
            parsed.candidates.len()
        );

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| ModelError::MalformedResponse("no text part in first candidate".into()))
    }
}
