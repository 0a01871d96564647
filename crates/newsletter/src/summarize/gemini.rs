//! Google Gemini summarizer.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::prompt::build_prompt;
use super::Summarizer;
use crate::config::Secret;
use crate::error::{NewsletterError, Result};
use crate::feed::FeedEntry;

/// Gemini API base URL
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Models tried after the configured one, in order.
pub const FALLBACK_MODELS: &[&str] = &["gemini-2.0-flash", "gemini-1.5-flash"];

/// Request timeout per model attempt.
const GEMINI_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling temperature for summaries.
const TEMPERATURE: f32 = 0.2;

/// Max characters of an error body kept in the failure reason.
const ERROR_DETAIL_CHARS: usize = 180;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Summarizes entries with the Gemini `generateContent` API.
pub struct GeminiSummarizer {
    client: reqwest::Client,
    api_key: Secret,
    models: Vec<String>,
    base_url: String,
    language: String,
    hours_back: u32,
}

impl GeminiSummarizer {
    /// Create a summarizer that prefers `model` and falls back to
    /// [`FALLBACK_MODELS`].
    pub fn new(
        api_key: Secret,
        model: &str,
        language: impl Into<String>,
        hours_back: u32,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(GEMINI_TIMEOUT).build()?;

        let mut models: Vec<String> = Vec::new();
        for m in std::iter::once(model.trim()).chain(FALLBACK_MODELS.iter().copied()) {
            if !m.is_empty() && !models.iter().any(|existing| existing == m) {
                models.push(m.to_string());
            }
        }

        Ok(Self {
            client,
            api_key,
            models,
            base_url: GEMINI_API_URL.to_string(),
            language: language.into(),
            hours_back,
        })
    }

    /// Set a custom base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Models in the order they will be tried.
    #[must_use]
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// One attempt against a single model. `Err` carries the reason.
    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> std::result::Result<String, String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(model)
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| format!("{model}: request failed: {}", e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("{model}: failed to read response: {}", e.without_url()))?;

        if !status.is_success() {
            let detail: String = body.chars().take(ERROR_DETAIL_CHARS).collect();
            return Err(format!("{model}: HTTP {} {detail}", status.as_u16()));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| format!("{model}: invalid JSON: {e}"))?;

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            return Err(format!("{model}: empty candidates"));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        let text = text.trim();

        if text.is_empty() {
            return Err(format!("{model}: empty text"));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, entries: &[FeedEntry]) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: build_prompt(entries, &self.language, self.hours_back),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let mut last_error = String::from("no models configured");
        for model in &self.models {
            tracing::info!(model = %model, entries = entries.len(), "Calling Gemini API...");
            match self.generate(model, &request).await {
                Ok(text) => {
                    tracing::debug!(model = %model, len = text.len(), "Got summary");
                    return Ok(text);
                }
                Err(reason) => {
                    tracing::warn!(model = %model, reason = %reason, "Gemini model failed, trying next");
                    last_error = reason;
                }
            }
        }

        Err(NewsletterError::Summarize(last_error))
    }
}
