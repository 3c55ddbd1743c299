//! # Generative-AI client
//!
//! [`GenerativeClient`] is the seam the suggestion engine talks to;
//! [`GeminiClient`] implements it against Google's Generative Language API
//! with a declarative response schema.
//!
//! Replies are surfaced as a [`ResponseContent`]: either the first
//! candidate's text, or the raw candidate list when no direct text exists.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::AiConfig;
use crate::error::{describe_http_error, displayable_bytes};

/// Text of unknown encoding taken from a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawText {
    Utf8(String),
    Bytes(Vec<u8>),
}

impl RawText {
    /// Normalize to text, replacing invalid UTF-8 sequences
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            RawText::Utf8(text) => text,
            RawText::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// Content of a generation reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseContent {
    /// Direct text of the reply
    PlainText(String),
    /// Per-candidate payloads, used when no direct text is available
    Candidates(Vec<RawText>),
}

/// A single structured generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    /// OpenAPI-subset schema the reply must satisfy
    pub response_schema: serde_json::Value,
}

/// A client able to run one structured generation
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Run the request and return the raw reply content
    async fn generate(&self, request: &GenerationRequest) -> Result<ResponseContent>;
}

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

impl Candidate {
    /// Joined text parts, or the raw content when there are none
    fn into_raw(self) -> RawText {
        let Some(content) = self.content else {
            return RawText::Utf8(String::new());
        };
        let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            RawText::Bytes(serde_json::to_vec(&content).unwrap_or_default())
        } else {
            RawText::Utf8(text)
        }
    }
}

// ============================================================================
// Client Implementation
// ============================================================================

/// Google Gemini client
pub struct GeminiClient {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow!("Gemini API key is not configured"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .with_context(|| "Failed to create Gemini HTTP client")?;

        Ok(Self {
            api_key,
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn build_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Map the reply into content, preferring the first candidate's text
    fn into_content(response: GeminiResponse) -> ResponseContent {
        let mut candidates = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .map(Candidate::into_raw);

        match candidates.next() {
            Some(RawText::Utf8(text)) if !text.trim().is_empty() => ResponseContent::PlainText(text),
            first => ResponseContent::Candidates(first.into_iter().chain(candidates).collect()),
        }
    }

    /// Extract the provider's error message from an error body
    fn error_message(body: &[u8]) -> String {
        serde_json::from_slice::<GeminiResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| displayable_bytes(body), |e| e.message)
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<ResponseContent> {
        let body = GeminiRequest {
            system_instruction: Content::text(None, &request.system_instruction),
            contents: vec![Content::text(Some("user"), &request.prompt)],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
            },
        };

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(self.build_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {}", describe_http_error(e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| anyhow!("Failed to read response: {}", describe_http_error(e)))?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(anyhow!(
                "Gemini API error ({status}): {}",
                Self::error_message(&bytes)
            ));
        }

        let reply: GeminiResponse = serde_json::from_slice(&bytes)
            .with_context(|| "Failed to parse Gemini response")?;

        if let Some(error) = reply.error {
            return Err(anyhow!("Gemini API error: {}", error.message));
        }

        debug!("Successfully received Gemini response");
        Ok(Self::into_content(reply))
    }
}

impl Debug for GeminiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
