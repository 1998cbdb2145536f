//! Vision understanding: read an image with a hosted multimodal LLM.
//!
//! Each provider owns a `reqwest::Client` with the configured timeout.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use platelog_core::{VisionProvider, VisionRequest};
use platelog_logging::redact_sensitive_data;
use serde_json::Value;
use tracing::{debug, info};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

const MAX_OUTPUT_TOKENS: u32 = 64;

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

async fn read_json(provider: &str, resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!(
            "{} vision error ({}): {}",
            provider,
            status,
            redact_sensitive_data(body.trim())
        );
    }
    resp.json()
        .await
        .with_context(|| format!("{} returned a malformed response body", provider))
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

/// Google Gemini `generateContent` with an inline base64 image.
pub struct GeminiVision {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiVision {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.into(),
            model: GEMINI_DEFAULT_MODEL.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Request body for `generateContent`.
pub fn gemini_body(prompt: &str, mime_type: &str, b64: &str) -> Value {
    serde_json::json!({
        "contents": [{ "parts": [
            { "text": prompt },
            { "inlineData": { "mimeType": mime_type, "data": b64 } }
        ]}],
        "generationConfig": { "temperature": 0.0, "maxOutputTokens": MAX_OUTPUT_TOKENS }
    })
}

/// Concatenate the text parts of the first candidate.
pub fn gemini_text(json: &Value) -> Result<String> {
    if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
        bail!("Gemini blocked the request: {}", reason);
    }
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| anyhow!("Gemini response has no candidate content"))?;
    let texts: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if texts.is_empty() {
        bail!("Gemini response has no text part");
    }
    Ok(texts.concat())
}

#[async_trait]
impl VisionProvider for GeminiVision {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn describe(&self, request: &VisionRequest<'_>) -> Result<String> {
        info!(model = %self.model, "[Vision] Reading image via Gemini");
        let b64 = STANDARD.encode(request.image.bytes());
        let body = gemini_body(request.prompt, request.image.mime_type(), &b64);
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;
        let json = read_json("Gemini", resp).await?;
        let text = gemini_text(&json)?;
        debug!(text = %text, "[Vision] Gemini replied");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// OpenAI
// ---------------------------------------------------------------------------

/// OpenAI-compatible chat completions with a data URL image.
pub struct OpenAiVision {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiVision {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.into(),
            model: OPENAI_DEFAULT_MODEL.to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Request body for `chat/completions`.
pub fn openai_body(model: &str, prompt: &str, mime_type: &str, b64: &str) -> Value {
    serde_json::json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": prompt },
                { "type": "image_url",
                  "image_url": { "url": format!("data:{};base64,{}", mime_type, b64) } }
            ]
        }],
        "max_tokens": MAX_OUTPUT_TOKENS,
        "temperature": 0
    })
}

pub fn openai_text(json: &Value) -> Result<String> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("OpenAI response has no message content"))
}

#[async_trait]
impl VisionProvider for OpenAiVision {
    fn name(&self) -> &str {
        "openai"
    }

    async fn describe(&self, request: &VisionRequest<'_>) -> Result<String> {
        info!(model = %self.model, "[Vision] Reading image via OpenAI");
        let b64 = STANDARD.encode(request.image.bytes());
        let body = openai_body(&self.model, request.prompt, request.image.mime_type(), &b64);
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("OpenAI request failed")?;
        let json = read_json("OpenAI", resp).await?;
        openai_text(&json)
    }
}
