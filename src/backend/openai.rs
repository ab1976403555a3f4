//! Backends for OpenAI-compatible APIs.
//!
//! [`OpenAiBackend`] talks to `/v1/chat/completions` and covers OpenAI,
//! Together AI, Groq, Mistral, vLLM, llama.cpp server, and Ollama's `/v1/`
//! endpoint. JSON mode maps to `response_format: {"type": "json_object"}`.
//!
//! [`OpenAiImageBackend`] talks to `/v1/images/generations` and requests
//! `b64_json` payloads so the pipeline never touches provider-hosted URLs.

use super::{CompletionRequest, CompletionResponse, ImageBackend, TextBackend};
use crate::error::Result;
use crate::GenerationError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Text backend for any OpenAI-compatible chat-completions API.
///
/// # Example
///
/// ```
/// use recipegen::backend::OpenAiBackend;
///
/// let backend = OpenAiBackend::new().with_api_key("sk-...");
/// ```
#[derive(Clone, Default)]
pub struct OpenAiBackend {
    api_key: Option<String>,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("api_key", &self.api_key.as_ref().map(redact))
            .finish()
    }
}

fn redact(key: &String) -> String {
    if key.len() > 6 {
        format!("{}***", &key[..6])
    } else {
        "***".to_string()
    }
}

/// Parse a `Retry-After` header value as integer seconds.
fn parse_retry_after(value: &str) -> Option<std::time::Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(std::time::Duration::from_secs)
}

/// Convert a non-success response into [`GenerationError::HttpError`].
async fn status_error(resp: reqwest::Response) -> GenerationError {
    let status = resp.status().as_u16();
    let retry_after = resp
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after);
    let body = resp.text().await.unwrap_or_default();
    GenerationError::HttpError {
        status,
        body,
        retry_after,
    }
}

impl OpenAiBackend {
    /// Create a backend without authentication (local OpenAI-compatible
    /// servers).
    pub fn new() -> Self {
        Self { api_key: None }
    }

    /// Set the API key, sent as `Authorization: Bearer {key}`.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Build the request body for `/v1/chat/completions`.
    fn build_body(request: &CompletionRequest) -> Value {
        let mut messages = Vec::new();
        if let Some(ref sys) = request.system_prompt {
            if !sys.is_empty() {
                messages.push(json!({"role": "system", "content": sys}));
            }
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if request.json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }
        body
    }
}

#[async_trait]
impl TextBackend for OpenAiBackend {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        let url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));
        let body = Self::build_body(request);

        let mut req = client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(|e| {
            GenerationError::Other(format!("failed to reach text backend at {}: {}", url, e))
        })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        let json_resp: Value = resp.json().await?;
        let text = json_resp["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        Ok(CompletionResponse { text, status })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Image backend for the OpenAI Images API.
#[derive(Clone, Default)]
pub struct OpenAiImageBackend {
    api_key: Option<String>,
    /// Requested image size. Default: `"1024x1024"`.
    size: String,
}

impl std::fmt::Debug for OpenAiImageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiImageBackend")
            .field("api_key", &self.api_key.as_ref().map(redact))
            .field("size", &self.size)
            .finish()
    }
}

impl OpenAiImageBackend {
    pub fn new() -> Self {
        Self {
            api_key: None,
            size: "1024x1024".to_string(),
        }
    }

    /// Set the API key, sent as `Authorization: Bearer {key}`.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the requested image size (e.g. `"512x512"`).
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    fn build_body(&self, model: &str, prompt: &str) -> Value {
        json!({
            "model": model,
            "prompt": prompt,
            "n": 1,
            "size": self.size,
            "response_format": "b64_json",
        })
    }
}

#[async_trait]
impl ImageBackend for OpenAiImageBackend {
    async fn text_to_image(
        &self,
        client: &Client,
        base_url: &str,
        model: &str,
        prompt: &str,
    ) -> Result<String> {
        let url = format!("{}/v1/images/generations", base_url.trim_end_matches('/'));
        let body = self.build_body(model, prompt);

        let mut req = client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(|e| {
            GenerationError::ImageGenerationFailed(format!(
                "failed to reach image backend at {}: {}",
                url, e
            ))
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::ImageGenerationFailed(format!(
                "HTTP {}: {}",
                status,
                crate::parsing::truncate(&text, 500)
            )));
        }

        let json_resp: Value = resp.json().await?;
        let b64 = json_resp["data"][0]["b64_json"]
            .as_str()
            .unwrap_or("")
            .to_string();

        if b64.is_empty() {
            return Err(GenerationError::ImageGenerationFailed(
                "no image data in response".into(),
            ));
        }
        Ok(b64)
    }

    fn name(&self) -> &'static str {
        "openai-images"
    }
}
