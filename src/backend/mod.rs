//! Backend traits and normalized request/response types.
//!
//! [`TextBackend`] and [`ImageBackend`] abstract over the generation
//! providers. The text backend must honor a "respond only with JSON"
//! instruction (via provider-native JSON mode where available); the image
//! backend returns raw image bytes as base64, one attempt per call.
//!
//! ```text
//! StructuredClient ──► CompletionRequest ──► TextBackend::complete()
//! Orchestrator ──────► prompt ────────────► ImageBackend::text_to_image()
//! ```

pub mod backoff;
pub mod mock;
pub mod openai;

pub use backoff::BackoffConfig;
pub use mock::{MockImageBackend, MockTextBackend};
pub use openai::{OpenAiBackend, OpenAiImageBackend};

use crate::error::Result;
use crate::GenerationError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

/// A normalized text-completion request — provider-agnostic.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier (e.g. `"gpt-4o-mini"`).
    pub model: String,

    /// Optional system prompt.
    pub system_prompt: Option<String>,

    /// The user prompt text, including the JSON-only instruction and
    /// schema shape appended by the structured client.
    pub prompt: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Ask the provider for JSON-constrained output where supported.
    pub json_mode: bool,
}

impl CompletionRequest {
    /// A request with the pipeline's default sampling settings.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            prompt: prompt.into(),
            temperature: 0.7,
            max_tokens: 2048,
            json_mode: true,
        }
    }
}

/// A normalized text-completion response.
#[derive(Debug)]
pub struct CompletionResponse {
    /// The generated text content.
    pub text: String,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,
}

/// Abstraction over text-generation providers.
///
/// Object-safe; designed to be used as `Arc<dyn TextBackend>`.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Execute one completion call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Abstraction over image-generation providers.
///
/// One network call per invocation. There is no retry loop at this seam —
/// image failures are fatal to the request, unlike malformed text output.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Generate one image from a prompt, returned as base64-encoded bytes.
    async fn text_to_image(
        &self,
        client: &Client,
        base_url: &str,
        model: &str,
        prompt: &str,
    ) -> Result<String>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Check whether an error is retryable at the transport level.
///
/// Retryable conditions:
/// - [`GenerationError::HttpError`] with a status in `config.retryable_statuses`
/// - [`GenerationError::Request`] (connection/transport errors)
pub fn is_retryable(error: &GenerationError, config: &BackoffConfig) -> bool {
    match error {
        GenerationError::HttpError { status, .. } => config.retryable_statuses.contains(status),
        GenerationError::Request(_) => true,
        _ => false,
    }
}

/// Execute a text-backend call with transport-level retry and exponential
/// backoff.
///
/// Covers transient failures only (429, 5xx, connection errors). Semantic
/// retries on malformed output live in [`crate::retry`] — the two budgets
/// are independent. Returns the first successful response, or the last
/// error once the budget is spent.
pub async fn with_backoff(
    backend: &Arc<dyn TextBackend>,
    client: &Client,
    base_url: &str,
    request: &CompletionRequest,
    config: &BackoffConfig,
) -> Result<CompletionResponse> {
    let mut last_error: Option<GenerationError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = match &last_error {
                Some(GenerationError::HttpError {
                    retry_after: Some(ra),
                    ..
                }) if config.respect_retry_after => *ra,
                _ => config.delay_for_attempt(attempt - 1),
            };
            debug!(
                backend = backend.name(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                "transport retry"
            );
            tokio::time::sleep(delay).await;
        }

        match backend.complete(client, base_url, request).await {
            Ok(response) => return Ok(response),
            Err(e) => {
                if attempt < config.max_retries && is_retryable(&e, config) {
                    last_error = Some(e);
                    continue;
                }
                return Err(e);
            }
        }
    }

    Err(last_error.unwrap_or(GenerationError::Other(
        "backoff loop exited unexpectedly".into(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_is_retryable_429() {
        let config = BackoffConfig::standard();
        let err = GenerationError::HttpError {
            status: 429,
            body: "rate limited".into(),
            retry_after: None,
        };
        assert!(is_retryable(&err, &config));
    }

    #[test]
    fn test_is_retryable_503() {
        let config = BackoffConfig::standard();
        let err = GenerationError::HttpError {
            status: 503,
            body: "service unavailable".into(),
            retry_after: None,
        };
        assert!(is_retryable(&err, &config));
    }

    #[test]
    fn test_is_retryable_400_not_retried() {
        let config = BackoffConfig::standard();
        let err = GenerationError::HttpError {
            status: 400,
            body: "bad request".into(),
            retry_after: None,
        };
        assert!(!is_retryable(&err, &config));
    }

    #[test]
    fn test_malformed_output_not_transport_retryable() {
        let config = BackoffConfig::standard();
        let err = GenerationError::Other("no valid JSON found".into());
        assert!(!is_retryable(&err, &config));
    }

    #[tokio::test]
    async fn test_with_backoff_gives_up_on_non_retryable() {
        let backend: Arc<dyn TextBackend> =
            Arc::new(MockTextBackend::failing_with_status(400, "bad request"));
        let client = Client::new();
        let request = CompletionRequest::new("test", "prompt");

        let result = with_backoff(
            &backend,
            &client,
            "http://unused",
            &request,
            &BackoffConfig::standard(),
        )
        .await;

        assert!(matches!(
            result.unwrap_err(),
            GenerationError::HttpError { status: 400, .. }
        ));
    }

    #[tokio::test]
    async fn test_with_backoff_retries_429_then_succeeds() {
        let mock = Arc::new(MockTextBackend::scripted(vec![
            mock::MockReply::Status(429, "slow down".into()),
            mock::MockReply::Text("{\"ok\":true}".into()),
        ]));
        let backend: Arc<dyn TextBackend> = mock.clone();
        let client = Client::new();
        let request = CompletionRequest::new("test", "prompt");
        let config = BackoffConfig {
            initial_delay: Duration::from_millis(1),
            jitter: false,
            ..BackoffConfig::standard()
        };

        let response = with_backoff(&backend, &client, "http://unused", &request, &config)
            .await
            .unwrap();
        assert_eq!(response.text, "{\"ok\":true}");
        assert_eq!(mock.calls(), 2);
    }
}
