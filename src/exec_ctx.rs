//! Execution context shared across one pipeline's backend calls.
//!
//! [`PipelineCtx`] carries the HTTP client, backend implementations, base
//! URLs, and model names. Construct it once and share it across requests —
//! per-request state lives in the orchestrator call, not here.

use crate::backend::{BackoffConfig, ImageBackend, OpenAiBackend, OpenAiImageBackend, TextBackend};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Shared execution context for the generation pipeline.
///
/// # Example
///
/// ```
/// use recipegen::PipelineCtx;
///
/// let ctx = PipelineCtx::builder("https://api.openai.com")
///     .text_model("gpt-4o-mini")
///     .image_model("dall-e-3")
///     .build();
/// ```
pub struct PipelineCtx {
    /// HTTP client (cheap to clone -- uses `Arc` internally).
    pub client: Client,
    /// Base URL for the text-generation provider.
    pub text_base_url: String,
    /// Base URL for the image-generation provider. Defaults to the text URL.
    pub image_base_url: String,
    /// Text backend. Default: [`OpenAiBackend`].
    pub text_backend: Arc<dyn TextBackend>,
    /// Image backend. Default: [`OpenAiImageBackend`].
    pub image_backend: Arc<dyn ImageBackend>,
    /// Transport retry configuration for text calls.
    /// Default: [`BackoffConfig::none()`].
    pub backoff: BackoffConfig,
    /// Text model identifier.
    pub text_model: String,
    /// Image model identifier.
    pub image_model: String,
}

impl PipelineCtx {
    /// Create a new builder.
    pub fn builder(base_url: impl Into<String>) -> PipelineCtxBuilder {
        PipelineCtxBuilder {
            client: None,
            text_base_url: base_url.into(),
            image_base_url: None,
            text_backend: None,
            image_backend: None,
            backoff: None,
            text_model: "gpt-4o-mini".to_string(),
            image_model: "dall-e-3".to_string(),
            timeout: None,
        }
    }
}

impl std::fmt::Debug for PipelineCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineCtx")
            .field("text_base_url", &self.text_base_url)
            .field("image_base_url", &self.image_base_url)
            .field("text_backend", &self.text_backend.name())
            .field("image_backend", &self.image_backend.name())
            .field("backoff", &self.backoff)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

/// Builder for [`PipelineCtx`].
pub struct PipelineCtxBuilder {
    client: Option<Client>,
    text_base_url: String,
    image_base_url: Option<String>,
    text_backend: Option<Arc<dyn TextBackend>>,
    image_backend: Option<Arc<dyn ImageBackend>>,
    backoff: Option<BackoffConfig>,
    text_model: String,
    image_model: String,
    timeout: Option<Duration>,
}

impl PipelineCtxBuilder {
    /// Set the HTTP client. If not set, a default client is created.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set a separate base URL for the image provider.
    pub fn image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = Some(url.into());
        self
    }

    /// Set the text backend. Default: [`OpenAiBackend`].
    pub fn text_backend(mut self, backend: Arc<dyn TextBackend>) -> Self {
        self.text_backend = Some(backend);
        self
    }

    /// Set the image backend. Default: [`OpenAiImageBackend`].
    pub fn image_backend(mut self, backend: Arc<dyn ImageBackend>) -> Self {
        self.image_backend = Some(backend);
        self
    }

    /// Set the transport retry configuration. Default: [`BackoffConfig::none()`].
    pub fn backoff(mut self, config: BackoffConfig) -> Self {
        self.backoff = Some(config);
        self
    }

    /// Set the text model identifier. Default: `"gpt-4o-mini"`.
    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Set the image model identifier. Default: `"dall-e-3"`.
    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Set the request timeout for the default client. Default: 60 seconds.
    ///
    /// Ignored if a custom client is supplied via [`client`](Self::client).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the context.
    pub fn build(self) -> PipelineCtx {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(60));
        let client = self.client.unwrap_or_else(|| {
            Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client")
        });
        let text_base_url = self.text_base_url.trim_end_matches('/').to_string();
        let image_base_url = self
            .image_base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| text_base_url.clone());
        PipelineCtx {
            client,
            text_base_url,
            image_base_url,
            text_backend: self
                .text_backend
                .unwrap_or_else(|| Arc::new(OpenAiBackend::new())),
            image_backend: self
                .image_backend
                .unwrap_or_else(|| Arc::new(OpenAiImageBackend::new())),
            backoff: self.backoff.unwrap_or_else(BackoffConfig::none),
            text_model: self.text_model,
            image_model: self.image_model,
        }
    }
}
