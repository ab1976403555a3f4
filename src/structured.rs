//! Structured generation: prompt in, schema-conformant typed value out.
//!
//! [`StructuredClient::generate`] is the only path from a prompt to a typed
//! value. Every call appends a JSON-only instruction and the schema's
//! rendered shape to the prompt, then runs parse, validate, deserialize
//! under the bounded retry in [`crate::retry`]. A malformed response costs
//! one attempt and the next call starts from scratch; transport failures
//! abort immediately (their retry budget lives in the backoff layer).

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::backend::{with_backoff, CompletionRequest};
use crate::error::Result;
use crate::exec_ctx::PipelineCtx;
use crate::parsing::parse_value;
use crate::retry::{with_retry, AttemptError, MAX_RETRIES};
use crate::schema::ValueSchema;

/// Client for schema-validated text generation.
#[derive(Debug, Clone)]
pub struct StructuredClient {
    /// Attempt budget per stage, counted in total backend calls.
    pub max_attempts: u32,
}

impl Default for StructuredClient {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
        }
    }
}

impl StructuredClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the per-stage attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Generate a `T` from `prompt`, enforcing `schema` on the output.
    ///
    /// `stage` names the pipeline stage for logs and for the
    /// [`GenerationExhausted`](crate::GenerationError::GenerationExhausted)
    /// error if the budget runs out.
    pub async fn generate<T: DeserializeOwned>(
        &self,
        ctx: &PipelineCtx,
        stage: &str,
        prompt: &str,
        schema: &ValueSchema,
    ) -> Result<T> {
        let full_prompt = format!(
            "{}\n\nRespond with JSON only. No prose, no markdown fences.\n\
             The JSON must match this shape exactly:\n{}",
            prompt,
            schema.describe()
        );
        let request = CompletionRequest::new(&ctx.text_model, &full_prompt);

        with_retry(stage, self.max_attempts, |attempt| {
            let request = request.clone();
            async move {
                debug!(stage, attempt, model = %ctx.text_model, "structured generation call");
                let response = with_backoff(
                    &ctx.text_backend,
                    &ctx.client,
                    &ctx.text_base_url,
                    &request,
                    &ctx.backoff,
                )
                .await
                .map_err(AttemptError::Fatal)?;

                let value =
                    parse_value(&response.text).map_err(|e| AttemptError::Invalid(e.to_string()))?;
                schema.validate(&value).map_err(AttemptError::Invalid)?;
                serde_json::from_value(value)
                    .map_err(|e| AttemptError::Invalid(format!("deserialize failed: {}", e)))
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockTextBackend, TextBackend};
    use crate::types::{title_schema, TitleOnly};
    use crate::GenerationError;
    use std::sync::Arc;

    fn ctx_with(mock: Arc<MockTextBackend>) -> PipelineCtx {
        PipelineCtx::builder("http://unused")
            .text_backend(mock as Arc<dyn TextBackend>)
            .build()
    }

    #[tokio::test]
    async fn test_generate_first_attempt() {
        let mock = Arc::new(MockTextBackend::fixed(r#"{"title": "Mojito"}"#));
        let ctx = ctx_with(mock.clone());
        let client = StructuredClient::new();

        let out: TitleOnly = client
            .generate(&ctx, "title", "Name a cocktail.", &title_schema())
            .await
            .unwrap();
        assert_eq!(out.title, "Mojito");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_recovers_from_prose() {
        let mock = Arc::new(MockTextBackend::texts(vec![
            "I'm sorry, I can't answer in JSON.".into(),
            r#"{"title": "Negroni"}"#.into(),
        ]));
        let ctx = ctx_with(mock.clone());
        let client = StructuredClient::new();

        let out: TitleOnly = client
            .generate(&ctx, "title", "Name a cocktail.", &title_schema())
            .await
            .unwrap();
        assert_eq!(out.title, "Negroni");
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_generate_retries_schema_violation() {
        // Parseable JSON that violates the schema still costs an attempt.
        let mock = Arc::new(MockTextBackend::texts(vec![
            format!(r#"{{"title": "{}"}}"#, "x".repeat(60)),
            r#"{"title": "Daiquiri"}"#.into(),
        ]));
        let ctx = ctx_with(mock.clone());
        let client = StructuredClient::new();

        let out: TitleOnly = client
            .generate(&ctx, "title", "Name a cocktail.", &title_schema())
            .await
            .unwrap();
        assert_eq!(out.title, "Daiquiri");
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_generate_exhausts_budget() {
        let mock = Arc::new(MockTextBackend::fixed("not json at all"));
        let ctx = ctx_with(mock.clone());
        let client = StructuredClient::new();

        let err = client
            .generate::<TitleOnly>(&ctx, "title", "Name a cocktail.", &title_schema())
            .await
            .unwrap_err();
        assert_eq!(mock.calls(), 5);
        assert!(matches!(
            err,
            GenerationError::GenerationExhausted { attempts: 5, .. }
        ));
    }

    #[tokio::test]
    async fn test_generate_transport_error_is_fatal() {
        // A hard HTTP failure must not burn the semantic attempt budget.
        let mock = Arc::new(MockTextBackend::failing_with_status(400, "bad request"));
        let ctx = ctx_with(mock.clone());
        let client = StructuredClient::new();

        let err = client
            .generate::<TitleOnly>(&ctx, "title", "Name a cocktail.", &title_schema())
            .await
            .unwrap_err();
        assert_eq!(mock.calls(), 1);
        assert!(matches!(err, GenerationError::HttpError { status: 400, .. }));
    }
}
