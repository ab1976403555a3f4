//! The generation pipeline: gather, title, body+image fan-out, emit.
//!
//! One [`Orchestrator::run`] call is one request. The flow is a single
//! linear pass with one fan-out:
//!
//! ```text
//! gather (shelf + tools, concurrent reads)
//!   └─ gate: fewer than MIN_INGREDIENTS aborts before any model call
//! title stage (structured, retried)
//!   └─ fan-out: body stage (structured, retried) ∥ image stage (one shot)
//! emit whichever finishes first, then the other, then close
//! ```
//!
//! The orchestrator never retries a stage as a whole; retry lives inside
//! the structured client. If one fan-out branch fails, the other is awaited
//! and its result discarded rather than cancelled. Wasteful when the
//! surviving call is still in flight, but it keeps the control flow simple;
//! a resource concern under sustained load.

use std::sync::Arc;

use futures::future::{self, Either};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::exec_ctx::PipelineCtx;
use crate::image;
use crate::prompt::{body_prompt, image_prompt, title_prompt, PromptContext};
use crate::store::{IngredientStore, ToolStore};
use crate::stream::{EventSink, StreamEvent};
use crate::structured::StructuredClient;
use crate::types::{
    artifact_schema, title_schema, ArtifactKind, Domain, GenerationRequest, RecipeArtifact,
    TitleOnly, MIN_INGREDIENTS,
};
use crate::GenerationError;

/// Default JPEG quality for the streamed image.
const DEFAULT_JPEG_QUALITY: u8 = 60;

/// Top-level entry point: one instance serves many requests, each request
/// is one `run` call with its own sink.
pub struct Orchestrator {
    ctx: PipelineCtx,
    ingredients: Arc<dyn IngredientStore>,
    tools: Arc<dyn ToolStore>,
    structured: StructuredClient,
    jpeg_quality: u8,
}

impl Orchestrator {
    pub fn new(
        ctx: PipelineCtx,
        ingredients: Arc<dyn IngredientStore>,
        tools: Arc<dyn ToolStore>,
    ) -> Self {
        Self {
            ctx,
            ingredients,
            tools,
            structured: StructuredClient::new(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Override the structured client (attempt budget).
    pub fn with_structured_client(mut self, structured: StructuredClient) -> Self {
        self.structured = structured;
        self
    }

    /// Override the JPEG quality used for the streamed image.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Run one generation request, emitting events on `sink`.
    ///
    /// The sink is closed when the request ends, successful or not. The
    /// returned artifact duplicates the recipe event's payload so embedding
    /// callers can use it without consuming the stream.
    pub async fn run(
        &self,
        caller_id: &str,
        request: &GenerationRequest,
        sink: &dyn EventSink,
    ) -> Result<RecipeArtifact> {
        let result = self.generate(caller_id, request, sink).await;
        sink.close();
        if let Err(ref e) = result {
            warn!(caller_id, error = %e, "generation failed");
        }
        result
    }

    async fn generate(
        &self,
        caller_id: &str,
        request: &GenerationRequest,
        sink: &dyn EventSink,
    ) -> Result<RecipeArtifact> {
        // Gather: two independent reads.
        let (shelf, tool_map) = tokio::try_join!(
            self.ingredients.list_ingredients(caller_id, request.domain),
            self.tools.list_tools(caller_id),
        )?;

        if shelf.len() < MIN_INGREDIENTS {
            return Err(GenerationError::InsufficientIngredients {
                found: shelf.len(),
                required: MIN_INGREDIENTS,
            });
        }

        // Only available tools are prompt context. Sorted so the prompt
        // builders stay deterministic.
        let mut tools: Vec<String> = tool_map
            .into_iter()
            .filter(|(_, available)| *available)
            .map(|(name, _)| name)
            .collect();
        tools.sort();

        info!(
            caller_id,
            domain = ?request.domain,
            ingredients = shelf.len(),
            tools = tools.len(),
            "generation started"
        );

        let prompt_ctx = PromptContext {
            domain: request.domain,
            ingredients: shelf,
            tools,
            constraints: request.constraints.clone(),
            instructions: request.instructions.clone(),
        };

        // Title stage. The title seeds both remaining prompts, so nothing
        // else runs until it validates.
        let title: TitleOnly = self
            .structured
            .generate(
                &self.ctx,
                "title",
                &title_prompt(&prompt_ctx),
                &title_schema(),
            )
            .await?;
        info!(caller_id, title = %title.title, "title stage complete");

        // Fan-out: body and image run concurrently and may finish in
        // either order.
        let body = body_prompt(&prompt_ctx, &title.title);
        let body_schema = artifact_schema();
        let body_fut = Box::pin(self.structured.generate::<RecipeArtifact>(
            &self.ctx,
            "body",
            &body,
            &body_schema,
        ));
        let img = image_prompt(&title.title, request.domain);
        let image_fut = Box::pin(self.generate_image(&img));

        let artifact = match future::select(image_fut, body_fut).await {
            Either::Left((image_result, body_fut)) => {
                let image = match image_result {
                    Ok(image) => image,
                    Err(e) => {
                        // Await the survivor so its call completes, then
                        // discard its result.
                        let _ = body_fut.await;
                        return Err(e);
                    }
                };
                self.emit(sink, &StreamEvent::Image(image));
                let artifact = self.finalize(body_fut.await?, request.domain);
                self.emit(sink, &StreamEvent::Recipe(artifact.clone()));
                artifact
            }
            Either::Right((body_result, image_fut)) => {
                let artifact = match body_result {
                    Ok(artifact) => self.finalize(artifact, request.domain),
                    Err(e) => {
                        let _ = image_fut.await;
                        return Err(e);
                    }
                };
                self.emit(sink, &StreamEvent::Recipe(artifact.clone()));
                let image = image_fut.await?;
                self.emit(sink, &StreamEvent::Image(image));
                artifact
            }
        };

        info!(caller_id, artifact_id = %artifact.id, "generation complete");
        Ok(artifact)
    }

    /// One image-backend call (never retried), then compression off the
    /// async runtime. Yields a `data:image/jpeg;base64,` URI.
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let raw = self
            .ctx
            .image_backend
            .text_to_image(
                &self.ctx.client,
                &self.ctx.image_base_url,
                &self.ctx.image_model,
                prompt,
            )
            .await?;

        let quality = self.jpeg_quality;
        let compressed = tokio::task::spawn_blocking(move || image::compress(&raw, quality))
            .await
            .map_err(|e| GenerationError::Other(format!("compression task failed: {}", e)))??;
        Ok(image::data_uri(&compressed))
    }

    /// Assign the identifier and kind the model schema deliberately omits.
    fn finalize(&self, mut artifact: RecipeArtifact, domain: Domain) -> RecipeArtifact {
        artifact.id = Uuid::new_v4().to_string();
        artifact.kind = match domain {
            Domain::Food => ArtifactKind::Recipe,
            Domain::Drink => ArtifactKind::Cocktail,
        };
        artifact
    }

    /// Fire-and-forget emission. A closed transport is logged, never fatal;
    /// the pipeline finishes its remaining work regardless.
    fn emit(&self, sink: &dyn EventSink, event: &StreamEvent) {
        if let Err(e) = sink.send(event) {
            warn!(error = %e, "event dropped");
        }
    }
}
