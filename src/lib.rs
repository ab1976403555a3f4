//! # recipegen
//!
//! Backend pipeline for AI-generated recipes and cocktails: structured
//! text generation with schema validation and bounded retry, single-shot
//! image generation with JPEG compression, and Server-Sent-Events delivery
//! of the results.
//!
//! The pipeline reads the caller's stored ingredients and kitchen tools,
//! generates a title, then fans out into a full recipe body and an
//! illustration that run concurrently, and streams each as soon as it is
//! ready.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use recipegen::{
//!     Domain, GenerationRequest, MemoryStore, Orchestrator, PipelineCtx, SseSink,
//! };
//!
//! # async fn example() -> recipegen::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! store.set_ingredients(
//!     "caller-1",
//!     Domain::Drink,
//!     vec!["rum".into(), "mint".into(), "lime".into(), "soda".into()],
//! );
//!
//! let ctx = PipelineCtx::builder("https://api.openai.com").build();
//! let orchestrator = Orchestrator::new(ctx, store.clone(), store);
//!
//! let (sink, mut frames) = SseSink::channel();
//! let request = GenerationRequest {
//!     domain: Domain::Drink,
//!     constraints: Default::default(),
//!     instructions: "something refreshing".into(),
//! };
//! let artifact = orchestrator.run("caller-1", &request, &sink).await?;
//! println!("generated: {}", artifact.title);
//! while let Some(frame) = frames.recv().await {
//!     print!("{frame}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`orchestrator`] — the per-request state machine
//! - [`structured`] — schema-validated text generation with bounded retry
//! - [`backend`] — provider traits, OpenAI-compatible implementations, mocks
//! - [`schema`] / [`parsing`] — output contracts and defensive JSON extraction
//! - [`image`] — decode, downscale, JPEG re-encode
//! - [`stream`] — domain events and SSE framing
//! - [`store`] — ingredient and tool lookups
//! - [`prompt`] — pure prompt templates for the three stages

pub mod backend;
pub mod error;
pub mod exec_ctx;
pub mod image;
pub mod orchestrator;
pub mod parsing;
pub mod prompt;
pub mod retry;
pub mod schema;
pub mod store;
pub mod stream;
pub mod structured;
pub mod types;

pub use backend::{BackoffConfig, ImageBackend, OpenAiBackend, OpenAiImageBackend, TextBackend};
pub use error::{GenerationError, Result};
pub use exec_ctx::{PipelineCtx, PipelineCtxBuilder};
pub use orchestrator::Orchestrator;
pub use retry::MAX_RETRIES;
pub use schema::ValueSchema;
pub use store::{IngredientStore, MemoryStore, ToolStore};
pub use stream::{EventSink, SseSink, StreamEvent};
pub use structured::StructuredClient;
pub use types::{
    ArtifactKind, Constraints, Difficulty, Domain, GenerationRequest, RecipeArtifact,
    MIN_INGREDIENTS,
};
