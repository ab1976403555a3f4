use std::time::Duration;
use thiserror::Error;

/// Errors produced by the generation pipeline and its components.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller has fewer stored ingredients than the pipeline minimum.
    /// Raised before any model call is made.
    #[error("need at least {required} ingredients, found {found}")]
    InsufficientIngredients { found: usize, required: usize },

    /// The text backend never produced schema-conformant output within the
    /// attempt budget. Fatal to the request.
    #[error("stage '{stage}' exhausted {attempts} generation attempts")]
    GenerationExhausted { stage: String, attempts: u32 },

    /// The image backend errored or returned an empty payload.
    /// Not retried (unlike text generation).
    #[error("image generation failed: {0}")]
    ImageGenerationFailed(String),

    /// The image payload could not be decoded or re-encoded.
    #[error("invalid image payload: {0}")]
    InvalidImage(String),

    /// An event was emitted after the client disconnected. The orchestrator
    /// logs this and continues; it never aborts the pipeline.
    #[error("stream transport closed by client")]
    TransportClosed,

    /// HTTP error with status code, response body, and optional Retry-After hint.
    ///
    /// Returned by backend implementations when the provider responds with a
    /// non-success status. `retry_after` is populated from the `Retry-After`
    /// header when present.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 429, 500, 503).
        status: u16,
        /// Response body text.
        body: String,
        /// Parsed `Retry-After` header value, if present.
        retry_after: Option<Duration>,
    },

    /// Invalid configuration detected at build time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl GenerationError {
    /// The caller-facing message for this error.
    ///
    /// Upstream error bodies and parse dumps stay in the logs; clients only
    /// ever see a stage-specific generic string.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::InsufficientIngredients { .. } => {
                "Add more ingredients to your kitchen before generating a recipe."
            }
            GenerationError::GenerationExhausted { .. } => {
                "The recipe service could not produce a valid recipe. Please try again."
            }
            GenerationError::ImageGenerationFailed(_) | GenerationError::InvalidImage(_) => {
                "The recipe image could not be generated. Please try again."
            }
            GenerationError::TransportClosed => "The connection was closed.",
            _ => "Something went wrong while generating. Please try again.",
        }
    }

    /// Whether this error is the caller's to correct (4xx-equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(self, GenerationError::InsufficientIngredients { .. })
    }
}

impl From<anyhow::Error> for GenerationError {
    fn from(err: anyhow::Error) -> Self {
        GenerationError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
