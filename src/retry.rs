//! Bounded retry for structured generation.
//!
//! Model output that fails to parse or violates its schema is retried from
//! scratch — a fresh call, no correction history, no delay. Transport and
//! configuration errors are fatal immediately; they are not malformed
//! output and retrying them is the transport backoff layer's job
//! (see [`crate::backend::with_backoff`]).

use crate::error::{GenerationError, Result};
use std::future::Future;
use tracing::warn;

/// Default attempt budget for structured generation, counted in total
/// backend calls (not retries after the first).
pub const MAX_RETRIES: u32 = 5;

/// Why a single attempt did not yield a usable value.
#[derive(Debug)]
pub enum AttemptError {
    /// The model responded, but the output was unparseable or violated the
    /// schema. Consumes an attempt; the next attempt starts from scratch.
    Invalid(String),
    /// A non-output failure (transport, configuration). Aborts the retry
    /// loop and surfaces immediately.
    Fatal(GenerationError),
}

/// Run `attempt` up to `max_attempts` times, stopping at the first success.
///
/// The closure receives the 1-indexed attempt number. Exhausting the budget
/// yields [`GenerationError::GenerationExhausted`] carrying the stage name
/// and attempt count.
pub async fn with_retry<T, F, Fut>(stage: &str, max_attempts: u32, mut attempt: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<T, AttemptError>>,
{
    for n in 1..=max_attempts {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Invalid(reason)) => {
                warn!(
                    stage,
                    attempt = n,
                    max_attempts,
                    %reason,
                    "attempt produced invalid output"
                );
            }
            Err(AttemptError::Fatal(err)) => return Err(err),
        }
    }

    Err(GenerationError::GenerationExhausted {
        stage: stage.to_string(),
        attempts: max_attempts,
    })
}
