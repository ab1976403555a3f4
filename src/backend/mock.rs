//! Mock backends for testing without live providers.
//!
//! Both mocks record how many calls they received, so tests can assert the
//! pipeline's call-count guarantees: the ingredient gate makes zero calls,
//! the structured client makes at most its attempt budget, and image
//! generation is never retried.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Client;

use super::{CompletionRequest, CompletionResponse, ImageBackend, TextBackend};
use crate::error::Result;
use crate::GenerationError;

/// One scripted reply from [`MockTextBackend`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Respond successfully with this text.
    Text(String),
    /// Fail with an HTTP error (status, body).
    Status(u16, String),
}

/// A text backend that returns scripted replies in order.
///
/// Cycles back to the beginning when all replies have been consumed.
#[derive(Debug)]
pub struct MockTextBackend {
    replies: Vec<MockReply>,
    calls: AtomicUsize,
}

impl MockTextBackend {
    /// Create a mock with the given scripted replies.
    pub fn scripted(replies: Vec<MockReply>) -> Self {
        assert!(
            !replies.is_empty(),
            "MockTextBackend requires at least one reply"
        );
        Self {
            replies,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock that always returns the same text.
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::scripted(vec![MockReply::Text(text.into())])
    }

    /// Create a mock that returns the given texts in order, cycling.
    pub fn texts(texts: Vec<String>) -> Self {
        Self::scripted(texts.into_iter().map(MockReply::Text).collect())
    }

    /// Create a mock that always fails with the given HTTP status.
    pub fn failing_with_status(status: u16, body: impl Into<String>) -> Self {
        Self::scripted(vec![MockReply::Status(status, body.into())])
    }

    /// Total number of `complete` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn next_reply(&self) -> MockReply {
        let idx = self.calls.fetch_add(1, Ordering::Relaxed) % self.replies.len();
        self.replies[idx].clone()
    }
}

#[async_trait]
impl TextBackend for MockTextBackend {
    async fn complete(
        &self,
        _client: &Client,
        _base_url: &str,
        _request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        match self.next_reply() {
            MockReply::Text(text) => Ok(CompletionResponse { text, status: 200 }),
            MockReply::Status(status, body) => Err(GenerationError::HttpError {
                status,
                body,
                retry_after: None,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// An image backend that returns a fixed payload or always fails.
#[derive(Debug)]
pub struct MockImageBackend {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
}

impl MockImageBackend {
    /// Always return the given base64 payload.
    pub fn fixed(b64: impl Into<String>) -> Self {
        Self {
            reply: Ok(b64.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Total number of `text_to_image` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ImageBackend for MockImageBackend {
    async fn text_to_image(
        &self,
        _client: &Client,
        _base_url: &str,
        _model: &str,
        _prompt: &str,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match &self.reply {
            Ok(b64) => Ok(b64.clone()),
            Err(msg) => Err(GenerationError::ImageGenerationFailed(msg.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "mock-images"
    }
}
