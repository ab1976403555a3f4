//! Client-facing event stream.
//!
//! The pipeline emits exactly two domain events per successful run: the
//! validated artifact and its compressed image. [`EventSink`] is the seam
//! between the orchestrator and the transport; [`SseSink`] is the
//! Server-Sent-Events implementation, and tests substitute a collecting
//! sink. Emission is fire-and-forget: a disconnected client surfaces as
//! [`GenerationError::TransportClosed`], which the orchestrator logs and
//! ignores.

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::types::RecipeArtifact;
use crate::GenerationError;

/// A domain event delivered to the client.
///
/// Serializes as `{"event": "...", "payload": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "lowercase")]
pub enum StreamEvent {
    /// The validated artifact, streamed as soon as it exists.
    Recipe(RecipeArtifact),
    /// The compressed image as a base64 JPEG.
    Image(String),
}

/// Render an event as one SSE frame: `data: {json}\n\n`.
pub fn sse_frame(event: &StreamEvent) -> Result<String> {
    let json = serde_json::to_string(event)?;
    Ok(format!("data: {}\n\n", json))
}

/// Where the orchestrator sends events. Implementations must be safe to
/// call after the client has gone away.
pub trait EventSink: Send + Sync {
    /// Deliver one event. [`GenerationError::TransportClosed`] means the
    /// client is gone; any other error is a sink bug.
    fn send(&self, event: &StreamEvent) -> Result<()>;

    /// Signal that no further events will arrive.
    fn close(&self);
}

/// SSE sink over an in-process channel.
///
/// The receiving half is handed to the HTTP layer, which forwards frames to
/// the response body. Dropping the receiver (client disconnect) makes
/// subsequent sends fail with [`GenerationError::TransportClosed`], as does
/// sending after [`close`](EventSink::close).
pub struct SseSink {
    tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl SseSink {
    /// Create a sink and the receiver the transport drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }
}

impl EventSink for SseSink {
    fn send(&self, event: &StreamEvent) -> Result<()> {
        let frame = sse_frame(event)?;
        let guard = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(tx) => tx.send(frame).map_err(|_| GenerationError::TransportClosed),
            None => Err(GenerationError::TransportClosed),
        }
    }

    fn close(&self) {
        // Dropping the sender ends the SSE response body.
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ArtifactKind, Difficulty, IngredientLine, RecipeStep};

    fn artifact() -> RecipeArtifact {
        RecipeArtifact {
            id: "abc-123".into(),
            title: "Mojito".into(),
            description: "A minty classic.".into(),
            ingredients: vec![IngredientLine {
                ingredient_text: "6 mint leaves".into(),
            }],
            steps: vec![RecipeStep {
                step_text: "Muddle the mint.".into(),
                step_duration: "1 min".into(),
            }],
            total_time: "5 min".into(),
            difficulty: Difficulty::Easy,
            kind: ArtifactKind::Cocktail,
        }
    }

    #[test]
    fn test_sse_frame_shape() {
        let frame = sse_frame(&StreamEvent::Image("aGVsbG8=".into())).unwrap();
        assert_eq!(frame, "data: {\"event\":\"image\",\"payload\":\"aGVsbG8=\"}\n\n");
    }

    #[test]
    fn test_recipe_event_tagging() {
        let frame = sse_frame(&StreamEvent::Recipe(artifact())).unwrap();
        assert!(frame.starts_with("data: {\"event\":\"recipe\",\"payload\":{"));
        assert!(frame.contains("\"ingredientText\":\"6 mint leaves\""));
        assert!(frame.ends_with("\n\n"));
    }

    #[tokio::test]
    async fn test_sink_delivers_frames() {
        let (sink, mut rx) = SseSink::channel();
        sink.send(&StreamEvent::Image("Zm9v".into())).unwrap();
        sink.close();

        let frame = rx.recv().await.unwrap();
        assert!(frame.contains("\"image\""));
        // Channel closed after close().
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_send_after_close_is_transport_closed() {
        let (sink, _rx) = SseSink::channel();
        sink.close();
        let err = sink.send(&StreamEvent::Image("Zm9v".into())).unwrap_err();
        assert!(matches!(err, GenerationError::TransportClosed));
    }

    #[tokio::test]
    async fn test_send_after_disconnect_is_transport_closed() {
        let (sink, rx) = SseSink::channel();
        drop(rx); // client went away
        let err = sink.send(&StreamEvent::Image("Zm9v".into())).unwrap_err();
        assert!(matches!(err, GenerationError::TransportClosed));
    }
}
