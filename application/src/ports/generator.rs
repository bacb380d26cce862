//! Text generation port
//!
//! Defines the interface for the external generation backends. Any backend
//! that can produce text from a role-tagged context is interchangeable; the
//! orchestrator never depends on backend-specific types.

use async_trait::async_trait;
use colloquy_domain::{Message, ParticipantId};
use thiserror::Error;

/// A failed generation attempt.
///
/// Carries the participant identity so the orchestrator and observers can
/// attribute the failure without inspecting the cause. Generation failures
/// are recoverable per-turn conditions, never session-fatal.
#[derive(Error, Debug)]
#[error("{participant} failed to generate a response: {cause}")]
pub struct GenerationError {
    pub participant: ParticipantId,
    pub cause: String,
}

impl GenerationError {
    pub fn new(participant: ParticipantId, cause: impl Into<String>) -> Self {
        Self {
            participant,
            cause: cause.into(),
        }
    }
}

/// Generation capability of one participant.
///
/// Implementations (adapters) live in the infrastructure layer. The call
/// blocks the orchestration loop until it completes or fails; no timeout is
/// imposed here, though adapters may carry their own.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a response to the given context.
    ///
    /// `max_tokens` is a length hint for the backend, not a guarantee.
    async fn generate(
        &self,
        context: &[Message],
        max_tokens: u32,
    ) -> Result<String, GenerationError>;
}
