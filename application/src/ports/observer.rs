//! Conversation observer port
//!
//! Advisory notifications for presentation layers. Observers must never
//! influence control flow; every callback is fire-and-forget.

use colloquy_domain::{BudgetSnapshot, ParticipantId, SessionSummary, Utterance};

use crate::ports::generator::GenerationError;

/// Receives advisory notifications as the conversation progresses.
///
/// Implementations live in the presentation layer (console display,
/// dashboards). The default methods make every callback optional.
pub trait ConversationObserver: Send + Sync {
    /// A speaker has been selected and its turn is starting
    fn on_turn_start(&self, _speaker: &ParticipantId) {}

    /// A turn completed and was recorded
    fn on_utterance(&self, _utterance: &Utterance, _budget: &BudgetSnapshot) {}

    /// A turn failed; the loop will back off and continue
    fn on_turn_failed(&self, _error: &GenerationError) {}

    /// Usage crossed the warning threshold (fires once per session)
    fn on_budget_warning(&self, _budget: &BudgetSnapshot) {}

    /// The session ended and was finalized
    fn on_session_end(&self, _summary: &SessionSummary) {}
}

/// No-op observer for tests and headless runs
pub struct NoObserver;

impl ConversationObserver for NoObserver {}
