//! Conversation domain
//!
//! The ordered utterance history, the state owned by the orchestrator,
//! and the turn scheduler.

pub mod entities;
pub mod scheduler;

pub use entities::{ConversationState, TOPIC_LABEL, Utterance};
pub use scheduler::TurnScheduler;
