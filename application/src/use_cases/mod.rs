//! Use cases

pub mod run_conversation;

pub use run_conversation::{
    ConversationOutcome, EndReason, RunConversationError, RunConversationUseCase,
};
