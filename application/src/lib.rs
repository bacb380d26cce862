//! Application layer for colloquy
//!
//! This crate contains the conversation use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ConversationConfig;
pub use ports::{
    generator::{GenerationError, TextGenerator},
    observer::{ConversationObserver, NoObserver},
    recorder::{RecorderError, SessionArtifacts, SessionRecorder},
};
pub use use_cases::run_conversation::{
    ConversationOutcome, EndReason, RunConversationError, RunConversationUseCase,
};
