//! Application-level configuration.
//!
//! A single resolved configuration value, constructed once at session start
//! and passed into the use case. No ambient or global state lives in the
//! core; credential resolution and file merging happen in the outer layers
//! before this snapshot is built.

use colloquy_domain::{ParticipantId, ParticipantRates};
use std::collections::HashMap;
use std::time::Duration;

/// Resolved conversation settings consumed by the orchestration loop.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Conversation topic announced at session start
    pub topic: String,
    /// Hard token cap for the whole session
    pub token_limit: u64,
    /// Fraction of the limit at which the advisory warning fires
    pub warning_threshold: f64,
    /// Trailing utterances included in each context window
    pub context_window_size: usize,
    /// Max-length hint passed to generators, in tokens
    pub max_response_tokens: u32,
    /// Courtesy pause between successful turns
    pub inter_turn_delay: Duration,
    /// Pause before retrying after a failed turn
    pub turn_retry_backoff: Duration,
    /// Per-participant pricing
    pub rates: HashMap<ParticipantId, ParticipantRates>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            topic: "An open discussion on topics of general interest".to_string(),
            token_limit: 50_000,
            warning_threshold: 0.9,
            context_window_size: 10,
            max_response_tokens: 1000,
            inter_turn_delay: Duration::from_secs(2),
            turn_retry_backoff: Duration::from_secs(2),
            rates: ParticipantRates::default_table(),
        }
    }
}

impl ConversationConfig {
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_token_limit(mut self, token_limit: u64) -> Self {
        self.token_limit = token_limit;
        self
    }
}
