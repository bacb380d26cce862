//! Conversation entities

use crate::core::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker label used for the seeded topic-announcement entry.
///
/// The opening history entry is attributed to this label rather than to a
/// real participant, so the context builder can recognize and strip it the
/// same way it strips participant-name prefixes.
pub const TOPIC_LABEL: &str = "Topic";

/// One recorded turn of the conversation (Entity)
///
/// Immutable once recorded. The ordered sequence of utterances is the
/// conversation history; append order is the only meaningful relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    /// Who spoke
    pub speaker: ParticipantId,
    /// What was said
    pub content: String,
    /// When the turn completed
    pub timestamp: DateTime<Utc>,
    /// Tokens consumed by the turn (input + output)
    pub tokens: u64,
    /// Monetary cost of the turn in USD
    pub cost: f64,
}

impl Utterance {
    pub fn new(
        speaker: ParticipantId,
        content: impl Into<String>,
        tokens: u64,
        cost: f64,
    ) -> Self {
        Self {
            speaker,
            content: content.into(),
            timestamp: Utc::now(),
            tokens,
            cost,
        }
    }
}

/// Mutable conversation state owned by the orchestrator (Entity)
///
/// Holds the append-only utterance history and the current topic. Only the
/// orchestrator mutates this, and only after a successful turn.
#[derive(Debug, Clone)]
pub struct ConversationState {
    topic: String,
    history: Vec<Utterance>,
}

impl ConversationState {
    /// Create a new conversation seeded with the topic announcement.
    ///
    /// The announcement is a zero-cost opening entry so the first speaker
    /// has something to respond to, mirroring how a human moderator would
    /// open the session.
    pub fn new(topic: impl Into<String>) -> Self {
        let topic = topic.into();
        let opening = Utterance::new(
            ParticipantId::new(TOPIC_LABEL),
            format!("{}: {}", TOPIC_LABEL, topic),
            0,
            0.0,
        );
        Self {
            topic,
            history: vec![opening],
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn history(&self) -> &[Utterance] {
        &self.history
    }

    /// Number of utterances recorded so far (including the opening entry)
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Append a completed turn to the history
    pub fn push(&mut self, utterance: Utterance) {
        self.history.push(utterance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_seeded_with_topic_announcement() {
        let state = ConversationState::new("the ethics of automation");
        assert_eq!(state.len(), 1);
        assert_eq!(state.history()[0].speaker.as_str(), TOPIC_LABEL);
        assert!(state.history()[0].content.contains("the ethics of automation"));
        assert_eq!(state.history()[0].tokens, 0);
    }

    #[test]
    fn test_push_appends_in_order() {
        let mut state = ConversationState::new("test");
        state.push(Utterance::new(ParticipantId::new("A"), "first", 10, 0.0));
        state.push(Utterance::new(ParticipantId::new("B"), "second", 12, 0.0));

        let speakers: Vec<&str> = state
            .history()
            .iter()
            .map(|u| u.speaker.as_str())
            .collect();
        assert_eq!(speakers, vec![TOPIC_LABEL, "A", "B"]);
    }
}
