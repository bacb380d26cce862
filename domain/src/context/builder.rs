//! Context window construction

use crate::context::entities::{Message, Role};
use crate::conversation::entities::{ConversationState, TOPIC_LABEL};
use crate::core::participant::ParticipantId;
use crate::prompt::PromptTemplate;

/// Default number of trailing utterances included in a context window
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Builds the bounded, role-tagged context handed to a participant.
///
/// The window always starts with one system entry describing the topic and
/// conversation etiquette, followed by at most `window_size` trailing
/// utterances from the history. Older turns are silently dropped.
///
/// Roles alternate strictly by position within the trimmed window
/// (assistant at even offsets, user at odd), independent of the actual
/// speaker of each utterance. This keeps the two-party dialogue framing the
/// downstream generators expect; with three or more participants the role
/// tag does not necessarily mean "my own prior turn". Accepted
/// approximation, kept as-is.
pub struct ContextBuilder {
    participants: Vec<ParticipantId>,
    window_size: usize,
}

impl ContextBuilder {
    pub fn new(participants: Vec<ParticipantId>) -> Self {
        Self {
            participants,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Build the context window for the next generation.
    pub fn build(&self, state: &ConversationState) -> Vec<Message> {
        let mut context = Vec::with_capacity(self.window_size + 1);
        context.push(Message::system(PromptTemplate::conversation_system(
            state.topic(),
        )));

        let history = state.history();
        let window_start = history.len().saturating_sub(self.window_size);

        for (i, utterance) in history[window_start..].iter().enumerate() {
            let content = self.strip_speaker_prefix(&utterance.content);
            let role = if i % 2 == 0 {
                Role::Assistant
            } else {
                Role::User
            };
            context.push(Message {
                role,
                content: content.to_string(),
            });
        }

        context
    }

    /// Strip a leading `"{name}: "` prefix from recorded content.
    ///
    /// Defensive normalization: generators are instructed not to echo
    /// participant names, but some do anyway. Only strips when the prefix
    /// matches a known participant identity or the topic-announcement
    /// label, so legitimate colons in content survive.
    fn strip_speaker_prefix<'a>(&self, content: &'a str) -> &'a str {
        if let Some((prefix, rest)) = content.split_once(": ")
            && (prefix == TOPIC_LABEL
                || self.participants.iter().any(|p| p.as_str() == prefix))
        {
            return rest;
        }
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::entities::Utterance;

    fn roster() -> Vec<ParticipantId> {
        vec![
            ParticipantId::new("ChatGPT"),
            ParticipantId::new("Claude"),
            ParticipantId::new("Gemini"),
        ]
    }

    fn state_with_turns(n: usize) -> ConversationState {
        let mut state = ConversationState::new("testing");
        for i in 0..n {
            state.push(Utterance::new(
                ParticipantId::new("Claude"),
                format!("turn {}", i),
                5,
                0.0,
            ));
        }
        state
    }

    #[test]
    fn test_system_entry_always_first() {
        let builder = ContextBuilder::new(roster());
        let context = builder.build(&ConversationState::new("philosophy"));

        assert_eq!(context[0].role, Role::System);
        assert!(context[0].content.contains("philosophy"));
    }

    #[test]
    fn test_window_bound_never_exceeded() {
        let builder = ContextBuilder::new(roster());
        // 1 seeded announcement + 15 turns = 16 history entries
        let state = state_with_turns(15);

        let context = builder.build(&state);

        // 1 system entry + at most 10 history-derived entries
        assert_eq!(context.len(), 11);
        // The window is the *last* 10 of the 16 entries: turns 5..=14
        assert_eq!(context[1].content, "turn 5");
        assert_eq!(context[10].content, "turn 14");
    }

    #[test]
    fn test_short_history_included_whole() {
        let builder = ContextBuilder::new(roster());
        let state = state_with_turns(3);

        let context = builder.build(&state);
        // system + announcement + 3 turns
        assert_eq!(context.len(), 5);
    }

    #[test]
    fn test_roles_alternate_by_position() {
        let builder = ContextBuilder::new(roster());
        let state = state_with_turns(15);

        let context = builder.build(&state);
        for (i, message) in context[1..].iter().enumerate() {
            let expected = if i % 2 == 0 {
                Role::Assistant
            } else {
                Role::User
            };
            assert_eq!(message.role, expected, "wrong role at window offset {}", i);
        }
    }

    #[test]
    fn test_known_speaker_prefix_stripped() {
        let builder = ContextBuilder::new(roster());
        let mut state = ConversationState::new("testing");
        state.push(Utterance::new(
            ParticipantId::new("Claude"),
            "Claude: I think therefore I am",
            5,
            0.0,
        ));

        let context = builder.build(&state);
        assert_eq!(context.last().unwrap().content, "I think therefore I am");
    }

    #[test]
    fn test_topic_announcement_prefix_stripped() {
        let builder = ContextBuilder::new(roster());
        let state = ConversationState::new("free discussion");

        let context = builder.build(&state);
        // Seeded entry is "Topic: free discussion"; the label is stripped
        assert_eq!(context[1].content, "free discussion");
    }

    #[test]
    fn test_unknown_prefix_kept() {
        let builder = ContextBuilder::new(roster());
        let mut state = ConversationState::new("testing");
        state.push(Utterance::new(
            ParticipantId::new("Claude"),
            "Note: this colon is content",
            5,
            0.0,
        ));

        let context = builder.build(&state);
        assert_eq!(context.last().unwrap().content, "Note: this colon is content");
    }

    #[test]
    fn test_custom_window_size() {
        let builder = ContextBuilder::new(roster()).with_window_size(4);
        let state = state_with_turns(15);

        let context = builder.build(&state);
        assert_eq!(context.len(), 5);
        assert_eq!(context[1].content, "turn 11");
    }
}
