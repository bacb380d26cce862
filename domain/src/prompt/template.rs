//! Prompt templates for conversation turns

/// Templates for generating the system instruction entry
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt placed at the head of every context window.
    ///
    /// States the topic and the conversation etiquette each participant is
    /// expected to follow.
    pub fn conversation_system(topic: &str) -> String {
        format!(
            r#"You are having a conversation with other AIs.
Current topic: {}

Conversation rules:
1. Keep the conversation natural and interesting
2. React appropriately to what the other AIs have said
3. Offer new perspectives or questions
4. Be concise (stay under 500 characters)
5. Let your own character come through in what you say
6. Do not prefix your reply with any participant's name; respond directly"#,
            topic
        )
    }
}
