//! Participant identity value object

use serde::{Deserialize, Serialize};

/// Identity of one conversation participant (Value Object)
///
/// A participant is an autonomous text-generation backend taking part in
/// the conversation. The identity is an opaque display name ("ChatGPT",
/// "Claude", "Gemini", or any configured name); the set of participants is
/// fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the display name for this participant
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The default trio mirrored from the reference deployment
    pub fn default_roster() -> Vec<ParticipantId> {
        vec![
            ParticipantId::new("ChatGPT"),
            ParticipantId::new("Claude"),
            ParticipantId::new("Gemini"),
        ]
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ParticipantId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ParticipantId::new(s))
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        ParticipantId::new(s)
    }
}
