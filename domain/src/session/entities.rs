//! Session entities

use crate::core::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One complete run of the orchestration loop (Entity)
///
/// Created when orchestration starts; `ended_at` is set exactly once, at
/// finalization.
#[derive(Debug, Clone)]
pub struct Session {
    name: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Mark the session ended. The first call wins; later calls are ignored.
    pub fn end(&mut self) {
        if self.ended_at.is_none() {
            self.ended_at = Some(Utc::now());
        }
    }
}

/// Per-participant statistics in a [`SessionSummary`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ParticipantStats {
    pub count: u64,
    pub tokens: u64,
    pub cost: f64,
}

/// Structured end-of-session statistics.
///
/// A plain record for any presentation layer; the core never formats it
/// for a specific UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_name: String,
    pub message_count: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub duration_minutes: f64,
    pub participant_stats: HashMap<ParticipantId, ParticipantStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_is_set_once() {
        let mut session = Session::new("conversation_20260807_120000");
        assert!(!session.is_ended());

        session.end();
        let first = session.ended_at();
        assert!(first.is_some());

        session.end();
        assert_eq!(session.ended_at(), first);
    }
}
