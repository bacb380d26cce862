//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into the application
//! layer's resolved settings at startup.

use colloquy_application::ConversationConfig;
use colloquy_domain::{ParticipantId, ParticipantRates};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Conversation loop settings
    pub conversation: FileConversationConfig,
    /// Session log settings
    pub logging: FileLoggingConfig,
    /// Generation backend settings
    pub providers: FileProvidersConfig,
}

/// Conversation loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConversationConfig {
    /// Topic announced at session start
    pub topic: String,
    /// Hard token cap for the session
    pub token_limit: u64,
    /// Fraction of the cap at which the advisory warning fires
    pub warning_threshold: f64,
    /// Trailing utterances included in each context window
    pub context_window_size: usize,
    /// Max-length hint passed to generators, in tokens
    pub max_response_tokens: u32,
    /// Courtesy pause between successful turns, in seconds
    pub inter_turn_delay_secs: u64,
    /// Pause before retrying a failed turn, in seconds
    pub turn_retry_backoff_secs: u64,
}

impl Default for FileConversationConfig {
    fn default() -> Self {
        Self {
            topic: "An open discussion on topics of general interest".to_string(),
            token_limit: 50_000,
            warning_threshold: 0.9,
            context_window_size: 10,
            max_response_tokens: 1000,
            inter_turn_delay_secs: 2,
            turn_retry_backoff_secs: 2,
        }
    }
}

/// Session log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for session transcripts and snapshots
    pub dir: String,
    /// Optional fixed session name; derived from the clock when unset
    pub session_name: Option<String>,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            session_name: None,
        }
    }
}

/// Settings for all generation backends
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub openai: FileProviderConfig,
    pub anthropic: FileProviderConfig,
    pub gemini: FileProviderConfig,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            openai: FileProviderConfig {
                participant: "ChatGPT".to_string(),
                model: "gpt-4o".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                base_url: None,
                input_rate_per_million: 2.50,
                output_rate_per_million: 10.00,
                enabled: true,
            },
            anthropic: FileProviderConfig {
                participant: "Claude".to_string(),
                model: "claude-3-5-sonnet-20241022".to_string(),
                api_key_env: "ANTHROPIC_API_KEY".to_string(),
                base_url: None,
                input_rate_per_million: 3.00,
                output_rate_per_million: 15.00,
                enabled: true,
            },
            gemini: FileProviderConfig {
                participant: "Gemini".to_string(),
                model: "gemini-2.0-flash-exp".to_string(),
                api_key_env: "GOOGLE_API_KEY".to_string(),
                base_url: None,
                input_rate_per_million: 0.0,
                output_rate_per_million: 0.0,
                enabled: true,
            },
        }
    }
}

/// Settings for one generation backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Participant display name used in the conversation
    pub participant: String,
    /// Backend model identifier
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Override for the API base URL
    pub base_url: Option<String>,
    /// USD per 1M input tokens
    pub input_rate_per_million: f64,
    /// USD per 1M output tokens
    pub output_rate_per_million: f64,
    /// Whether this backend joins the roster
    pub enabled: bool,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            participant: String::new(),
            model: String::new(),
            api_key_env: String::new(),
            base_url: None,
            input_rate_per_million: 0.0,
            output_rate_per_million: 0.0,
            enabled: false,
        }
    }
}

impl FileConfig {
    /// All provider entries, enabled or not
    pub fn provider_entries(&self) -> [&FileProviderConfig; 3] {
        [
            &self.providers.openai,
            &self.providers.anthropic,
            &self.providers.gemini,
        ]
    }

    /// Per-participant rate table from the provider entries
    pub fn rate_table(&self) -> HashMap<ParticipantId, ParticipantRates> {
        self.provider_entries()
            .iter()
            .map(|p| {
                (
                    ParticipantId::new(&p.participant),
                    ParticipantRates::per_million(
                        p.input_rate_per_million,
                        p.output_rate_per_million,
                    ),
                )
            })
            .collect()
    }

    /// Resolve into the application layer's conversation settings
    pub fn conversation_config(&self) -> ConversationConfig {
        ConversationConfig {
            topic: self.conversation.topic.clone(),
            token_limit: self.conversation.token_limit,
            warning_threshold: self.conversation.warning_threshold,
            context_window_size: self.conversation.context_window_size,
            max_response_tokens: self.conversation.max_response_tokens,
            inter_turn_delay: Duration::from_secs(self.conversation.inter_turn_delay_secs),
            turn_retry_backoff: Duration::from_secs(self.conversation.turn_retry_backoff_secs),
            rates: self.rate_table(),
        }
    }
}
