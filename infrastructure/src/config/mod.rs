//! Configuration infrastructure
//!
//! Raw TOML configuration types and the multi-source loader. The loaded
//! file config is converted into the application layer's resolved
//! [`ConversationConfig`](colloquy_application::ConversationConfig) once at
//! startup; nothing re-reads configuration after that.

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileConversationConfig, FileLoggingConfig, FileProviderConfig, FileProvidersConfig,
};
pub use loader::ConfigLoader;
