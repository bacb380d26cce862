//! Infrastructure layer for colloquy
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: HTTP generation backends, the filesystem session
//! recorder, and configuration file loading.

pub mod config;
pub mod providers;
pub mod recording;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileConversationConfig, FileLoggingConfig, FileProviderConfig,
    FileProvidersConfig,
};
pub use providers::{AnthropicGenerator, GeminiGenerator, OpenAiGenerator};
pub use recording::FsSessionRecorder;
