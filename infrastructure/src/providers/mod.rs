//! Generation backend adapters
//!
//! One adapter per provider, each implementing the application layer's
//! [`TextGenerator`](colloquy_application::TextGenerator) port. The
//! adapters are interchangeable from the orchestrator's point of view;
//! only the wire formats differ.

mod anthropic;
mod gemini;
mod openai;

pub use anthropic::AnthropicGenerator;
pub use gemini::GeminiGenerator;
pub use openai::OpenAiGenerator;

use colloquy_domain::Role;

pub(crate) fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}
