//! Prompt domain
//!
//! Templates for the instruction entry that opens every context window.

mod template;

pub use template::PromptTemplate;
