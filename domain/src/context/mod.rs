//! Context domain
//!
//! Converts raw conversation history into the bounded, role-tagged context
//! window handed to a participant for its next generation.

pub mod builder;
pub mod entities;

pub use builder::ContextBuilder;
pub use entities::{Message, Role};
