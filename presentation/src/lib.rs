//! Presentation layer for colloquy
//!
//! CLI argument definitions and console output. This crate formats what
//! the core produces; it contains no conversation logic of its own.

pub mod cli;
pub mod output;

pub use cli::{Cli, SummaryFormat};
pub use output::{ConsoleFormatter, ConsoleObserver};
