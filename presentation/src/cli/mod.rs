//! CLI definitions

mod commands;

pub use commands::{Cli, SummaryFormat};
