//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the final session summary
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SummaryFormat {
    /// Human-readable statistics block
    Text,
    /// JSON record
    Json,
}

/// CLI arguments for colloquy
#[derive(Parser, Debug)]
#[command(name = "colloquy")]
#[command(author, version, about = "Watch autonomous AI backends hold a conversation")]
#[command(long_about = r#"
Colloquy runs an observed round-robin conversation among several AI text
generation backends until a token budget is exhausted or you interrupt it
with Ctrl-C.

Each turn, a speaker is chosen at random (never the same backend twice in a
row), handed a bounded window of the recent conversation, and its response
is priced, recorded, and displayed. The full transcript and a structured
snapshot are written to the log directory as the session runs.

Configuration files are loaded from (in priority order):
1. COLLOQUY_* environment variables
2. --config <path>      Explicit config file
3. ./colloquy.toml      Project-level config
4. ~/.config/colloquy/config.toml   Global config

API keys are read from OPENAI_API_KEY, ANTHROPIC_API_KEY and
GOOGLE_API_KEY; backends without a key sit the session out. At least two
participants are required.

Example:
  colloquy "debate the best era of science fiction"
  colloquy --token-limit 20000 "design a tasting menu together"
"#)]
pub struct Cli {
    /// Conversation topic (falls back to the configured default)
    pub topic: Option<String>,

    /// Token budget for the whole session
    #[arg(short, long, value_name = "TOKENS")]
    pub token_limit: Option<u64>,

    /// Directory for session transcripts and snapshots
    #[arg(short, long, value_name = "DIR")]
    pub log_dir: Option<String>,

    /// Fixed session name (derived from the clock when omitted)
    #[arg(long, value_name = "NAME")]
    pub session_name: Option<String>,

    /// Seconds to pause between turns
    #[arg(long, value_name = "SECS")]
    pub delay: Option<u64>,

    /// Format of the final summary printed on exit
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: SummaryFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress per-turn display; only the final summary is printed
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,
}
