//! CLI entrypoint for colloquy
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use colloquy_application::{
    ConversationObserver, NoObserver, RunConversationError, RunConversationUseCase, TextGenerator,
};
use colloquy_domain::{HeuristicTokenCounter, ParticipantId};
use colloquy_infrastructure::{
    AnthropicGenerator, ConfigLoader, FileConfig, FsSessionRecorder, GeminiGenerator,
    OpenAiGenerator,
};
use colloquy_presentation::{Cli, ConsoleFormatter, ConsoleObserver, SummaryFormat};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting colloquy");

    // Load configuration and apply CLI overrides
    let mut file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?
    };

    if let Some(topic) = &cli.topic {
        file_config.conversation.topic = topic.clone();
    }
    if let Some(token_limit) = cli.token_limit {
        file_config.conversation.token_limit = token_limit;
    }
    if let Some(delay) = cli.delay {
        file_config.conversation.inter_turn_delay_secs = delay;
    }
    if let Some(log_dir) = &cli.log_dir {
        file_config.logging.dir = log_dir.clone();
    }
    if let Some(session_name) = &cli.session_name {
        file_config.logging.session_name = Some(session_name.clone());
    }

    if file_config.conversation.token_limit == 0 {
        bail!("token limit must be greater than zero");
    }

    // === Dependency Injection ===
    // Build one generator per backend whose API key is present
    let generators = build_generators(&file_config);
    let roster: Vec<String> = generators.iter().map(|(id, _)| id.to_string()).collect();

    let recorder = FsSessionRecorder::open(
        &file_config.logging.dir,
        file_config.logging.session_name.clone(),
    )
    .context("failed to open session log")?;

    // Cooperative cancellation: Ctrl-C arms the token, and the loop
    // observes it at the next turn boundary
    let cancellation_token = CancellationToken::new();
    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received; finishing the turn in flight");
            signal_token.cancel();
        }
    });

    let config = file_config.conversation_config();

    if !cli.quiet {
        println!();
        println!("+============================================================+");
        println!("|        colloquy - an observed AI conversation              |");
        println!("+============================================================+");
        println!();
        println!("Topic: {}", config.topic);
        println!("Token limit: {}", config.token_limit);
        println!("Participants: {}", roster.join(", "));
        println!();
        println!("Press Ctrl-C to end the session early.");
    }

    let use_case = RunConversationUseCase::new(
        generators,
        recorder,
        config,
        Box::new(HeuristicTokenCounter::default()),
    )
    .with_cancellation_token(cancellation_token);

    let observer: Box<dyn ConversationObserver> = if cli.quiet {
        Box::new(NoObserver)
    } else {
        Box::new(ConsoleObserver::new())
    };

    let outcome = match use_case.execute(observer.as_ref()).await {
        Ok(outcome) => outcome,
        Err(RunConversationError::NotEnoughParticipants(n)) => {
            bail!(
                "a conversation needs at least two participants, found {}; \
                 set the missing API keys (OPENAI_API_KEY, ANTHROPIC_API_KEY, GOOGLE_API_KEY)",
                n
            );
        }
        Err(e) => return Err(e.into()),
    };

    // Final summary
    let summary_text = match cli.output {
        SummaryFormat::Text => ConsoleFormatter::format_summary(&outcome.summary),
        SummaryFormat::Json => ConsoleFormatter::format_summary_json(&outcome.summary),
    };
    println!("{}", summary_text);

    if !cli.quiet {
        println!("Transcript: {}", outcome.artifacts.transcript_path.display());
        println!("Snapshot:   {}", outcome.artifacts.snapshot_path.display());
    }

    Ok(())
}

/// Instantiate a generator for every enabled backend whose API key is set.
///
/// Backends without a key sit the session out; the use case enforces the
/// two-participant minimum afterwards.
fn build_generators(config: &FileConfig) -> Vec<(ParticipantId, Arc<dyn TextGenerator>)> {
    let mut generators: Vec<(ParticipantId, Arc<dyn TextGenerator>)> = Vec::new();
    let providers = &config.providers;

    if let Some(key) = resolve_api_key(&providers.openai.api_key_env, providers.openai.enabled) {
        let id = ParticipantId::new(&providers.openai.participant);
        let mut generator =
            OpenAiGenerator::new(id.clone(), key).with_model(&providers.openai.model);
        if let Some(url) = &providers.openai.base_url {
            generator = generator.with_base_url(url);
        }
        generators.push((id, Arc::new(generator)));
    }

    if let Some(key) =
        resolve_api_key(&providers.anthropic.api_key_env, providers.anthropic.enabled)
    {
        let id = ParticipantId::new(&providers.anthropic.participant);
        let mut generator =
            AnthropicGenerator::new(id.clone(), key).with_model(&providers.anthropic.model);
        if let Some(url) = &providers.anthropic.base_url {
            generator = generator.with_base_url(url);
        }
        generators.push((id, Arc::new(generator)));
    }

    if let Some(key) = resolve_api_key(&providers.gemini.api_key_env, providers.gemini.enabled) {
        let id = ParticipantId::new(&providers.gemini.participant);
        let mut generator =
            GeminiGenerator::new(id.clone(), key).with_model(&providers.gemini.model);
        if let Some(url) = &providers.gemini.base_url {
            generator = generator.with_base_url(url);
        }
        generators.push((id, Arc::new(generator)));
    }

    generators
}

fn resolve_api_key(env_var: &str, enabled: bool) -> Option<String> {
    if !enabled {
        return None;
    }
    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Some(key),
        _ => {
            warn!("{} is not set; that backend will sit this session out", env_var);
            None
        }
    }
}
