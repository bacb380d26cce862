//! Live console display of the running conversation

use colloquy_application::{ConversationObserver, GenerationError};
use colloquy_domain::{BudgetSnapshot, ParticipantId, SessionSummary, Utterance};
use colored::{ColoredString, Colorize};

use crate::output::formatter::ConsoleFormatter;

/// Prints each turn as it completes.
///
/// Purely advisory: nothing here influences the orchestration loop.
pub struct ConsoleObserver;

impl ConsoleObserver {
    pub fn new() -> Self {
        Self
    }

    fn colored_name(participant: &ParticipantId) -> ColoredString {
        // Stable per-name colors for the reference trio; everyone else is
        // left uncolored
        match participant.as_str() {
            "ChatGPT" => participant.as_str().green().bold(),
            "Claude" => participant.as_str().yellow().bold(),
            "Gemini" => participant.as_str().cyan().bold(),
            other => other.bold(),
        }
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationObserver for ConsoleObserver {
    fn on_turn_start(&self, speaker: &ParticipantId) {
        println!("\n{} {}", Self::colored_name(speaker), "is speaking...".dimmed());
    }

    fn on_utterance(&self, utterance: &Utterance, budget: &BudgetSnapshot) {
        println!(
            "\n{}\n{}\n{}\n",
            Self::colored_name(&utterance.speaker),
            "-".repeat(60),
            utterance.content
        );
        println!(
            "{}",
            format!(
                "this turn: {} tokens, ${:.4}",
                utterance.tokens, utterance.cost
            )
            .dimmed()
        );
        print!("{}", ConsoleFormatter::format_status(budget));
    }

    fn on_turn_failed(&self, error: &GenerationError) {
        println!("\n{} {}", "turn failed:".red().bold(), error);
        println!("{}", "continuing the conversation...".dimmed());
    }

    fn on_budget_warning(&self, budget: &BudgetSnapshot) {
        println!(
            "\n{}",
            "Token usage has crossed the warning threshold"
                .yellow()
                .bold()
        );
        print!("{}", ConsoleFormatter::format_status(budget));
    }

    fn on_session_end(&self, _summary: &SessionSummary) {
        println!("\n{}", "=".repeat(80));
        println!("{}", "Conversation session ended".cyan().bold());
        println!("{}", "=".repeat(80));
    }
}
