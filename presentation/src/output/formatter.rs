//! Console formatting for budget status and session summaries

use colloquy_domain::{BudgetSnapshot, SessionSummary};
use colored::Colorize;

/// Formats core records for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the live budget status block shown after each turn
    pub fn format_status(snapshot: &BudgetSnapshot) -> String {
        let marker = if snapshot.is_exceeded {
            "[LIMIT]".red().bold().to_string()
        } else if snapshot.is_warning {
            "[WARN]".yellow().bold().to_string()
        } else {
            "[OK]".green().to_string()
        };

        let mut output = format!(
            "{} tokens {}/{} ({:.1}%) | cost ${:.4} | remaining {}\n",
            marker,
            snapshot.total_tokens,
            snapshot.token_limit,
            snapshot.usage_percentage,
            snapshot.total_cost,
            snapshot.remaining_tokens,
        );

        let mut by_participant: Vec<_> = snapshot.usage_by_participant.iter().collect();
        by_participant.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        for (participant, usage) in by_participant {
            output.push_str(&format!(
                "  {}: {} tokens (${:.4})\n",
                participant, usage.total_tokens, usage.cost
            ));
        }

        output
    }

    /// Format the end-of-session statistics block
    pub fn format_summary(summary: &SessionSummary) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", "Session statistics".cyan().bold()));
        output.push_str(&format!("  Session:      {}\n", summary.session_name));
        output.push_str(&format!("  Messages:     {}\n", summary.message_count));
        output.push_str(&format!("  Total tokens: {}\n", summary.total_tokens));
        output.push_str(&format!("  Total cost:   ${:.4}\n", summary.total_cost));
        output.push_str(&format!(
            "  Duration:     {:.1} minutes\n",
            summary.duration_minutes
        ));

        let mut stats: Vec<_> = summary.participant_stats.iter().collect();
        stats.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        if !stats.is_empty() {
            output.push_str(&format!("\n{}\n", "Per participant".cyan().bold()));
            for (participant, stat) in stats {
                output.push_str(&format!(
                    "  {}: {} messages, {} tokens (${:.4})\n",
                    participant, stat.count, stat.tokens, stat.cost
                ));
            }
        }

        output
    }

    /// Format the summary as a JSON record
    pub fn format_summary_json(summary: &SessionSummary) -> String {
        serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string())
    }
}
