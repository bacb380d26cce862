//! Token counting for budget accounting.
//!
//! Provides deterministic heuristic estimation (chars/4 + 10% margin).
//! Exact BPE counting can be slotted in behind the same trait without
//! changing the ledger contract.

use thiserror::Error;

/// Errors raised by a token counter.
///
/// Counting only fails on exhaustion of underlying resources; the shipped
/// heuristic counter never does. A failure is fatal for the turn being
/// accounted, not for the session.
#[derive(Error, Debug)]
pub enum TokenizationError {
    #[error("Tokenizer resources exhausted: {0}")]
    ResourcesExhausted(String),
}

/// Trait for token counting implementations.
///
/// Implementations must be deterministic: the same text always yields the
/// same count within a session.
pub trait TokenCounter: Send + Sync {
    /// Count tokens in a plain text string.
    fn count(&self, text: &str) -> Result<u64, TokenizationError>;
}

/// Heuristic token counter using character-based estimation.
///
/// Uses the approximation: tokens ≈ characters / 4, with a 10% safety
/// margin. Intentionally conservative to avoid underestimating usage
/// against the budget cap.
#[derive(Debug, Clone)]
pub struct HeuristicTokenCounter {
    /// Characters per token ratio (default: 4)
    chars_per_token: f64,
    /// Safety margin multiplier (default: 1.1 = 10% extra)
    safety_margin: f64,
}

impl HeuristicTokenCounter {
    pub fn new(chars_per_token: f64, safety_margin: f64) -> Self {
        Self {
            chars_per_token,
            safety_margin,
        }
    }
}

impl Default for HeuristicTokenCounter {
    fn default() -> Self {
        Self {
            chars_per_token: 4.0,
            safety_margin: 1.1,
        }
    }
}

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> Result<u64, TokenizationError> {
        if text.is_empty() {
            return Ok(0);
        }

        let char_count = text.chars().count() as f64;
        let base_tokens = char_count / self.chars_per_token;
        let adjusted_tokens = base_tokens * self.safety_margin;

        Ok(adjusted_tokens.ceil() as u64)
    }
}
