//! Budget ledger
//!
//! Tracks token and monetary usage per participant and in aggregate, and
//! decides when the session must stop. The budget is the sole hard stop
//! condition; everything else the orchestrator checks is advisory.

use crate::budget::counter::{TokenCounter, TokenizationError};
use crate::core::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token usage for one participant
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Per-token USD rates for one participant (Value Object)
///
/// Zero rates are valid: free-tier participants consume tokens but no money.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ParticipantRates {
    /// USD per input token
    pub input: f64,
    /// USD per output token
    pub output: f64,
}

impl ParticipantRates {
    pub fn new(input: f64, output: f64) -> Self {
        Self { input, output }
    }

    /// USD-per-1M-token convenience constructor, matching how providers
    /// publish their pricing
    pub fn per_million(input: f64, output: f64) -> Self {
        Self {
            input: input / 1_000_000.0,
            output: output / 1_000_000.0,
        }
    }

    /// Rate table mirrored from the reference deployment: GPT-4o class at
    /// $2.50/$10.00 per 1M, Claude Sonnet class at $3.00/$15.00 per 1M,
    /// Gemini Flash free tier at zero.
    pub fn default_table() -> HashMap<ParticipantId, ParticipantRates> {
        HashMap::from([
            (
                ParticipantId::new("ChatGPT"),
                ParticipantRates::per_million(2.50, 10.00),
            ),
            (
                ParticipantId::new("Claude"),
                ParticipantRates::per_million(3.00, 15.00),
            ),
            (ParticipantId::new("Gemini"), ParticipantRates::default()),
        ])
    }
}

/// Usage and cost for one participant in a [`BudgetSnapshot`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ParticipantUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cost: f64,
}

/// Read-only copy of the ledger state, safe to hand to any presentation
/// layer or persist as-is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    pub total_tokens: u64,
    pub total_cost: f64,
    pub token_limit: u64,
    pub usage_percentage: f64,
    pub remaining_tokens: u64,
    pub is_warning: bool,
    pub is_exceeded: bool,
    pub usage_by_participant: HashMap<ParticipantId, ParticipantUsage>,
}

/// Tracks token and cost usage against a fixed session budget.
///
/// Single-writer: the orchestrator is the only mutator, so no internal
/// locking is needed. The limit is fixed for the session lifetime and
/// checked only after a turn completes, so the realized total may overshoot
/// the nominal limit by at most one turn's usage.
pub struct BudgetLedger {
    counter: Box<dyn TokenCounter>,
    rates: HashMap<ParticipantId, ParticipantRates>,
    usage: HashMap<ParticipantId, TokenUsage>,
    cost_by_participant: HashMap<ParticipantId, f64>,
    total_tokens: u64,
    total_cost: f64,
    token_limit: u64,
    warning_threshold: f64,
}

impl BudgetLedger {
    pub fn new(
        counter: Box<dyn TokenCounter>,
        token_limit: u64,
        rates: HashMap<ParticipantId, ParticipantRates>,
    ) -> Self {
        Self {
            counter,
            rates,
            usage: HashMap::new(),
            cost_by_participant: HashMap::new(),
            total_tokens: 0,
            total_cost: 0.0,
            token_limit,
            warning_threshold: 0.9,
        }
    }

    pub fn with_warning_threshold(mut self, threshold: f64) -> Self {
        self.warning_threshold = threshold;
        self
    }

    /// Account one completed turn.
    ///
    /// Counts tokens for the input and output texts, prices them with the
    /// participant's rate table entry (zero rates for unknown participants),
    /// and updates both the per-participant and aggregate counters.
    /// Returns `(turn_tokens, turn_cost)`.
    pub fn record(
        &mut self,
        participant: &ParticipantId,
        input_text: &str,
        output_text: &str,
    ) -> Result<(u64, f64), TokenizationError> {
        let input_tokens = self.counter.count(input_text)?;
        let output_tokens = self.counter.count(output_text)?;

        let entry = self.usage.entry(participant.clone()).or_default();
        entry.input_tokens += input_tokens;
        entry.output_tokens += output_tokens;

        let rates = self
            .rates
            .get(participant)
            .copied()
            .unwrap_or_default();
        let cost = input_tokens as f64 * rates.input + output_tokens as f64 * rates.output;

        *self
            .cost_by_participant
            .entry(participant.clone())
            .or_default() += cost;

        let turn_tokens = input_tokens + output_tokens;
        self.total_tokens += turn_tokens;
        self.total_cost += cost;

        Ok((turn_tokens, cost))
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn token_limit(&self) -> u64 {
        self.token_limit
    }

    /// Usage as a percentage of the limit (0–100+); 0 when no limit is set
    pub fn usage_percentage(&self) -> f64 {
        if self.token_limit == 0 {
            return 0.0;
        }
        self.total_tokens as f64 / self.token_limit as f64 * 100.0
    }

    /// Hard stop: has the session consumed its token budget?
    pub fn is_exceeded(&self) -> bool {
        self.token_limit > 0 && self.total_tokens >= self.token_limit
    }

    /// Soft warning: has usage crossed the warning threshold?
    pub fn is_warning(&self) -> bool {
        if self.token_limit == 0 {
            return false;
        }
        self.usage_percentage() >= self.warning_threshold * 100.0
    }

    pub fn remaining(&self) -> u64 {
        self.token_limit.saturating_sub(self.total_tokens)
    }

    /// Read-only snapshot of the current state
    pub fn snapshot(&self) -> BudgetSnapshot {
        let usage_by_participant = self
            .usage
            .iter()
            .map(|(id, usage)| {
                (
                    id.clone(),
                    ParticipantUsage {
                        input_tokens: usage.input_tokens,
                        output_tokens: usage.output_tokens,
                        total_tokens: usage.total(),
                        cost: self.cost_by_participant.get(id).copied().unwrap_or(0.0),
                    },
                )
            })
            .collect();

        BudgetSnapshot {
            total_tokens: self.total_tokens,
            total_cost: self.total_cost,
            token_limit: self.token_limit,
            usage_percentage: self.usage_percentage(),
            remaining_tokens: self.remaining(),
            is_warning: self.is_warning(),
            is_exceeded: self.is_exceeded(),
            usage_by_participant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counter that charges one token per character, for exact arithmetic
    struct CharCounter;

    impl TokenCounter for CharCounter {
        fn count(&self, text: &str) -> Result<u64, TokenizationError> {
            Ok(text.chars().count() as u64)
        }
    }

    fn char_ledger(limit: u64) -> BudgetLedger {
        BudgetLedger::new(Box::new(CharCounter), limit, ParticipantRates::default_table())
    }

    #[test]
    fn test_record_returns_turn_tokens_and_cost() {
        let mut ledger = BudgetLedger::new(
            Box::new(CharCounter),
            1000,
            HashMap::from([(
                ParticipantId::new("Claude"),
                ParticipantRates::new(0.01, 0.02),
            )]),
        );

        let (tokens, cost) = ledger
            .record(&ParticipantId::new("Claude"), "ab", "cdef")
            .unwrap();

        assert_eq!(tokens, 6);
        // 2 * 0.01 + 4 * 0.02
        assert!((cost - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_equals_sum_of_participants() {
        let mut ledger = char_ledger(10_000);
        ledger
            .record(&ParticipantId::new("ChatGPT"), "aaaa", "bbbb")
            .unwrap();
        ledger
            .record(&ParticipantId::new("Claude"), "cc", "dddddd")
            .unwrap();
        ledger
            .record(&ParticipantId::new("ChatGPT"), "e", "f")
            .unwrap();

        let snapshot = ledger.snapshot();
        let participant_sum: u64 = snapshot
            .usage_by_participant
            .values()
            .map(|u| u.total_tokens)
            .sum();
        assert_eq!(snapshot.total_tokens, participant_sum);
        assert_eq!(snapshot.total_tokens, 18);
    }

    #[test]
    fn test_totals_are_monotonic() {
        let mut ledger = char_ledger(100);
        let mut last_tokens = 0;
        let mut last_cost = 0.0;

        for _ in 0..10 {
            ledger
                .record(&ParticipantId::new("Claude"), "hello", "world!")
                .unwrap();
            assert!(ledger.total_tokens() > last_tokens);
            assert!(ledger.total_cost() >= last_cost);
            last_tokens = ledger.total_tokens();
            last_cost = ledger.total_cost();
        }
    }

    #[test]
    fn test_exceeded_only_at_limit() {
        let mut ledger = char_ledger(100);

        // 40 tokens per turn: 40, 80 are below the limit
        let input = "a".repeat(20);
        let output = "b".repeat(20);
        ledger.record(&ParticipantId::new("ChatGPT"), &input, &output).unwrap();
        assert!(!ledger.is_exceeded());
        ledger.record(&ParticipantId::new("Claude"), &input, &output).unwrap();
        assert!(!ledger.is_exceeded());

        // Third turn pushes to 120 >= 100
        ledger.record(&ParticipantId::new("Gemini"), &input, &output).unwrap();
        assert!(ledger.is_exceeded());
        assert_eq!(ledger.remaining(), 0);
    }

    #[test]
    fn test_warning_at_ninety_percent() {
        let mut ledger = char_ledger(100);
        let input = "a".repeat(45);
        let output = "b".repeat(44);

        ledger.record(&ParticipantId::new("Claude"), &input, &output).unwrap();
        assert_eq!(ledger.total_tokens(), 89);
        assert!(!ledger.is_warning());

        ledger.record(&ParticipantId::new("ChatGPT"), "c", "").unwrap();
        assert_eq!(ledger.total_tokens(), 90);
        assert!(ledger.is_warning());
        assert!(!ledger.is_exceeded());
    }

    #[test]
    fn test_zero_limit_never_warns_or_exceeds() {
        let mut ledger = char_ledger(0);
        ledger
            .record(&ParticipantId::new("Claude"), "some", "text")
            .unwrap();

        assert_eq!(ledger.usage_percentage(), 0.0);
        assert!(!ledger.is_warning());
        assert!(!ledger.is_exceeded());
        assert_eq!(ledger.remaining(), 0);
    }

    #[test]
    fn test_unknown_participant_costs_nothing() {
        let mut ledger = char_ledger(1000);
        let (tokens, cost) = ledger
            .record(&ParticipantId::new("Mystery"), "abc", "def")
            .unwrap();

        assert_eq!(tokens, 6);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_free_tier_participant_accrues_tokens_not_cost() {
        let mut ledger = char_ledger(1000);
        ledger
            .record(&ParticipantId::new("Gemini"), "abcd", "efgh")
            .unwrap();

        let snapshot = ledger.snapshot();
        let gemini = &snapshot.usage_by_participant[&ParticipantId::new("Gemini")];
        assert_eq!(gemini.total_tokens, 8);
        assert_eq!(gemini.cost, 0.0);
        assert_eq!(snapshot.total_cost, 0.0);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut ledger = char_ledger(1000);
        ledger
            .record(&ParticipantId::new("Claude"), "aa", "bb")
            .unwrap();
        let before = ledger.snapshot();

        ledger
            .record(&ParticipantId::new("Claude"), "cc", "dd")
            .unwrap();

        // Earlier snapshot is unaffected by later mutation
        assert_eq!(before.total_tokens, 4);
        assert_eq!(ledger.snapshot().total_tokens, 8);
    }
}
