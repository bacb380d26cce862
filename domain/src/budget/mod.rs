//! Budget domain
//!
//! Token counting and the ledger that enforces the session's hard token cap
//! and soft warning threshold.

pub mod counter;
pub mod ledger;

pub use counter::{HeuristicTokenCounter, TokenCounter, TokenizationError};
pub use ledger::{BudgetLedger, BudgetSnapshot, ParticipantRates, ParticipantUsage, TokenUsage};
