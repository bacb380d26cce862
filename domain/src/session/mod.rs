//! Session domain
//!
//! A session is one complete run of the orchestration loop, from start to
//! finalize.

pub mod entities;

pub use entities::{ParticipantStats, Session, SessionSummary};
