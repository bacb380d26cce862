//! Session recording port
//!
//! Defines the durable-write interface for conversation transcripts. The
//! filesystem adapter lives in the infrastructure layer; tests use an
//! in-memory implementation.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the conversation
//! itself in durable artifacts that survive process restart.

use colloquy_domain::{SessionSummary, Utterance};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a session recorder
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Failed to write session log: {0}")]
    WriteFailed(String),

    #[error("Session already finalized")]
    AlreadyFinalized,
}

impl From<std::io::Error> for RecorderError {
    fn from(e: std::io::Error) -> Self {
        RecorderError::WriteFailed(e.to_string())
    }
}

/// Identifiers of the durable artifacts a recorder produced
#[derive(Debug, Clone)]
pub struct SessionArtifacts {
    /// Append-only human-readable transcript
    pub transcript_path: PathBuf,
    /// Consolidated structured snapshot, overwritten on each append
    pub snapshot_path: PathBuf,
}

/// Durable recorder for one session.
///
/// Single-writer: the orchestrator owns the recorder exclusively, so
/// methods take `&mut self` and no internal locking is required.
pub trait SessionRecorder: Send {
    /// Name of the session being recorded
    fn session_name(&self) -> &str;

    /// Durably record one utterance.
    ///
    /// Must not return until the write has reached the durable sink: a
    /// crash after `append` returns must not lose the turn. Also rewrites
    /// the consolidated snapshot so the full session can be reconstructed
    /// without replaying the incremental transcript.
    fn append(&mut self, utterance: &Utterance) -> Result<(), RecorderError>;

    /// Record an operator/system annotation (topic, limits, roster) as a
    /// zero-cost entry.
    fn append_system(&mut self, content: &str) -> Result<(), RecorderError>;

    /// Statistics over everything recorded so far.
    ///
    /// Duration is zero when fewer than two entries exist.
    fn summary(&self) -> SessionSummary;

    /// Write the session-end marker with the summary and perform the final
    /// snapshot write.
    ///
    /// Must be called at most once; later calls fail with
    /// [`RecorderError::AlreadyFinalized`] and leave the persisted
    /// artifacts untouched. Finalizing a session with no appended entries
    /// still produces a valid (empty) record.
    fn finalize(&mut self, summary: &SessionSummary) -> Result<SessionArtifacts, RecorderError>;
}
