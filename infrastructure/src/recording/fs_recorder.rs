//! Filesystem session recorder
//!
//! Two durable artifacts per session, keyed by session name:
//!
//! - `{name}.txt`: append-only human-readable transcript; every append is
//!   flushed and fsynced before returning, so a crash after `append` never
//!   loses the turn
//! - `{name}.json`: consolidated structured snapshot, rewritten on each
//!   append for crash-consistent reconstruction without replaying the
//!   transcript

use chrono::{DateTime, Local, Utc};
use colloquy_application::{RecorderError, SessionArtifacts, SessionRecorder};
use colloquy_domain::{ParticipantId, SessionSummary, Utterance};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Speaker label for operator/system annotations
const SYSTEM_LABEL: &str = "System";

/// One recorded entry in the snapshot artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedMessage {
    pub timestamp: DateTime<Utc>,
    pub speaker: String,
    pub content: String,
    pub tokens: u64,
    pub cost: f64,
}

#[derive(Debug, Serialize)]
struct SnapshotDocument<'a> {
    session_name: &'a str,
    start_time: Option<DateTime<Utc>>,
    message_count: usize,
    messages: &'a [RecordedMessage],
}

/// Filesystem-backed [`SessionRecorder`].
pub struct FsSessionRecorder {
    session_name: String,
    transcript_path: PathBuf,
    snapshot_path: PathBuf,
    transcript: BufWriter<File>,
    messages: Vec<RecordedMessage>,
    finalized: bool,
}

impl FsSessionRecorder {
    /// Open a new session under `log_dir`, writing the session-start marker
    /// immediately so the transcript is tail-able before any turns exist.
    ///
    /// When no name is given, one is derived from the current local time at
    /// second resolution.
    pub fn open(
        log_dir: impl AsRef<Path>,
        session_name: Option<String>,
    ) -> Result<Self, RecorderError> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let session_name = session_name
            .unwrap_or_else(|| Local::now().format("conversation_%Y%m%d_%H%M%S").to_string());

        let transcript_path = log_dir.join(format!("{}.txt", session_name));
        let snapshot_path = log_dir.join(format!("{}.json", session_name));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&transcript_path)?;
        let mut transcript = BufWriter::new(file);

        writeln!(
            transcript,
            "=== Conversation session started: {} ===",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        transcript.flush()?;
        transcript.get_ref().sync_data()?;

        Ok(Self {
            session_name,
            transcript_path,
            snapshot_path,
            transcript,
            messages: Vec::new(),
            finalized: false,
        })
    }

    pub fn transcript_path(&self) -> &Path {
        &self.transcript_path
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    fn record(&mut self, message: RecordedMessage) -> Result<(), RecorderError> {
        writeln!(
            self.transcript,
            "\n[{}] {}\n{}\n{}\n\ntokens: {}, cost: ${:.4}\n{}",
            message.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            message.speaker,
            "-".repeat(50),
            message.content,
            message.tokens,
            message.cost,
            "=".repeat(80),
        )?;
        self.transcript.flush()?;
        self.transcript.get_ref().sync_data()?;

        self.messages.push(message);
        self.write_snapshot()
    }

    fn write_snapshot(&self) -> Result<(), RecorderError> {
        let document = SnapshotDocument {
            session_name: &self.session_name,
            start_time: self.messages.first().map(|m| m.timestamp),
            message_count: self.messages.len(),
            messages: &self.messages,
        };

        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| RecorderError::WriteFailed(e.to_string()))?;
        fs::write(&self.snapshot_path, json)?;
        Ok(())
    }

    fn duration_minutes(&self) -> f64 {
        if self.messages.len() < 2 {
            return 0.0;
        }
        let first = self.messages.first().expect("non-empty").timestamp;
        let last = self.messages.last().expect("non-empty").timestamp;
        (last - first).num_seconds() as f64 / 60.0
    }
}

impl SessionRecorder for FsSessionRecorder {
    fn session_name(&self) -> &str {
        &self.session_name
    }

    fn append(&mut self, utterance: &Utterance) -> Result<(), RecorderError> {
        self.record(RecordedMessage {
            timestamp: utterance.timestamp,
            speaker: utterance.speaker.to_string(),
            content: utterance.content.clone(),
            tokens: utterance.tokens,
            cost: utterance.cost,
        })
    }

    fn append_system(&mut self, content: &str) -> Result<(), RecorderError> {
        self.record(RecordedMessage {
            timestamp: Utc::now(),
            speaker: SYSTEM_LABEL.to_string(),
            content: content.to_string(),
            tokens: 0,
            cost: 0.0,
        })
    }

    fn summary(&self) -> SessionSummary {
        let mut summary = SessionSummary {
            session_name: self.session_name.clone(),
            message_count: self.messages.len() as u64,
            duration_minutes: self.duration_minutes(),
            ..Default::default()
        };

        for message in &self.messages {
            summary.total_tokens += message.tokens;
            summary.total_cost += message.cost;
            let stats = summary
                .participant_stats
                .entry(ParticipantId::new(&message.speaker))
                .or_default();
            stats.count += 1;
            stats.tokens += message.tokens;
            stats.cost += message.cost;
        }

        summary
    }

    fn finalize(&mut self, summary: &SessionSummary) -> Result<SessionArtifacts, RecorderError> {
        if self.finalized {
            return Err(RecorderError::AlreadyFinalized);
        }

        writeln!(
            self.transcript,
            "\n=== Conversation session ended: {} ===\n\
             Session statistics:\n\
             - messages: {}\n\
             - total tokens: {}\n\
             - total cost: ${:.4}\n\
             - duration: {:.1} minutes",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            summary.message_count,
            summary.total_tokens,
            summary.total_cost,
            summary.duration_minutes,
        )?;
        self.transcript.flush()?;
        self.transcript.get_ref().sync_data()?;

        self.write_snapshot()?;
        self.finalized = true;

        info!(
            transcript = %self.transcript_path.display(),
            snapshot = %self.snapshot_path.display(),
            "Session artifacts written"
        );

        Ok(SessionArtifacts {
            transcript_path: self.transcript_path.clone(),
            snapshot_path: self.snapshot_path.clone(),
        })
    }
}

impl Drop for FsSessionRecorder {
    fn drop(&mut self) {
        let _ = self.transcript.flush();
    }
}
