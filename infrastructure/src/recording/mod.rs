//! Recording infrastructure for durable session transcripts.
//!
//! Provides [`FsSessionRecorder`], a filesystem adapter for the
//! [`SessionRecorder`](colloquy_application::SessionRecorder) port.

mod fs_recorder;

pub use fs_recorder::FsSessionRecorder;
