//! Final session output handed to the caller.

use super::message::Message;
use super::transcript::Transcript;
use crate::metrics::SessionMetrics;
use serde::{Deserialize, Serialize};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    /// Every phase ran to completion.
    Completed,
    /// The caller ended or cancelled the session before the final phase.
    Aborted,
}

/// Transcript plus analytics for a finished (or ended-early) session.
///
/// A partial transcript is a valid result: metrics are computed over
/// whatever phases completed before the session ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Session this result belongs to
    pub session_id: String,
    /// Final transcript snapshot
    pub transcript: Transcript,
    /// Aggregated analytics over the transcript
    pub metrics: SessionMetrics,
    /// Closing synthesis message (round -1), when the phase ran
    pub summary: Option<Message>,
    /// Completed or Aborted
    pub status: SessionStatus,
    /// Timestamp when the session started (ISO 8601 format)
    pub started_at: String,
    /// Timestamp when the session ended (ISO 8601 format)
    pub ended_at: String,
    /// Actual elapsed wall time in seconds
    pub duration_seconds: f64,
}
