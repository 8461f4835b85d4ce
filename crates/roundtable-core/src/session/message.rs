//! Transcript message types.

use crate::sentiment::{SentimentLabel, SentimentScore};
use serde::{Deserialize, Serialize};

/// Round number of the initial-reaction phase.
pub const ROUND_INITIAL: i32 = 0;

/// Round number reserved for synthesis/meta messages.
///
/// Synthesis messages are carried on phase results and session results, not
/// appended to the transcript; an append at this round after any discussion
/// round would break the non-decreasing round ordering.
pub const ROUND_SYNTHESIS: i32 = -1;

/// A single utterance in a session.
///
/// Messages are append-only: once produced they are never edited or deleted.
/// `persona_id` is `None` for moderator or user messages, which are excluded
/// from sentiment aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier (UUID format)
    pub id: String,
    /// Persona that produced this message, `None` for moderator/user rows
    pub persona_id: Option<String>,
    /// Display name at the time the message was produced
    pub persona_name: String,
    /// Avatar token for display
    pub avatar: String,
    /// Generated or user-provided text
    pub content: String,
    /// Thresholded sentiment label
    pub sentiment: SentimentLabel,
    /// Signed sentiment value in [-1.0, 1.0]
    pub sentiment_score: f64,
    /// 0 = initial reaction, 1.. = discussion rounds, -1 = synthesis/meta
    pub round_number: i32,
    /// Timestamp when the message was created (ISO 8601 format)
    pub timestamp: String,
    /// True when this message was substituted after generation failed
    #[serde(default)]
    pub fallback: bool,
}

impl Message {
    /// Creates a moderator message (no persona, excluded from metrics).
    pub fn moderator(content: impl Into<String>, round_number: i32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            persona_id: None,
            persona_name: "Moderator".to_string(),
            avatar: "🎤".to_string(),
            content: content.into(),
            sentiment: SentimentLabel::Neutral,
            sentiment_score: 0.0,
            round_number,
            timestamp: chrono::Utc::now().to_rfc3339(),
            fallback: false,
        }
    }

    /// The sentiment label/value pair carried by this message.
    pub fn score(&self) -> SentimentScore {
        SentimentScore {
            label: self.sentiment,
            value: self.sentiment_score,
        }
    }
}
