//! Append-only session transcript with windowed read views.
//!
//! The transcript is the single source of truth for "what happened when" in
//! a session. Appends enforce the ordering invariant (round numbers never
//! decrease); views are computed on read and never stored redundantly.

use super::message::Message;
use crate::error::{Result, RoundtableError};
use serde::{Deserialize, Serialize};

/// Selects a read-only view over the transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum Window {
    /// Every message of one round, in append order.
    Round(i32),
    /// The last `n` messages overall.
    LastN(usize),
    /// Every message from one persona, in append order.
    Persona(String),
}

/// Ordered, append-only message sequence for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message, enforcing the ordering invariant.
    ///
    /// # Errors
    ///
    /// Returns `OrderViolation` if `message.round_number` is lower than the
    /// round number of the last appended message. This indicates a driver
    /// bug; the append is rejected and the transcript is left untouched.
    pub fn append(&mut self, message: Message) -> Result<()> {
        if let Some(last) = self.messages.last() {
            if message.round_number < last.round_number {
                return Err(RoundtableError::OrderViolation {
                    last_round: last.round_number,
                    attempted: message.round_number,
                });
            }
        }
        self.messages.push(message);
        Ok(())
    }

    /// All messages in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages appended so far.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Resolves a window specification into a view.
    pub fn window(&self, window: &Window) -> Vec<&Message> {
        match window {
            Window::Round(round) => self.round(*round),
            Window::LastN(n) => self.last_n(*n),
            Window::Persona(id) => self.for_persona(id),
        }
    }

    /// Every message of `round`, in append order.
    pub fn round(&self, round: i32) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.round_number == round)
            .collect()
    }

    /// The last `n` messages overall.
    pub fn last_n(&self, n: usize) -> Vec<&Message> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].iter().collect()
    }

    /// Every message from persona `id`, in append order.
    pub fn for_persona(&self, id: &str) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.persona_id.as_deref() == Some(id))
            .collect()
    }

    /// Distinct round numbers present, in ascending order.
    pub fn rounds_present(&self) -> Vec<i32> {
        let mut rounds: Vec<i32> = self.messages.iter().map(|m| m.round_number).collect();
        rounds.sort_unstable();
        rounds.dedup();
        rounds
    }

    /// Round number of the most recently appended message.
    pub fn last_round(&self) -> Option<i32> {
        self.messages.last().map(|m| m.round_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentLabel;

    fn message(persona: &str, round: i32, content: &str) -> Message {
        Message {
            id: uuid::Uuid::new_v4().to_string(),
            persona_id: Some(persona.to_string()),
            persona_name: persona.to_uppercase(),
            avatar: "👤".to_string(),
            content: content.to_string(),
            sentiment: SentimentLabel::Neutral,
            sentiment_score: 0.0,
            round_number: round,
            timestamp: chrono::Utc::now().to_rfc3339(),
            fallback: false,
        }
    }

    #[test]
    fn append_keeps_order_and_length() {
        let mut transcript = Transcript::new();
        transcript.append(message("a", 0, "first")).unwrap();
        transcript.append(message("b", 0, "second")).unwrap();
        transcript.append(message("a", 1, "third")).unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[0].content, "first");
        assert_eq!(transcript.last_round(), Some(1));
    }

    #[test]
    fn decreasing_round_is_rejected() {
        let mut transcript = Transcript::new();
        transcript.append(message("a", 1, "round one")).unwrap();
        let err = transcript.append(message("a", 0, "late")).unwrap_err();
        assert!(err.is_order_violation());
        // Rejected append leaves the transcript untouched.
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn equal_round_appends_are_allowed() {
        let mut transcript = Transcript::new();
        transcript.append(message("a", 2, "one")).unwrap();
        transcript.append(message("b", 2, "two")).unwrap();
        assert_eq!(transcript.round(2).len(), 2);
    }

    #[test]
    fn windows_select_the_documented_views() {
        let mut transcript = Transcript::new();
        transcript.append(message("a", 0, "a0")).unwrap();
        transcript.append(message("b", 0, "b0")).unwrap();
        transcript.append(message("a", 1, "a1")).unwrap();
        transcript.append(message("b", 1, "b1")).unwrap();

        let round_zero = transcript.window(&Window::Round(0));
        assert_eq!(round_zero.len(), 2);
        assert!(round_zero.iter().all(|m| m.round_number == 0));

        let last_three = transcript.window(&Window::LastN(3));
        assert_eq!(last_three.len(), 3);
        assert_eq!(last_three[0].content, "b0");

        let from_a = transcript.window(&Window::Persona("a".to_string()));
        assert_eq!(from_a.len(), 2);
        assert_eq!(from_a[1].content, "a1");

        // LastN larger than the transcript returns everything.
        assert_eq!(transcript.last_n(100).len(), 4);
    }

    #[test]
    fn rounds_present_are_sorted_and_deduplicated() {
        let mut transcript = Transcript::new();
        transcript.append(message("a", 0, "a0")).unwrap();
        transcript.append(message("b", 0, "b0")).unwrap();
        transcript.append(message("a", 1, "a1")).unwrap();
        assert_eq!(transcript.rounds_present(), vec![0, 1]);
    }
}
