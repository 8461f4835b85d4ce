//! Session specification and start-time validation.

use crate::error::{Result, RoundtableError};
use crate::persona::PersonaRegistry;
use serde::{Deserialize, Serialize};

/// Largest panel a focus group supports.
pub const MAX_FOCUS_GROUP_PARTICIPANTS: usize = 20;

/// Kind of session being simulated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SessionType {
    /// One persona, question-and-answer style; no synthesis phase.
    Interview,
    /// Multi-persona panel with discussion rounds and a closing synthesis.
    FocusGroup,
}

/// Immutable description of one session to run.
///
/// `participant_ids` is ordered: it is the fixed speaking order for every
/// phase, never re-randomized, so a rerun with the same spec visits
/// participants identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSpec {
    /// Unique session identifier (UUID format)
    pub session_id: String,
    /// Topic or campaign description put before the participants
    pub topic: String,
    /// Ordered session goals woven into the prompts
    #[serde(default)]
    pub goals: Vec<String>,
    /// Ordered participant persona ids; also the speaking order
    pub participant_ids: Vec<String>,
    /// Number of discussion rounds after the initial reaction
    pub round_count: u32,
    /// Session kind
    pub session_type: SessionType,
}

impl SessionSpec {
    /// Validates the spec against a registry before any external call.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when:
    /// - the participant set is empty,
    /// - an interview has more than one participant,
    /// - a focus group has fewer than 2 or more than 20 participants,
    /// - a focus group has no discussion rounds,
    /// - a participant id appears twice,
    ///
    /// and a `NotFound` error when a participant id is not in the registry.
    /// An interview with `round_count == 0` is valid: it runs the initial
    /// reaction only.
    pub fn validate(&self, registry: &PersonaRegistry) -> Result<()> {
        if self.participant_ids.is_empty() {
            return Err(RoundtableError::config(
                "session requires at least one participant",
            ));
        }
        match self.session_type {
            SessionType::Interview => {
                if self.participant_ids.len() != 1 {
                    return Err(RoundtableError::config(
                        "interview sessions take exactly one participant",
                    ));
                }
            }
            SessionType::FocusGroup => {
                if self.participant_ids.len() < 2
                    || self.participant_ids.len() > MAX_FOCUS_GROUP_PARTICIPANTS
                {
                    return Err(RoundtableError::config(format!(
                        "focus groups take 2 to {} participants",
                        MAX_FOCUS_GROUP_PARTICIPANTS
                    )));
                }
                if self.round_count < 1 {
                    return Err(RoundtableError::config(
                        "focus groups require at least one discussion round",
                    ));
                }
            }
        }
        let mut seen = std::collections::HashSet::new();
        for id in &self.participant_ids {
            if !seen.insert(id.as_str()) {
                return Err(RoundtableError::config(format!(
                    "participant '{}' listed more than once",
                    id
                )));
            }
            registry.require(id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::get_default_presets;

    fn registry() -> PersonaRegistry {
        PersonaRegistry::new(get_default_presets()).unwrap()
    }

    fn spec(session_type: SessionType, participants: &[&str], rounds: u32) -> SessionSpec {
        SessionSpec {
            session_id: uuid::Uuid::new_v4().to_string(),
            topic: "A subscription meal kit".to_string(),
            goals: vec!["Gauge purchase intent".to_string()],
            participant_ids: participants.iter().map(|s| s.to_string()).collect(),
            round_count: rounds,
            session_type,
        }
    }

    #[test]
    fn valid_focus_group_passes() {
        let spec = spec(
            SessionType::FocusGroup,
            &["tech-enthusiast", "skeptical-buyer", "data-analyst"],
            3,
        );
        assert!(spec.validate(&registry()).is_ok());
    }

    #[test]
    fn interview_with_zero_rounds_is_valid() {
        let spec = spec(SessionType::Interview, &["data-analyst"], 0);
        assert!(spec.validate(&registry()).is_ok());
    }

    #[test]
    fn empty_participants_are_rejected() {
        let spec = spec(SessionType::FocusGroup, &[], 3);
        assert!(spec.validate(&registry()).unwrap_err().is_config());
    }

    #[test]
    fn interview_requires_exactly_one_participant() {
        let spec = spec(
            SessionType::Interview,
            &["tech-enthusiast", "data-analyst"],
            1,
        );
        assert!(spec.validate(&registry()).unwrap_err().is_config());
    }

    #[test]
    fn focus_group_requires_at_least_two_participants() {
        let spec = spec(SessionType::FocusGroup, &["tech-enthusiast"], 3);
        assert!(spec.validate(&registry()).unwrap_err().is_config());
    }

    #[test]
    fn focus_group_requires_a_discussion_round() {
        let spec = spec(
            SessionType::FocusGroup,
            &["tech-enthusiast", "data-analyst"],
            0,
        );
        assert!(spec.validate(&registry()).unwrap_err().is_config());
    }

    #[test]
    fn unknown_participant_is_not_found() {
        let spec = spec(
            SessionType::FocusGroup,
            &["tech-enthusiast", "nobody-here"],
            3,
        );
        assert!(spec.validate(&registry()).unwrap_err().is_not_found());
    }

    #[test]
    fn duplicate_participant_is_rejected() {
        let spec = spec(
            SessionType::FocusGroup,
            &["tech-enthusiast", "tech-enthusiast"],
            3,
        );
        assert!(spec.validate(&registry()).unwrap_err().is_config());
    }
}
