//! Persona domain model.
//!
//! A persona is a static behavioral profile driving one simulated
//! participant. Profiles are loaded once at process start and never mutated
//! by a session; all behavior differences between participants come from
//! this data, not from code branches.

use serde::{Deserialize, Serialize};

/// A configured participant profile for simulated sessions.
///
/// The numeric parameters skew generated behavior:
/// - `sentiment_bias` in `[-1.0, 1.0]` shifts computed sentiment polarity,
/// - `engagement_level` in `[0.0, 1.0]` controls how elaborate responses are,
/// - `controversy_tolerance` in `[0.0, 1.0]` controls willingness to push
///   back on contentious points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// Unique identifier (slug or UUID format)
    pub id: String,
    /// Display name shown on transcript messages
    pub name: String,
    /// Avatar token (emoji in the default presets)
    pub avatar: String,
    /// Role or title describing the persona's perspective
    pub role: String,
    /// What this persona is trying to get out of a session
    pub goal: String,
    /// Background description shaping tone and vocabulary
    pub backstory: String,
    /// Communication style characteristics
    pub communication_style: String,
    /// Areas this persona speaks on with authority
    #[serde(default)]
    pub expertise_areas: Vec<String>,
    /// Disposition skew applied to sentiment scoring, -1.0 to 1.0
    #[serde(default)]
    pub sentiment_bias: f64,
    /// How much the persona elaborates, 0.0 to 1.0
    #[serde(default = "default_behavioral_level")]
    pub engagement_level: f64,
    /// Comfort with contentious topics, 0.0 to 1.0
    #[serde(default = "default_behavioral_level")]
    pub controversy_tolerance: f64,
}

pub(crate) fn default_behavioral_level() -> f64 {
    0.5
}

/// Avatar used when a persona does not define one.
pub const DEFAULT_AVATAR: &str = "👤";

impl PersonaProfile {
    /// True when the numeric parameters are inside their documented ranges.
    pub fn parameters_in_range(&self) -> bool {
        (-1.0..=1.0).contains(&self.sentiment_bias)
            && (0.0..=1.0).contains(&self.engagement_level)
            && (0.0..=1.0).contains(&self.controversy_tolerance)
    }
}
