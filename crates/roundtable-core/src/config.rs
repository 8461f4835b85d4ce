//! TOML configuration shapes for persona definitions.
//!
//! The engine never writes configuration back; callers load a file once at
//! process start and build a [`PersonaRegistry`](crate::persona::PersonaRegistry)
//! from the result.

use crate::error::Result;
use crate::persona::model::{DEFAULT_AVATAR, PersonaProfile, default_behavioral_level};
use serde::{Deserialize, Serialize};

/// Root of a persona configuration file.
///
/// ```toml
/// [[persona]]
/// id = "night-shift-nurse"
/// name = "Robin"
/// role = "Night-Shift Nurse"
/// goal = "Judge whether this fits a 12-hour shift."
/// backstory = "Works nights in a regional hospital."
/// communication_style = "Short, practical sentences."
/// sentiment_bias = -0.2
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ConfigRoot {
    #[serde(rename = "persona", default)]
    pub personas: Vec<PersonaConfig>,
}

/// One `[[persona]]` table.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PersonaConfig {
    pub id: String,
    pub name: String,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub communication_style: String,
    #[serde(default)]
    pub expertise_areas: Vec<String>,
    #[serde(default)]
    pub sentiment_bias: f64,
    #[serde(default = "default_behavioral_level")]
    pub engagement_level: f64,
    #[serde(default = "default_behavioral_level")]
    pub controversy_tolerance: f64,
}

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

impl From<PersonaConfig> for PersonaProfile {
    fn from(config: PersonaConfig) -> Self {
        PersonaProfile {
            id: config.id,
            name: config.name,
            avatar: config.avatar,
            role: config.role,
            goal: config.goal,
            backstory: config.backstory,
            communication_style: config.communication_style,
            expertise_areas: config.expertise_areas,
            sentiment_bias: config.sentiment_bias,
            engagement_level: config.engagement_level,
            controversy_tolerance: config.controversy_tolerance,
        }
    }
}

/// Parses a persona configuration document into profiles.
pub fn parse_personas(toml_text: &str) -> Result<Vec<PersonaProfile>> {
    let root: ConfigRoot = toml::from_str(toml_text)?;
    Ok(root.personas.into_iter().map(PersonaProfile::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_personas_with_defaults() {
        let text = r#"
            [[persona]]
            id = "night-shift-nurse"
            name = "Robin"
            role = "Night-Shift Nurse"
            goal = "Judge whether this fits a 12-hour shift."
            backstory = "Works nights in a regional hospital."
            communication_style = "Short, practical sentences."

            [[persona]]
            id = "retired-teacher"
            name = "Lee"
            avatar = "📚"
            role = "Retired Teacher"
            goal = "See whether this is usable without a manual."
            backstory = "Taught secondary school for thirty years."
            communication_style = "Patient and story-driven."
            expertise_areas = ["education"]
            sentiment_bias = 0.2
            engagement_level = 0.9
        "#;
        let profiles = parse_personas(text).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].avatar, DEFAULT_AVATAR);
        assert_eq!(profiles[0].sentiment_bias, 0.0);
        assert_eq!(profiles[0].engagement_level, 0.5);
        assert_eq!(profiles[1].avatar, "📚");
        assert_eq!(profiles[1].engagement_level, 0.9);
        assert_eq!(profiles[1].expertise_areas, vec!["education".to_string()]);
    }

    #[test]
    fn empty_document_parses_to_no_personas() {
        assert!(parse_personas("").unwrap().is_empty());
    }

    #[test]
    fn malformed_document_is_a_serialization_error() {
        let err = parse_personas("[[persona]]\nid = 3").unwrap_err();
        assert!(matches!(
            err,
            crate::error::RoundtableError::Serialization { .. }
        ));
    }
}
