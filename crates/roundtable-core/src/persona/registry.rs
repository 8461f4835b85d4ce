//! Read-only persona registry.
//!
//! The registry is the process-wide arena of persona profiles: built once
//! from config (or the presets), wrapped in an `Arc`, and handed to every
//! coordinator. It replaces any notion of a mutable agent cache: sessions
//! share it without locking because nothing writes to it after load.

use super::model::PersonaProfile;
use crate::error::{Result, RoundtableError};
use std::collections::HashMap;

/// Immutable collection of persona profiles keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PersonaRegistry {
    profiles: HashMap<String, PersonaProfile>,
}

impl PersonaRegistry {
    /// Builds a registry from a list of profiles.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error on duplicate ids or on a profile whose
    /// behavioral parameters fall outside their documented ranges.
    pub fn new(profiles: Vec<PersonaProfile>) -> Result<Self> {
        let mut map = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            if !profile.parameters_in_range() {
                return Err(RoundtableError::config(format!(
                    "persona '{}' has behavioral parameters out of range",
                    profile.id
                )));
            }
            if map.insert(profile.id.clone(), profile).is_some() {
                return Err(RoundtableError::config("duplicate persona id in registry"));
            }
        }
        Ok(Self { profiles: map })
    }

    /// Looks up a profile by id.
    pub fn get(&self, id: &str) -> Option<&PersonaProfile> {
        self.profiles.get(id)
    }

    /// Looks up a profile by id, failing with `NotFound` when absent.
    pub fn require(&self, id: &str) -> Result<&PersonaProfile> {
        self.get(id)
            .ok_or_else(|| RoundtableError::not_found("persona", id))
    }

    /// Returns all profiles ordered by id for deterministic listings.
    pub fn all(&self) -> Vec<&PersonaProfile> {
        let mut profiles: Vec<&PersonaProfile> = self.profiles.values().collect();
        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        profiles
    }

    /// Number of registered personas.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when the registry holds no personas.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
