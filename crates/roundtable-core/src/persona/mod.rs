//! Persona profiles, presets, and the process-wide registry.

pub mod model;
pub mod preset;
pub mod registry;

pub use model::{DEFAULT_AVATAR, PersonaProfile};
pub use preset::get_default_presets;
pub use registry::PersonaRegistry;
