//! Generation seam and persona turn execution for Roundtable.

pub mod gemini;
pub mod generation;
pub mod persona_agent;
pub mod prompt;
pub mod scripted;

pub use gemini::GeminiService;
pub use generation::{GenerationError, GenerationRequest, GenerationService};
pub use persona_agent::{FALLBACK_CONTENT, PersonaAgent};
pub use prompt::{PhaseKind, PromptContext, PromptRenderer};
pub use scripted::ScriptedService;
