//! Stateless persona turn execution.
//!
//! `PersonaAgent` turns one profile plus one prompt context into one
//! transcript message. It holds no per-persona state: behavior differences
//! between participants come entirely from the profile data, and the same
//! agent serves every persona in every concurrent session.

use std::sync::Arc;

use roundtable_core::persona::PersonaProfile;
use roundtable_core::sentiment::{self, SentimentLabel};
use roundtable_core::session::Message;
use tokio_util::sync::CancellationToken;

use crate::generation::{GenerationError, GenerationRequest, GenerationService};
use crate::prompt::{PromptContext, PromptRenderer};

/// Content of a substituted turn when generation failed after retries.
pub const FALLBACK_CONTENT: &str = "No response available.";

/// Produces persona utterances by rendering a phase prompt, invoking the
/// generation service exactly once, and scoring the result.
pub struct PersonaAgent {
    service: Arc<dyn GenerationService>,
    renderer: PromptRenderer,
}

impl PersonaAgent {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self {
            service,
            renderer: PromptRenderer::new(),
        }
    }

    /// Runs one turn for `profile`.
    ///
    /// On success the returned message is fully formed: fresh id, the
    /// profile's display name and avatar, the context's round number, the
    /// scored sentiment, and a now-timestamp. The caller appends it to the
    /// transcript; this method has no side effects beyond the external call.
    ///
    /// # Errors
    ///
    /// Surfaces the typed `GenerationError` untouched; retry and fallback
    /// policy belong to the orchestrator, not the agent.
    pub async fn respond(
        &self,
        profile: &PersonaProfile,
        ctx: &PromptContext,
        cancel: &CancellationToken,
    ) -> Result<Message, GenerationError> {
        let prompt = self.renderer.render(profile, ctx)?;
        tracing::debug!(
            target: "persona_agent",
            persona = %profile.id,
            round = ctx.round_number,
            "requesting generation"
        );
        let text = self
            .service
            .generate(
                GenerationRequest {
                    prompt,
                    max_sentences_hint: ctx.max_sentences,
                },
                cancel,
            )
            .await?;

        let content = text.trim().to_string();
        let scored = sentiment::score(&content, profile.sentiment_bias);
        Ok(Message {
            id: uuid::Uuid::new_v4().to_string(),
            persona_id: Some(profile.id.clone()),
            persona_name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            content,
            sentiment: scored.label,
            sentiment_score: scored.value,
            round_number: ctx.round_number,
            timestamp: chrono::Utc::now().to_rfc3339(),
            fallback: false,
        })
    }

    /// Builds the clearly-marked substitute message for a turn whose
    /// generation failed after the retry budget.
    ///
    /// Neutral sentiment, templated content, and the `fallback` flag keep
    /// the phase-completeness invariant intact while letting downstream
    /// consumers audit degraded turns.
    pub fn fallback_message(profile: &PersonaProfile, round_number: i32) -> Message {
        Message {
            id: uuid::Uuid::new_v4().to_string(),
            persona_id: Some(profile.id.clone()),
            persona_name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            content: FALLBACK_CONTENT.to_string(),
            sentiment: SentimentLabel::Neutral,
            sentiment_score: 0.0,
            round_number,
            timestamp: chrono::Utc::now().to_rfc3339(),
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PhaseKind;
    use crate::scripted::ScriptedService;
    use roundtable_core::persona::get_default_presets;

    fn profile(id: &str) -> PersonaProfile {
        get_default_presets()
            .into_iter()
            .find(|p| p.id == id)
            .expect("preset exists")
    }

    fn ctx() -> PromptContext {
        PromptContext {
            phase: PhaseKind::InitialReaction,
            round_number: 0,
            topic: "A solar-powered backpack".to_string(),
            goals: vec![],
            window: vec![],
            max_sentences: 4,
        }
    }

    #[tokio::test]
    async fn respond_builds_a_complete_message() {
        let service = Arc::new(ScriptedService::new(vec![
            "  The charging claims look impressive.  ".to_string(),
        ]));
        let agent = PersonaAgent::new(service);
        let persona = profile("tech-enthusiast");
        let cancel = CancellationToken::new();

        let message = agent.respond(&persona, &ctx(), &cancel).await.unwrap();
        assert_eq!(message.persona_id.as_deref(), Some("tech-enthusiast"));
        assert_eq!(message.persona_name, "Riley");
        assert_eq!(message.avatar, "🤖");
        assert_eq!(message.round_number, 0);
        assert_eq!(message.content, "The charging claims look impressive.");
        assert!(!message.fallback);
        assert!(!message.id.is_empty());
        // "impressive" plus the persona's +0.5 bias lands clearly positive.
        assert_eq!(message.sentiment, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn bias_separates_identical_content() {
        let text = "The panel reviewed the announcement today.".to_string();
        let optimist_service = Arc::new(ScriptedService::new(vec![text.clone()]));
        let skeptic_service = Arc::new(ScriptedService::new(vec![text]));
        let cancel = CancellationToken::new();

        let optimist = PersonaAgent::new(optimist_service)
            .respond(&profile("early-adopter"), &ctx(), &cancel)
            .await
            .unwrap();
        let skeptic = PersonaAgent::new(skeptic_service)
            .respond(&profile("skeptical-buyer"), &ctx(), &cancel)
            .await
            .unwrap();
        assert_eq!(optimist.content, skeptic.content);
        assert_ne!(optimist.sentiment, skeptic.sentiment);
    }

    #[tokio::test]
    async fn service_failure_surfaces_untouched() {
        let service =
            Arc::new(ScriptedService::new(vec!["unused".to_string()]).fail_when(vec!["Riley"]));
        let agent = PersonaAgent::new(service);
        let cancel = CancellationToken::new();

        let err = agent
            .respond(&profile("tech-enthusiast"), &ctx(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Service { .. }));
    }

    #[test]
    fn fallback_message_is_neutral_and_flagged() {
        let message = PersonaAgent::fallback_message(&profile("data-analyst"), 2);
        assert!(message.fallback);
        assert_eq!(message.sentiment, SentimentLabel::Neutral);
        assert_eq!(message.sentiment_score, 0.0);
        assert_eq!(message.round_number, 2);
        assert_eq!(message.content, FALLBACK_CONTENT);
    }
}
