//! Phase prompt templates.
//!
//! One template per phase kind, rendered with the persona's profile woven
//! into a behavioral preamble. Expected response length is stated in the
//! prompt as a soft instruction; nothing truncates the output.

use minijinja::{Environment, context};
use roundtable_core::persona::PersonaProfile;
use roundtable_core::session::Message;
use serde::Serialize;

use crate::generation::GenerationError;

/// Which phase a prompt is being built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    InitialReaction,
    Discussion,
    Synthesis,
}

impl PhaseKind {
    fn template_name(self) -> &'static str {
        match self {
            PhaseKind::InitialReaction => "initial_reaction",
            PhaseKind::Discussion => "discussion_round",
            PhaseKind::Synthesis => "synthesis",
        }
    }

    /// Default response-length guidance, in sentences.
    pub fn default_max_sentences(self) -> u32 {
        match self {
            PhaseKind::InitialReaction => 4,
            PhaseKind::Discussion => 3,
            PhaseKind::Synthesis => 8,
        }
    }
}

/// Everything a persona needs to produce one utterance.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub phase: PhaseKind,
    /// Round the produced message will carry (0 initial, 1.. discussion, -1 synthesis)
    pub round_number: i32,
    pub topic: String,
    pub goals: Vec<String>,
    /// Prior messages the persona may react to, already windowed by the caller
    pub window: Vec<Message>,
    pub max_sentences: u32,
}

const INITIAL_REACTION_TEMPLATE: &str = "\
You are {{ name }}, {{ role }}.
{{ persona_block }}

The moderator presents the following concept:
{{ topic }}
{% if goals %}
The session is trying to learn:
{% for goal in goals %}- {{ goal }}
{% endfor %}{% endif %}
Give your first reaction to the concept, staying in character. Keep it to at \
most {{ max_sentences }} sentences.";

const DISCUSSION_TEMPLATE: &str = "\
You are {{ name }}, {{ role }}.
{{ persona_block }}

This is discussion round {{ round_number }} on:
{{ topic }}

What the group said in the previous round:
{% for entry in window %}{{ entry.speaker }}: {{ entry.content }}
{% endfor %}
React to the other participants: agree, push back, or build on their points, \
staying in character. Keep it to at most {{ max_sentences }} sentences.";

const SYNTHESIS_TEMPLATE: &str = "\
You are {{ name }}, {{ role }}, closing the session as its summarizer.

The session discussed:
{{ topic }}
{% if goals %}
The session set out to learn:
{% for goal in goals %}- {{ goal }}
{% endfor %}{% endif %}
Full transcript:
{% for entry in window %}[round {{ entry.round }}] {{ entry.speaker }}: {{ entry.content }}
{% endfor %}
Summarize the group's overall reception, the main points of agreement and \
disagreement, and what the group would recommend. Keep it to at most \
{{ max_sentences }} sentences.";

#[derive(Serialize)]
struct WindowEntry {
    speaker: String,
    content: String,
    round: i32,
}

/// Renders phase prompts from the embedded templates.
pub struct PromptRenderer {
    env: Environment<'static>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("initial_reaction", INITIAL_REACTION_TEMPLATE)
            .expect("initial reaction template parses");
        env.add_template("discussion_round", DISCUSSION_TEMPLATE)
            .expect("discussion template parses");
        env.add_template("synthesis", SYNTHESIS_TEMPLATE)
            .expect("synthesis template parses");
        Self { env }
    }

    /// Renders the prompt for `profile` in the given context.
    pub fn render(
        &self,
        profile: &PersonaProfile,
        ctx: &PromptContext,
    ) -> Result<String, GenerationError> {
        let window: Vec<WindowEntry> = ctx
            .window
            .iter()
            .map(|m| WindowEntry {
                speaker: m.persona_name.clone(),
                content: m.content.clone(),
                round: m.round_number,
            })
            .collect();

        let template = self
            .env
            .get_template(ctx.phase.template_name())
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;
        template
            .render(context! {
                name => profile.name.clone(),
                role => profile.role.clone(),
                persona_block => persona_block(profile),
                topic => ctx.topic.clone(),
                goals => ctx.goals.clone(),
                round_number => ctx.round_number,
                window => window,
                max_sentences => ctx.max_sentences,
            })
            .map_err(|e| GenerationError::Prompt(e.to_string()))
    }
}

/// Turns the profile's free text and behavioral parameters into prompt prose.
///
/// Thresholds mirror the reference phrasing: parameters only speak up once
/// they leave the middle band, so a default profile adds no noise.
fn persona_block(profile: &PersonaProfile) -> String {
    let mut lines = vec![profile.backstory.clone()];
    if !profile.communication_style.is_empty() {
        lines.push(format!(
            "Communication style: {}",
            profile.communication_style
        ));
    }
    if !profile.expertise_areas.is_empty() {
        lines.push(format!(
            "You speak with authority on: {}.",
            profile.expertise_areas.join(", ")
        ));
    }
    lines.push(format!("Your goal in this session: {}", profile.goal));

    if profile.sentiment_bias > 0.3 {
        lines.push("You tend to be optimistic and positive in your responses.".to_string());
    } else if profile.sentiment_bias < -0.3 {
        lines.push("You tend to be more critical and skeptical in your responses.".to_string());
    }

    if profile.engagement_level > 0.7 {
        lines.push(
            "You are highly engaged in discussions; feel free to elaborate and share detailed thoughts."
                .to_string(),
        );
    } else if profile.engagement_level < 0.3 {
        lines.push(
            "You are more reserved in your participation; keep your response concise and to the point."
                .to_string(),
        );
    }

    if profile.controversy_tolerance > 0.7 {
        lines.push("You are comfortable with controversial topics and open debate.".to_string());
    } else if profile.controversy_tolerance < 0.3 {
        lines.push("You prefer to avoid controversial topics when possible.".to_string());
    }

    lines.join("\n")
}
