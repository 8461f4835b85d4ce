use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use roundtable_application::SessionCoordinator;
use roundtable_core::persona::PersonaRegistry;
use roundtable_core::session::{
    MAX_FOCUS_GROUP_PARTICIPANTS, SessionResult, SessionSpec, SessionType,
};
use roundtable_interaction::{GeminiService, GenerationService, ScriptedService};

#[derive(Args)]
pub struct RunArgs {
    /// Topic or campaign description put before the panel
    #[arg(long)]
    topic: String,

    /// Comma-separated persona ids; defaults to the whole configured panel
    #[arg(long, value_delimiter = ',')]
    participants: Vec<String>,

    /// Discussion rounds after the initial reaction
    #[arg(long, default_value_t = 3)]
    rounds: u32,

    /// Session kind: focus-group or interview
    #[arg(long, default_value = "focus-group")]
    session_type: String,

    /// A session goal; repeat the flag for several
    #[arg(long = "goal")]
    goals: Vec<String>,

    /// Generation backend: scripted (offline) or gemini
    #[arg(long, default_value = "scripted")]
    backend: String,

    /// Print the full session result as JSON instead of a readable log
    #[arg(long)]
    json: bool,
}

pub async fn execute(config: Option<PathBuf>, args: RunArgs) -> Result<()> {
    let profiles = super::load_profiles(config)?;
    let registry = Arc::new(PersonaRegistry::new(profiles)?);

    let session_type: SessionType = args
        .session_type
        .parse()
        .map_err(|_| anyhow!("unknown session type '{}'", args.session_type))?;

    let participant_ids = if args.participants.is_empty() {
        default_participants(&registry, session_type)?
    } else {
        args.participants
    };

    let service: Arc<dyn GenerationService> = match args.backend.as_str() {
        "scripted" => Arc::new(ScriptedService::demo_panel()),
        "gemini" => {
            let api_key =
                std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;
            Arc::new(GeminiService::new(api_key))
        }
        other => return Err(anyhow!("unknown backend '{}'", other)),
    };

    let spec = SessionSpec {
        session_id: uuid::Uuid::new_v4().to_string(),
        topic: args.topic,
        goals: args.goals,
        participant_ids,
        round_count: args.rounds,
        session_type,
    };

    let coordinator = SessionCoordinator::new(registry, service);
    let result = coordinator.run(spec).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_readable(&result);
    }
    Ok(())
}

fn default_participants(
    registry: &PersonaRegistry,
    session_type: SessionType,
) -> Result<Vec<String>> {
    let all = registry.all();
    match session_type {
        SessionType::Interview => {
            let first = all.first().context("no personas configured")?;
            Ok(vec![first.id.clone()])
        }
        SessionType::FocusGroup => Ok(all
            .iter()
            .take(MAX_FOCUS_GROUP_PARTICIPANTS)
            .map(|p| p.id.clone())
            .collect()),
    }
}

fn print_readable(result: &SessionResult) {
    for message in result.transcript.messages() {
        let marker = if message.fallback { " [fallback]" } else { "" };
        println!(
            "[round {}] {} {} ({}, {:+.2}){}",
            message.round_number,
            message.avatar,
            message.persona_name,
            message.sentiment,
            message.sentiment_score,
            marker
        );
        println!("    {}", message.content);
    }

    if let Some(summary) = &result.summary {
        println!("\n-- Summary ({}) --", summary.persona_name);
        println!("{}", summary.content);
    }

    let metrics = &result.metrics;
    println!("\n-- Metrics --");
    println!(
        "sentiment: {} positive / {} neutral / {} negative (mean {:+.2})",
        metrics.distribution.positive,
        metrics.distribution.neutral,
        metrics.distribution.negative,
        metrics.average_sentiment
    );
    println!(
        "NPS estimate: {:.1} / 10, CSAT estimate: {:.1} / 5",
        metrics.nps_estimate, metrics.csat_estimate
    );
    for interval in &metrics.sentiment_intervals {
        println!(
            "round {}: mean sentiment {:+.2}",
            interval.round_number, interval.average_sentiment
        );
    }
    for insight in &metrics.insights {
        println!("insight: {}", insight);
    }
    for recommendation in &metrics.recommendations {
        println!("recommendation: {}", recommendation);
    }
    println!(
        "\nsession {} in {:.1}s",
        result.status, result.duration_seconds
    );
}
