//! Session analytics computed from a transcript.
//!
//! Aggregation is a pure function of the transcript: calling it twice on the
//! same transcript yields identical output, and it works on partial
//! transcripts so a session ended early still produces a full metrics
//! object. Only messages carrying a `persona_id` count; moderator and user
//! rows are excluded.

use crate::sentiment::SentimentLabel;
use crate::session::{Message, Transcript};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// NPS reported for an empty transcript (the scale midpoint).
pub const NEUTRAL_NPS: f64 = 5.0;

/// CSAT reported for an empty transcript (the scale midpoint).
pub const NEUTRAL_CSAT: f64 = 3.0;

/// Counts and fractions of sentiment labels over persona messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub positive_fraction: f64,
    pub neutral_fraction: f64,
    pub negative_fraction: f64,
}

/// Sentiment aggregated over one completed round.
///
/// One entry per round present in the transcript, in round order: the
/// series a "sentiment over time" chart plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentInterval {
    pub round_number: i32,
    pub average_sentiment: f64,
    /// Mean sentiment per persona id within the round
    pub per_persona: BTreeMap<String, f64>,
}

/// Session-level analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub distribution: SentimentDistribution,
    pub average_sentiment: f64,
    /// 0..=10, a linear display heuristic over `average_sentiment`
    pub nps_estimate: f64,
    /// 1..=5, a linear display heuristic over `average_sentiment`
    pub csat_estimate: f64,
    pub sentiment_intervals: Vec<SentimentInterval>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Maps mean sentiment in [-1, 1] onto the 0..=10 NPS scale.
///
/// The coefficients are a display heuristic carried over from the reference
/// dashboards; the properties that matter are monotonicity and the bounds.
fn nps_estimate(average_sentiment: f64) -> f64 {
    (5.0 + 3.0 * average_sentiment).clamp(0.0, 10.0)
}

/// Maps mean sentiment in [-1, 1] onto the 1..=5 CSAT scale.
fn csat_estimate(average_sentiment: f64) -> f64 {
    (3.0 + 2.0 * average_sentiment).clamp(1.0, 5.0)
}

struct PersonaStat {
    id: String,
    name: String,
    total: f64,
    count: usize,
}

impl PersonaStat {
    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Computes session analytics over the transcript.
pub fn aggregate(transcript: &Transcript) -> SessionMetrics {
    let scored: Vec<&Message> = transcript
        .messages()
        .iter()
        .filter(|m| m.persona_id.is_some())
        .collect();

    if scored.is_empty() {
        return SessionMetrics {
            distribution: SentimentDistribution::default(),
            average_sentiment: 0.0,
            nps_estimate: NEUTRAL_NPS,
            csat_estimate: NEUTRAL_CSAT,
            sentiment_intervals: Vec::new(),
            insights: Vec::new(),
            recommendations: Vec::new(),
        };
    }

    let mut distribution = SentimentDistribution::default();
    let mut total = 0.0;
    for message in &scored {
        match message.sentiment {
            SentimentLabel::Positive => distribution.positive += 1,
            SentimentLabel::Neutral => distribution.neutral += 1,
            SentimentLabel::Negative => distribution.negative += 1,
        }
        total += message.sentiment_score;
    }
    let count = scored.len() as f64;
    distribution.positive_fraction = distribution.positive as f64 / count;
    distribution.neutral_fraction = distribution.neutral as f64 / count;
    distribution.negative_fraction = distribution.negative as f64 / count;
    let average_sentiment = total / count;

    let per_persona = persona_stats(&scored);
    let intervals = sentiment_intervals(&scored);
    let fallback_turns = scored.iter().filter(|m| m.fallback).count();
    let (insights, recommendations) = derive_insights(
        &distribution,
        scored.len(),
        average_sentiment,
        &per_persona,
        fallback_turns,
    );

    SessionMetrics {
        distribution,
        average_sentiment,
        nps_estimate: nps_estimate(average_sentiment),
        csat_estimate: csat_estimate(average_sentiment),
        sentiment_intervals: intervals,
        insights,
        recommendations,
    }
}

/// Per-persona totals in first-appearance order (stable across reruns).
fn persona_stats(scored: &[&Message]) -> Vec<PersonaStat> {
    let mut stats: Vec<PersonaStat> = Vec::new();
    for message in scored {
        let id = message.persona_id.as_deref().unwrap_or_default();
        match stats.iter_mut().find(|s| s.id == id) {
            Some(stat) => {
                stat.total += message.sentiment_score;
                stat.count += 1;
            }
            None => stats.push(PersonaStat {
                id: id.to_string(),
                name: message.persona_name.clone(),
                total: message.sentiment_score,
                count: 1,
            }),
        }
    }
    stats
}

fn sentiment_intervals(scored: &[&Message]) -> Vec<SentimentInterval> {
    let mut rounds: Vec<i32> = scored.iter().map(|m| m.round_number).collect();
    rounds.sort_unstable();
    rounds.dedup();

    rounds
        .into_iter()
        .map(|round| {
            let in_round: Vec<&&Message> =
                scored.iter().filter(|m| m.round_number == round).collect();
            let total: f64 = in_round.iter().map(|m| m.sentiment_score).sum();
            let mut per_persona: BTreeMap<String, Vec<f64>> = BTreeMap::new();
            for message in &in_round {
                if let Some(id) = message.persona_id.as_deref() {
                    per_persona
                        .entry(id.to_string())
                        .or_default()
                        .push(message.sentiment_score);
                }
            }
            SentimentInterval {
                round_number: round,
                average_sentiment: total / in_round.len() as f64,
                per_persona: per_persona
                    .into_iter()
                    .map(|(id, values)| {
                        let mean = values.iter().sum::<f64>() / values.len() as f64;
                        (id, mean)
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Deterministic qualitative readout; never depends on an external call.
fn derive_insights(
    distribution: &SentimentDistribution,
    message_count: usize,
    average_sentiment: f64,
    per_persona: &[PersonaStat],
    fallback_turns: usize,
) -> (Vec<String>, Vec<String>) {
    let mut insights = Vec::new();
    let mut recommendations = Vec::new();

    insights.push(format!(
        "{} of {} responses were positive, {} negative.",
        distribution.positive, message_count, distribution.negative
    ));

    let mut by_mean: Vec<&PersonaStat> = per_persona.iter().collect();
    by_mean.sort_by(|a, b| a.mean().partial_cmp(&b.mean()).unwrap_or(Ordering::Equal));

    let detractors: Vec<&&PersonaStat> =
        by_mean.iter().filter(|s| s.mean() < 0.0).take(3).collect();
    if !detractors.is_empty() {
        let names: Vec<String> = detractors
            .iter()
            .map(|s| format!("{} ({:+.2})", s.name, s.mean()))
            .collect();
        insights.push(format!("Most critical voices: {}.", names.join(", ")));
        let plain: Vec<&str> = detractors.iter().map(|s| s.name.as_str()).collect();
        recommendations.push(format!(
            "Follow up individually with {} to understand their objections.",
            plain.join(", ")
        ));
    }

    let promoters: Vec<&&PersonaStat> = by_mean
        .iter()
        .rev()
        .filter(|s| s.mean() > 0.0)
        .take(3)
        .collect();
    if !promoters.is_empty() {
        let names: Vec<String> = promoters
            .iter()
            .map(|s| format!("{} ({:+.2})", s.name, s.mean()))
            .collect();
        insights.push(format!("Strongest supporters: {}.", names.join(", ")));
    }

    if fallback_turns > 0 {
        insights.push(format!(
            "{} turn(s) used a fallback response after generation failed; treat their sentiment as neutral filler.",
            fallback_turns
        ));
    }

    if average_sentiment < -0.15 {
        recommendations
            .push("Overall reception is negative; revisit the concept before wider testing.".to_string());
    } else if average_sentiment > 0.15 {
        recommendations
            .push("Overall reception is positive; consider testing with a broader panel.".to_string());
    } else {
        recommendations
            .push("Sentiment is mixed; probe the specific objections in a follow-up session.".to_string());
    }

    (insights, recommendations)
}
