//! The round-driving state machine.
//!
//! `RoundOrchestrator` sequences a session through its phases, runs one turn
//! per participant per phase, and owns the transcript. Participant turns
//! within a phase only depend on prior phases, so they run concurrently
//! through the process-wide limiter; appends happen afterwards on the
//! orchestrator task, in the fixed participant order from the spec.

use std::fmt;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use roundtable_core::error::{Result, RoundtableError};
use roundtable_core::persona::{PersonaProfile, PersonaRegistry};
use roundtable_core::session::{
    Message, ROUND_SYNTHESIS, SessionSpec, SessionType, Transcript,
};
use roundtable_interaction::{PersonaAgent, PhaseKind, PromptContext};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Where a session currently stands.
///
/// `Discussion` carries the 1-indexed round; the transcript round number of
/// each phase follows the sortable scheme: initial reaction 0, discussion
/// 1.., synthesis -1 (kept off the transcript).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    InitialReaction,
    Discussion(u32),
    Synthesis,
    Completed,
    Aborted,
}

impl Phase {
    /// True once no further phase can run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Aborted)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "not started"),
            Phase::InitialReaction => write!(f, "initial reaction"),
            Phase::Discussion(round) => write!(f, "discussion round {}", round),
            Phase::Synthesis => write!(f, "synthesis"),
            Phase::Completed => write!(f, "completed"),
            Phase::Aborted => write!(f, "aborted"),
        }
    }
}

/// Per-turn execution policy.
#[derive(Debug, Clone)]
pub struct TurnPolicy {
    /// Additional attempts after the first failed generation call
    pub retries: u32,
    /// How many turns of one phase may be in flight at once
    pub max_in_flight: usize,
}

impl Default for TurnPolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            max_in_flight: 4,
        }
    }
}

/// What one completed phase produced.
///
/// This is the unit an incremental UI renders: the messages appended for the
/// phase (empty for synthesis and aborts), the synthesis summary when the
/// phase produced one, and whether the session has finished.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseOutcome {
    pub phase: Phase,
    pub messages: Vec<Message>,
    pub summary: Option<Message>,
    pub finished: bool,
}

enum TurnResult {
    Completed(Message),
    Cancelled,
}

/// Drives one session's phases in order.
pub struct RoundOrchestrator {
    spec: SessionSpec,
    /// Participant profiles resolved at construction, in speaking order
    participants: Vec<PersonaProfile>,
    agent: Arc<PersonaAgent>,
    limiter: Arc<Semaphore>,
    cancel: CancellationToken,
    policy: TurnPolicy,
    transcript: Transcript,
    phase: Phase,
    summary: Option<Message>,
}

impl RoundOrchestrator {
    /// Validates the spec and resolves participants.
    ///
    /// # Errors
    ///
    /// Fails with `Config`/`NotFound` before any external call when the spec
    /// is invalid (see [`SessionSpec::validate`]).
    pub fn new(
        spec: SessionSpec,
        registry: &PersonaRegistry,
        agent: Arc<PersonaAgent>,
        limiter: Arc<Semaphore>,
        cancel: CancellationToken,
        policy: TurnPolicy,
    ) -> Result<Self> {
        spec.validate(registry)?;
        let participants = spec
            .participant_ids
            .iter()
            .map(|id| registry.require(id).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            spec,
            participants,
            agent,
            limiter,
            cancel,
            policy,
            transcript: Transcript::new(),
            phase: Phase::NotStarted,
            summary: None,
        })
    }

    pub fn spec(&self) -> &SessionSpec {
        &self.spec
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The synthesis summary, once that phase has run.
    pub fn summary(&self) -> Option<&Message> {
        self.summary.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Marks the session aborted; no further phases will run.
    pub fn abort(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = Phase::Aborted;
        }
    }

    /// The phase `advance` would run next, `None` when nothing remains.
    fn next_runnable(&self) -> Option<Phase> {
        match self.phase {
            Phase::NotStarted => Some(Phase::InitialReaction),
            Phase::InitialReaction => {
                if self.spec.round_count >= 1 {
                    Some(Phase::Discussion(1))
                } else {
                    None
                }
            }
            Phase::Discussion(round) if round < self.spec.round_count => {
                Some(Phase::Discussion(round + 1))
            }
            Phase::Discussion(_) => match self.spec.session_type {
                SessionType::FocusGroup => Some(Phase::Synthesis),
                SessionType::Interview => None,
            },
            Phase::Synthesis | Phase::Completed | Phase::Aborted => None,
        }
    }

    /// Runs the next phase to completion and returns what it produced.
    ///
    /// Every participant contributes exactly one message per speaking phase:
    /// a turn whose generation fails after the retry budget is substituted
    /// with a fallback message rather than dropped. Cancellation observed
    /// during a phase discards that phase's partial output entirely and
    /// transitions to `Aborted`; the transcript never holds a partially
    /// spoken phase.
    ///
    /// # Errors
    ///
    /// Returns an `Internal` error when called on a finished session, and
    /// propagates `OrderViolation` should an append ever regress (a driver
    /// bug, not a runtime condition).
    pub async fn advance(&mut self) -> Result<PhaseOutcome> {
        if self.phase.is_terminal() {
            return Err(RoundtableError::internal("session already finished"));
        }
        if self.cancel.is_cancelled() {
            self.phase = Phase::Aborted;
            return Ok(self.aborted_outcome());
        }
        let target = self
            .next_runnable()
            .ok_or_else(|| RoundtableError::internal("no runnable phase left"))?;

        tracing::info!(
            target: "orchestrator",
            session = %self.spec.session_id,
            phase = %target,
            "running phase"
        );

        match target {
            Phase::InitialReaction => {
                self.run_speaking_phase(target, PhaseKind::InitialReaction, 0)
                    .await
            }
            Phase::Discussion(round) => {
                self.run_speaking_phase(target, PhaseKind::Discussion, round as i32)
                    .await
            }
            Phase::Synthesis => self.run_synthesis().await,
            _ => Err(RoundtableError::internal("unexpected phase transition")),
        }
    }

    async fn run_speaking_phase(
        &mut self,
        target: Phase,
        kind: PhaseKind,
        round_number: i32,
    ) -> Result<PhaseOutcome> {
        // Discussion prompts see the whole previous round; round 1 sees the
        // initial reactions. The initial reaction sees nothing.
        let window: Vec<Message> = match kind {
            PhaseKind::InitialReaction => Vec::new(),
            _ => self
                .transcript
                .round(round_number - 1)
                .into_iter()
                .cloned()
                .collect(),
        };
        let base_ctx = PromptContext {
            phase: kind,
            round_number,
            topic: self.spec.topic.clone(),
            goals: self.spec.goals.clone(),
            window,
            max_sentences: kind.default_max_sentences(),
        };

        let turns: Vec<_> = self
            .participants
            .iter()
            .map(|profile| {
                run_turn(
                    self.agent.clone(),
                    profile.clone(),
                    base_ctx.clone(),
                    self.limiter.clone(),
                    self.cancel.clone(),
                    self.policy.retries,
                )
            })
            .collect();
        // `buffered` keeps output in participant order no matter how the
        // concurrent calls interleave.
        let results: Vec<TurnResult> = stream::iter(turns)
            .buffered(self.policy.max_in_flight.max(1))
            .collect()
            .await;

        if results
            .iter()
            .any(|r| matches!(r, TurnResult::Cancelled))
        {
            self.phase = Phase::Aborted;
            return Ok(self.aborted_outcome());
        }

        let mut messages = Vec::with_capacity(results.len());
        for result in results {
            if let TurnResult::Completed(message) = result {
                self.transcript.append(message.clone())?;
                messages.push(message);
            }
        }

        self.phase = target;
        let finished = self.next_runnable().is_none();
        if finished {
            self.phase = Phase::Completed;
        }
        Ok(PhaseOutcome {
            phase: target,
            messages,
            summary: None,
            finished,
        })
    }

    /// One closing call over the full transcript, voiced by the first
    /// participant. The summary rides on the outcome and the session result
    /// with round -1; it is never appended to the transcript.
    async fn run_synthesis(&mut self) -> Result<PhaseOutcome> {
        let summarizer = self.participants[0].clone();
        let ctx = PromptContext {
            phase: PhaseKind::Synthesis,
            round_number: ROUND_SYNTHESIS,
            topic: self.spec.topic.clone(),
            goals: self.spec.goals.clone(),
            window: self.transcript.messages().to_vec(),
            max_sentences: PhaseKind::Synthesis.default_max_sentences(),
        };
        let result = run_turn(
            self.agent.clone(),
            summarizer,
            ctx,
            self.limiter.clone(),
            self.cancel.clone(),
            self.policy.retries,
        )
        .await;

        match result {
            TurnResult::Cancelled => {
                self.phase = Phase::Aborted;
                Ok(self.aborted_outcome())
            }
            TurnResult::Completed(message) => {
                self.summary = Some(message.clone());
                self.phase = Phase::Completed;
                Ok(PhaseOutcome {
                    phase: Phase::Synthesis,
                    messages: Vec::new(),
                    summary: Some(message),
                    finished: true,
                })
            }
        }
    }

    fn aborted_outcome(&self) -> PhaseOutcome {
        PhaseOutcome {
            phase: Phase::Aborted,
            messages: Vec::new(),
            summary: None,
            finished: true,
        }
    }
}

/// Runs one participant turn with retries, falling back to a substitute
/// message so the phase-completeness invariant always holds.
async fn run_turn(
    agent: Arc<PersonaAgent>,
    profile: PersonaProfile,
    ctx: PromptContext,
    limiter: Arc<Semaphore>,
    cancel: CancellationToken,
    retries: u32,
) -> TurnResult {
    for attempt in 0..=retries {
        // The permit bounds in-flight generation calls process-wide; waiting
        // here queues excess turns instead of dropping them.
        let permit = match limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => return TurnResult::Cancelled,
        };
        let result = agent.respond(&profile, &ctx, &cancel).await;
        drop(permit);
        match result {
            Ok(message) => return TurnResult::Completed(message),
            Err(err) if err.is_cancelled() => return TurnResult::Cancelled,
            Err(err) => {
                tracing::warn!(
                    target: "orchestrator",
                    persona = %profile.id,
                    attempt,
                    error = %err,
                    "turn generation failed"
                );
                if !err.is_retryable() {
                    break;
                }
            }
        }
    }
    tracing::warn!(
        target: "orchestrator",
        persona = %profile.id,
        "substituting fallback message after exhausted retries"
    );
    TurnResult::Completed(PersonaAgent::fallback_message(&profile, ctx.round_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_core::persona::get_default_presets;
    use roundtable_interaction::ScriptedService;

    fn registry() -> PersonaRegistry {
        PersonaRegistry::new(get_default_presets()).unwrap()
    }

    fn spec(session_type: SessionType, participants: &[&str], rounds: u32) -> SessionSpec {
        SessionSpec {
            session_id: uuid::Uuid::new_v4().to_string(),
            topic: "A solar-powered backpack".to_string(),
            goals: vec!["Gauge purchase intent".to_string()],
            participant_ids: participants.iter().map(|s| s.to_string()).collect(),
            round_count: rounds,
            session_type,
        }
    }

    fn orchestrator(
        spec: SessionSpec,
        service: Arc<ScriptedService>,
    ) -> RoundOrchestrator {
        RoundOrchestrator::new(
            spec,
            &registry(),
            Arc::new(PersonaAgent::new(service)),
            Arc::new(Semaphore::new(4)),
            CancellationToken::new(),
            TurnPolicy::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn focus_group_walks_every_phase_in_order() {
        let spec = spec(
            SessionType::FocusGroup,
            &["tech-enthusiast", "skeptical-buyer", "data-analyst"],
            3,
        );
        let mut orchestrator =
            orchestrator(spec, Arc::new(ScriptedService::demo_panel()));

        let initial = orchestrator.advance().await.unwrap();
        assert_eq!(initial.phase, Phase::InitialReaction);
        assert_eq!(initial.messages.len(), 3);
        assert!(!initial.finished);

        for round in 1..=3 {
            let outcome = orchestrator.advance().await.unwrap();
            assert_eq!(outcome.phase, Phase::Discussion(round));
            assert_eq!(outcome.messages.len(), 3);
            assert!(!outcome.finished);
        }

        let synthesis = orchestrator.advance().await.unwrap();
        assert_eq!(synthesis.phase, Phase::Synthesis);
        assert!(synthesis.messages.is_empty());
        assert!(synthesis.finished);
        let summary = synthesis.summary.expect("synthesis summary");
        assert_eq!(summary.round_number, ROUND_SYNTHESIS);

        // Transcript: 3 initial + 3 rounds of 3; the summary stays off it.
        assert_eq!(orchestrator.transcript().len(), 12);
        let rounds: Vec<i32> = orchestrator
            .transcript()
            .messages()
            .iter()
            .map(|m| m.round_number)
            .collect();
        assert_eq!(rounds, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]);

        // Speaking order matches the spec order in every phase.
        for round in 0..=3 {
            let speakers: Vec<&str> = orchestrator
                .transcript()
                .round(round)
                .iter()
                .map(|m| m.persona_id.as_deref().unwrap())
                .collect();
            assert_eq!(
                speakers,
                vec!["tech-enthusiast", "skeptical-buyer", "data-analyst"]
            );
        }
        assert_eq!(orchestrator.phase(), Phase::Completed);
    }

    #[tokio::test]
    async fn persistent_failure_becomes_a_fallback_message() {
        let spec = spec(
            SessionType::FocusGroup,
            &["tech-enthusiast", "skeptical-buyer", "data-analyst"],
            3,
        );
        // skeptical-buyer ("Casey") fails every attempt during round 2 only;
        // "You are Casey" only occurs in Casey's own prompts, never in the
        // windows quoting Casey to the others.
        let service = Arc::new(
            ScriptedService::demo_panel().fail_when(vec!["discussion round 2", "You are Casey"]),
        );
        let mut orchestrator = orchestrator(spec, service);
        while !orchestrator.is_finished() {
            orchestrator.advance().await.unwrap();
        }

        assert_eq!(orchestrator.phase(), Phase::Completed);
        let round_two = orchestrator.transcript().round(2);
        assert_eq!(round_two.len(), 3);
        let fallbacks: Vec<_> = round_two.iter().filter(|m| m.fallback).collect();
        assert_eq!(fallbacks.len(), 1);
        assert_eq!(fallbacks[0].persona_id.as_deref(), Some("skeptical-buyer"));
        assert_eq!(fallbacks[0].sentiment_score, 0.0);
        // Every other round is unaffected.
        for round in [0, 1, 3] {
            assert!(orchestrator.transcript().round(round).iter().all(|m| !m.fallback));
        }
    }

    #[tokio::test]
    async fn interview_with_zero_rounds_produces_one_message() {
        let spec = spec(SessionType::Interview, &["data-analyst"], 0);
        let mut orchestrator =
            orchestrator(spec, Arc::new(ScriptedService::demo_panel()));
        let outcome = orchestrator.advance().await.unwrap();
        assert_eq!(outcome.phase, Phase::InitialReaction);
        assert_eq!(outcome.messages.len(), 1);
        assert!(outcome.finished);
        assert_eq!(orchestrator.phase(), Phase::Completed);
        assert_eq!(orchestrator.transcript().len(), 1);
        assert!(orchestrator.summary().is_none());
    }

    #[tokio::test]
    async fn interview_skips_synthesis_after_rounds() {
        let spec = spec(SessionType::Interview, &["data-analyst"], 2);
        let mut orchestrator =
            orchestrator(spec, Arc::new(ScriptedService::demo_panel()));
        orchestrator.advance().await.unwrap();
        orchestrator.advance().await.unwrap();
        let last = orchestrator.advance().await.unwrap();
        assert_eq!(last.phase, Phase::Discussion(2));
        assert!(last.finished);
        assert!(orchestrator.summary().is_none());
    }

    #[tokio::test]
    async fn cancellation_discards_the_partial_phase() {
        let spec = spec(
            SessionType::FocusGroup,
            &["tech-enthusiast", "skeptical-buyer"],
            3,
        );
        let cancel = CancellationToken::new();
        let mut orchestrator = RoundOrchestrator::new(
            spec,
            &registry(),
            Arc::new(PersonaAgent::new(Arc::new(ScriptedService::demo_panel()))),
            Arc::new(Semaphore::new(4)),
            cancel.clone(),
            TurnPolicy::default(),
        )
        .unwrap();

        orchestrator.advance().await.unwrap();
        cancel.cancel();
        let outcome = orchestrator.advance().await.unwrap();
        assert_eq!(outcome.phase, Phase::Aborted);
        assert!(outcome.finished);
        // Only the completed initial phase remains.
        assert_eq!(orchestrator.transcript().len(), 2);
        assert_eq!(orchestrator.transcript().last_round(), Some(0));

        let err = orchestrator.advance().await.unwrap_err();
        assert!(matches!(err, RoundtableError::Internal(_)));
    }

    #[tokio::test]
    async fn invalid_spec_fails_before_any_generation_call() {
        let service = Arc::new(ScriptedService::demo_panel());
        let bad_spec = spec(SessionType::FocusGroup, &["tech-enthusiast"], 3);
        let result = RoundOrchestrator::new(
            bad_spec,
            &registry(),
            Arc::new(PersonaAgent::new(service.clone())),
            Arc::new(Semaphore::new(4)),
            CancellationToken::new(),
            TurnPolicy::default(),
        );
        assert!(result.is_err());
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn single_permit_serializes_turns_without_deadlock() {
        let spec = spec(
            SessionType::FocusGroup,
            &["tech-enthusiast", "skeptical-buyer", "data-analyst"],
            1,
        );
        let mut orchestrator = RoundOrchestrator::new(
            spec,
            &registry(),
            Arc::new(PersonaAgent::new(Arc::new(ScriptedService::demo_panel()))),
            Arc::new(Semaphore::new(1)),
            CancellationToken::new(),
            TurnPolicy {
                retries: 1,
                max_in_flight: 1,
            },
        )
        .unwrap();
        while !orchestrator.is_finished() {
            orchestrator.advance().await.unwrap();
        }
        assert_eq!(orchestrator.transcript().len(), 6);
    }
}
