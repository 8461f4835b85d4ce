//! Top-level session façade.
//!
//! `SessionCoordinator` owns the read-only persona registry, the generation
//! backend, and the process-wide concurrency limiter, and exposes both a
//! fire-and-forget `run` and the resumable `start_session` / `advance` /
//! `end_session` surface an incremental UI drives phase by phase. Sessions
//! are independent; nothing is shared between them besides the registry and
//! the limiter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use roundtable_core::error::{Result, RoundtableError};
use roundtable_core::metrics;
use roundtable_core::persona::PersonaRegistry;
use roundtable_core::session::{SessionResult, SessionSpec, SessionStatus};
use roundtable_interaction::{GenerationService, PersonaAgent};
use tokio::sync::{Mutex, RwLock, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::orchestrator::{Phase, PhaseOutcome, RoundOrchestrator, TurnPolicy};

/// Tunables for a coordinator instance.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Cap on simultaneous in-flight generation calls across all sessions
    pub max_in_flight: usize,
    /// Additional attempts per failing turn before the fallback message
    pub turn_retries: u32,
    /// Optional presentation delay between phases; correctness never
    /// depends on it and the default is no delay
    pub pacing: Option<Duration>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            max_in_flight: 4,
            turn_retries: 1,
            pacing: None,
        }
    }
}

struct ActiveSession {
    orchestrator: RoundOrchestrator,
    started: Instant,
    started_at: String,
}

/// The token lives outside the state mutex so `cancel` never waits behind
/// an in-flight phase.
struct SessionHandle {
    state: Mutex<ActiveSession>,
    cancel: CancellationToken,
}

/// Runs simulated sessions against a persona registry and a generation
/// backend.
pub struct SessionCoordinator {
    registry: Arc<PersonaRegistry>,
    agent: Arc<PersonaAgent>,
    limiter: Arc<Semaphore>,
    options: CoordinatorOptions,
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionCoordinator {
    /// Creates a coordinator with default options.
    pub fn new(registry: Arc<PersonaRegistry>, service: Arc<dyn GenerationService>) -> Self {
        Self::with_options(registry, service, CoordinatorOptions::default())
    }

    /// Creates a coordinator with explicit options.
    pub fn with_options(
        registry: Arc<PersonaRegistry>,
        service: Arc<dyn GenerationService>,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            registry,
            agent: Arc::new(PersonaAgent::new(service)),
            limiter: Arc::new(Semaphore::new(options.max_in_flight.max(1))),
            options,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn make_orchestrator(
        &self,
        spec: SessionSpec,
        cancel: CancellationToken,
    ) -> Result<RoundOrchestrator> {
        RoundOrchestrator::new(
            spec,
            &self.registry,
            self.agent.clone(),
            self.limiter.clone(),
            cancel,
            TurnPolicy {
                retries: self.options.turn_retries,
                max_in_flight: self.options.max_in_flight.max(1),
            },
        )
    }

    /// Runs a whole session and returns its result.
    pub async fn run(&self, spec: SessionSpec) -> Result<SessionResult> {
        self.run_with_cancel(spec, CancellationToken::new()).await
    }

    /// Runs a whole session, honoring `cancel` between participant turns.
    ///
    /// A cancelled session still returns a valid result: metrics are
    /// computed over the phases that completed, and the status is
    /// `Aborted`.
    pub async fn run_with_cancel(
        &self,
        spec: SessionSpec,
        cancel: CancellationToken,
    ) -> Result<SessionResult> {
        let started = Instant::now();
        let started_at = chrono::Utc::now().to_rfc3339();
        let mut orchestrator = self.make_orchestrator(spec, cancel)?;
        loop {
            let outcome = orchestrator.advance().await?;
            if outcome.finished {
                break;
            }
            if let Some(delay) = self.options.pacing {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(build_result(&orchestrator, started, started_at))
    }

    /// Validates the spec and runs the initial-reaction phase.
    ///
    /// The session stays registered afterwards; drive it with [`advance`]
    /// and collect it with [`end_session`].
    ///
    /// [`advance`]: Self::advance
    /// [`end_session`]: Self::end_session
    pub async fn start_session(&self, spec: SessionSpec) -> Result<PhaseOutcome> {
        let session_id = spec.session_id.clone();
        {
            let sessions = self.sessions.read().await;
            if sessions.contains_key(&session_id) {
                return Err(RoundtableError::config(format!(
                    "session '{}' is already running",
                    session_id
                )));
            }
        }

        let cancel = CancellationToken::new();
        let started = Instant::now();
        let started_at = chrono::Utc::now().to_rfc3339();
        let mut orchestrator = self.make_orchestrator(spec, cancel.clone())?;
        let outcome = orchestrator.advance().await?;

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session_id,
            Arc::new(SessionHandle {
                state: Mutex::new(ActiveSession {
                    orchestrator,
                    started,
                    started_at,
                }),
                cancel,
            }),
        );
        Ok(outcome)
    }

    /// Runs the next phase of a registered session.
    pub async fn advance(&self, session_id: &str) -> Result<PhaseOutcome> {
        let session = self.get_session(session_id).await?;
        let mut guard = session.state.lock().await;
        if let Some(delay) = self.options.pacing {
            tokio::time::sleep(delay).await;
        }
        guard.orchestrator.advance().await
    }

    /// Requests cancellation; the session aborts at the next turn boundary.
    pub async fn cancel(&self, session_id: &str) -> Result<()> {
        let session = self.get_session(session_id).await?;
        session.cancel.cancel();
        Ok(())
    }

    /// Ends a registered session and returns its result.
    ///
    /// Valid at any point: a session ended before its final phase is marked
    /// `Aborted` and its metrics cover the completed phases only.
    pub async fn end_session(&self, session_id: &str) -> Result<SessionResult> {
        let session = {
            let mut sessions = self.sessions.write().await;
            sessions
                .remove(session_id)
                .ok_or_else(|| RoundtableError::not_found("session", session_id))?
        };
        // Cancelling first lets any in-flight phase abort instead of being
        // waited out at the lock below.
        session.cancel.cancel();
        let mut guard = session.state.lock().await;
        guard.orchestrator.abort();
        Ok(build_result(
            &guard.orchestrator,
            guard.started,
            guard.started_at.clone(),
        ))
    }

    async fn get_session(&self, session_id: &str) -> Result<Arc<SessionHandle>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| RoundtableError::not_found("session", session_id))
    }
}

fn build_result(
    orchestrator: &RoundOrchestrator,
    started: Instant,
    started_at: String,
) -> SessionResult {
    let transcript = orchestrator.transcript().clone();
    let metrics = metrics::aggregate(&transcript);
    let status = if orchestrator.phase() == Phase::Completed {
        SessionStatus::Completed
    } else {
        SessionStatus::Aborted
    };
    SessionResult {
        session_id: orchestrator.spec().session_id.clone(),
        transcript,
        metrics,
        summary: orchestrator.summary().cloned(),
        status,
        started_at,
        ended_at: chrono::Utc::now().to_rfc3339(),
        duration_seconds: started.elapsed().as_secs_f64(),
    }
}
