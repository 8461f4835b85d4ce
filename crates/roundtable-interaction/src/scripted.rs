//! Deterministic in-memory generation service.
//!
//! Cycles through a fixed roster of canned responses and supports targeted
//! failure injection, which makes orchestrator behavior reproducible in
//! tests and lets the CLI run offline.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::generation::{GenerationError, GenerationRequest, GenerationService};

/// A failure rule: the call fails when the prompt contains every needle.
#[derive(Debug, Clone)]
struct FailureRule {
    needles: Vec<String>,
}

/// Generation service that replays canned responses.
pub struct ScriptedService {
    replies: Vec<String>,
    cursor: AtomicUsize,
    failures: Vec<FailureRule>,
}

impl ScriptedService {
    /// Creates a service cycling through `replies` in order.
    ///
    /// An empty roster is allowed; every call then reports an empty
    /// response, which exercises the caller's failure path.
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies,
            cursor: AtomicUsize::new(0),
            failures: Vec::new(),
        }
    }

    /// A small market-research flavored roster for offline demo runs.
    pub fn demo_panel() -> Self {
        Self::new(vec![
            "This looks genuinely innovative, I would try it tomorrow.".to_string(),
            "The concept is interesting but the price point is concerning.".to_string(),
            "I remain unconvinced; the claims sound difficult to verify.".to_string(),
            "If the numbers hold up this could be really effective for us.".to_string(),
            "My first impression is neutral, I would need to see it in use.".to_string(),
        ])
    }

    /// Adds a failure rule: any request whose prompt contains all of
    /// `needles` fails with a retryable service error, so callers exercise
    /// their full retry budget before falling back.
    pub fn fail_when(mut self, needles: Vec<&str>) -> Self {
        self.failures.push(FailureRule {
            needles: needles.into_iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Number of calls served so far (successful pops only).
    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }
        if self
            .failures
            .iter()
            .any(|rule| rule.needles.iter().all(|n| request.prompt.contains(n)))
        {
            return Err(GenerationError::Service {
                message: "scripted failure".to_string(),
                retryable: true,
            });
        }
        if self.replies.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        Ok(self.replies[index % self.replies.len()].clone())
    }
}
