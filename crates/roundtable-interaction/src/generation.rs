//! The text-generation seam.
//!
//! Everything upstream treats generation as an opaque service invoked once
//! per turn: a prompt goes in, text comes out, and failures are typed so the
//! orchestrator can decide on retries and fallbacks. Cancellation is
//! cooperative: implementations honor the passed token instead of relying
//! on process signals.

use async_trait::async_trait;
use roundtable_core::RoundtableError;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// One generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// The fully rendered prompt
    pub prompt: String,
    /// Soft length guidance in sentences; never enforced as a truncation
    pub max_sentences_hint: u32,
}

/// Typed failure of a single generation call.
#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    /// The service reported an error (HTTP failure, malformed body, ...)
    #[error("generation service error: {message}")]
    Service { message: String, retryable: bool },

    /// The call did not finish within the configured timeout
    #[error("generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The cancellation token fired before or during the call
    #[error("generation cancelled")]
    Cancelled,

    /// The service answered but produced no usable text
    #[error("generation service returned no text")]
    EmptyResponse,

    /// The prompt template failed to render
    #[error("prompt rendering failed: {0}")]
    Prompt(String),
}

impl GenerationError {
    /// Whether a retry with the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Service { retryable, .. } => *retryable,
            Self::Timeout { .. } | Self::EmptyResponse => true,
            Self::Cancelled | Self::Prompt(_) => false,
        }
    }

    /// Whether this failure came from the cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<GenerationError> for RoundtableError {
    fn from(err: GenerationError) -> Self {
        RoundtableError::generation(err.to_string())
    }
}

/// An external text-generation service.
///
/// Implementations must not cache across distinct calls: identical prompts
/// may legitimately produce different text.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generates text for one turn.
    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError>;
}
