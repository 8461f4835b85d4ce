//! GeminiService - direct REST backend for the generation seam.
//!
//! Calls the Gemini `generateContent` endpoint with the rendered prompt as a
//! single user turn. Timeouts and cancellation are handled here so callers
//! only ever see the typed `GenerationError`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::generation::{GenerationError, GenerationRequest, GenerationService};

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Generation service backed by the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    api_key: String,
    model: String,
    request_timeout: Duration,
}

impl GeminiService {
    /// Creates a new service with the provided API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    async fn send_request(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| GenerationError::Service {
                message: format!("Gemini API request failed: {err}"),
                retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|err| GenerationError::Service {
                    message: format!("Failed to parse Gemini response: {err}"),
                    retryable: false,
                })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl GenerationService for GeminiService {
    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(GenerationError::Cancelled),
            result = tokio::time::timeout(self.request_timeout, self.send_request(&request.prompt)) => {
                match result {
                    Err(_) => Err(GenerationError::Timeout {
                        seconds: self.request_timeout.as_secs(),
                    }),
                    Ok(inner) => inner,
                }
            }
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, GenerationError> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or(GenerationError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: String) -> GenerationError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    GenerationError::Service {
        message: format!("Gemini API returned {}: {}", status.as_u16(), message),
        retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_from_the_last_candidate() {
        let response = GenerateContentResponse {
            candidates: Some(vec![Candidate {
                content: Some(ContentResponse {
                    parts: vec![
                        PartResponse { text: None },
                        PartResponse {
                            text: Some("panel response".to_string()),
                        },
                    ],
                }),
            }]),
        };
        assert_eq!(extract_text_response(response).unwrap(), "panel response");
    }

    #[test]
    fn missing_candidates_is_an_empty_response() {
        let response = GenerateContentResponse { candidates: None };
        assert!(matches!(
            extract_text_response(response),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn rate_limit_errors_are_retryable() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"quota exhausted","status":"RESOURCE_EXHAUSTED"}}"#.to_string(),
        );
        match err {
            GenerationError::Service { message, retryable } => {
                assert!(retryable);
                assert!(message.contains("RESOURCE_EXHAUSTED"));
                assert!(message.contains("quota exhausted"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let err = map_http_error(StatusCode::BAD_REQUEST, "not json".to_string());
        match err {
            GenerationError::Service { message, retryable } => {
                assert!(!retryable);
                assert!(message.contains("400"));
                assert!(message.contains("not json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
