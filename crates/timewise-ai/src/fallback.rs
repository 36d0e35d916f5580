//! Sequential model fallback.
//!
//! Model availability varies by key, region, and month, so every request
//! walks an ordered list of candidates until one produces an acceptable
//! answer. Candidates are tried one at a time, never raced, to keep quota
//! use and ordering predictable.

use tracing::{info, warn};

use crate::client::{GenerateContentResponse, GenerateRequest, GenerativeBackend};
use crate::config::Candidate;
use crate::error::{AiError, AttemptFailure};

/// Result of walking the candidate list.
#[derive(Debug)]
pub enum FallbackOutcome<T> {
    Success {
        value: T,
        candidate: Candidate,
        /// Candidates that failed before this one.
        failures: Vec<AttemptFailure>,
    },
    Exhausted { failures: Vec<AttemptFailure> },
}

impl<T> FallbackOutcome<T> {
    /// The most recent failure, if any.
    pub fn last_failure(&self) -> Option<&AttemptFailure> {
        match self {
            Self::Success { failures, .. } | Self::Exhausted { failures } => failures.last(),
        }
    }

    /// Collapse into a `Result`; exhaustion becomes [`AiError::Exhausted`]
    /// carrying the last failure.
    pub fn into_result(self) -> Result<(T, Candidate, Vec<AttemptFailure>), AiError> {
        match self {
            Self::Success {
                value,
                candidate,
                failures,
            } => Ok((value, candidate, failures)),
            Self::Exhausted { mut failures } => {
                let attempts = failures.len();
                match failures.pop() {
                    Some(last) => Err(AiError::Exhausted {
                        attempts,
                        last: Box::new(last),
                    }),
                    None => Err(AiError::NoCandidates),
                }
            }
        }
    }
}

/// Try each candidate in order until `accept` takes a response.
///
/// Transport errors, non-success statuses, and responses that `accept`
/// rejects are all recorded and move the loop on to the next candidate.
pub async fn run_fallback<B, T, F>(
    backend: &B,
    api_key: &str,
    candidates: &[Candidate],
    request: &GenerateRequest,
    accept: F,
) -> FallbackOutcome<T>
where
    B: GenerativeBackend + ?Sized,
    F: Fn(GenerateContentResponse) -> Result<T, AiError>,
{
    let mut failures = Vec::new();

    for candidate in candidates {
        info!(candidate = %candidate, "trying model");
        let result = backend
            .generate(candidate, api_key, request)
            .await
            .and_then(&accept);

        match result {
            Ok(value) => {
                info!(candidate = %candidate, failed_before = failures.len(), "model succeeded");
                return FallbackOutcome::Success {
                    value,
                    candidate: candidate.clone(),
                    failures,
                };
            }
            Err(error) => {
                warn!(candidate = %candidate, error = %error, "model failed");
                failures.push(AttemptFailure {
                    candidate: candidate.clone(),
                    error,
                });
            }
        }
    }

    FallbackOutcome::Exhausted { failures }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backend shared by the fallback, parse, and chat tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use crate::client::{GenerateContentResponse, GenerateRequest, GenerativeBackend};
    use crate::config::Candidate;
    use crate::error::AiError;

    /// Replays queued results in order and records who was asked.
    #[derive(Default)]
    pub struct ScriptedBackend {
        script: Mutex<VecDeque<Result<GenerateContentResponse, AiError>>>,
        pub calls: Mutex<Vec<String>>,
        pub requests: Mutex<Vec<GenerateRequest>>,
    }

    impl ScriptedBackend {
        pub fn new(script: Vec<Result<GenerateContentResponse, AiError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                ..Self::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerativeBackend for ScriptedBackend {
        async fn generate(
            &self,
            candidate: &Candidate,
            _api_key: &str,
            request: &GenerateRequest,
        ) -> Result<GenerateContentResponse, AiError> {
            self.calls.lock().unwrap().push(candidate.to_string());
            self.requests.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AiError::Malformed("script exhausted".into())))
        }
    }

    /// A response whose first candidate carries `parts`.
    pub fn response(parts: Value) -> GenerateContentResponse {
        serde_json::from_value(json!({
            "candidates": [{ "content": { "role": "model", "parts": parts } }]
        }))
        .unwrap()
    }

    pub fn text_response(text: &str) -> GenerateContentResponse {
        response(json!([{ "text": text }]))
    }

    pub fn server_error(status: u16, body: &str) -> AiError {
        AiError::Server {
            status,
            body: body.to_string(),
        }
    }
}
