use thiserror::Error;
use timewise_core::NormalizeError;

use crate::config::Candidate;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("GEMINI_API_KEY not found in environment variables")]
    MissingCredential,
    #[error("no model candidates configured")]
    NoCandidates,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed model output: {0}")]
    Malformed(String),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    /// Every candidate failed. Displays as the last candidate's error.
    #[error("{}", .last.error)]
    Exhausted {
        attempts: usize,
        last: Box<AttemptFailure>,
    },
}

/// One candidate's failure inside a fallback run.
#[derive(Debug)]
pub struct AttemptFailure {
    pub candidate: Candidate,
    pub error: AiError,
}
