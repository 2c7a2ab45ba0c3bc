//! Text-completion collaborator.
//!
//! Everything past this crate sees a completion as a plain `String`;
//! response-shape differences are flattened by [`normalize_completion`].

use async_trait::async_trait;
use thiserror::Error;

mod gemini;
mod normalize;

pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
pub use normalize::normalize_completion;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no API key configured for the completion service")]
    MissingApiKey,
    #[error("invalid completion endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("completion request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion service returned an unusable response: {0}")]
    MalformedResponse(String),
}

/// Sends one prompt and waits for the whole answer. No retries.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;
}
