//! External collaborators behind traits
//!
//! The orchestrator only sees [`CompletionProvider`] and [`RepositorySource`].
//! Production uses the Anthropic Messages API and the GitHub REST API; tests
//! swap in stubs or point the real clients at a mock server.

pub mod anthropic;
pub mod constants;
pub mod github;

use async_trait::async_trait;

use crate::domain::bundle::ContentBundle;
use crate::domain::repository::RepositoryRef;

pub use anthropic::AnthropicProvider;
pub use github::GithubFetcher;

/// Issues one completion call per prompt
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send a single user message and return the raw text of the reply
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Reads repository metadata into a bounded bundle
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Individual reads degrade to empty content. An `Err` means the bundle
    /// could not be assembled at all.
    async fn fetch_bundle(&self, repo: &RepositoryRef) -> Result<ContentBundle, ProviderError>;
}

/// Failure of an upstream call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Completion contained no text")]
    EmptyCompletion,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_carries_body() {
        let err = ProviderError::Status {
            status: 529,
            body: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "Upstream returned 529: overloaded");
    }
}
