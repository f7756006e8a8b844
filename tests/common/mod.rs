//! Shared fixtures for integration tests
//!
//! Stub providers stand in for the completion API and GitHub so the router
//! can be driven without network access.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use std::sync::Arc;

use glassbox::api::{self, AppState};
use glassbox::config::ApplicationSettings;
use glassbox::domain::bundle::ContentBundle;
use glassbox::domain::repository::RepositoryRef;
use glassbox::providers::{CompletionProvider, ProviderError, RepositorySource};

/// Answers every prompt with the same text
pub struct FixedCompletion(pub String);

#[async_trait]
impl CompletionProvider for FixedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Fails every call at the transport level
pub struct FailingCompletion;

#[async_trait]
impl CompletionProvider for FailingCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Transport("connection reset".into()))
    }
}

/// Returns an empty bundle named after the requested repository
pub struct EmptySource;

#[async_trait]
impl RepositorySource for EmptySource {
    async fn fetch_bundle(&self, repo: &RepositoryRef) -> Result<ContentBundle, ProviderError> {
        Ok(ContentBundle::empty(
            repo.owner.as_ref().to_string(),
            repo.name.as_ref().to_string(),
        ))
    }
}

pub fn application_settings() -> ApplicationSettings {
    ApplicationSettings {
        host: "127.0.0.1".into(),
        port: 0,
        environment: "test".into(),
        cors_origins: vec!["http://localhost:3000".into()],
        max_request_bytes: 64 * 1024,
    }
}

pub fn router_with(completion: Option<Arc<dyn CompletionProvider>>) -> Router {
    api::router(
        AppState::new(completion, Arc::new(EmptySource)),
        &application_settings(),
    )
}

pub fn fixed(reply: &str) -> Option<Arc<dyn CompletionProvider>> {
    Some(Arc::new(FixedCompletion(reply.to_string())))
}

pub const DISCOVERY_REPLY: &str = r#"```json
{
  "reasoning_steps": ["Read the request", "Compared candidates"],
  "query_interpretation": "A fast file finder",
  "summary": "Two strong matches",
  "recommendations": [
    {"rank": 1, "repo_name": "sharkdp/fd", "github_url": "https://github.com/sharkdp/fd", "stars": 30000, "match_score": 95},
    {"rank": 2, "repo_name": "BurntSushi/ripgrep", "github_url": "https://github.com/BurntSushi/ripgrep", "stars": 45000, "match_score": 80}
  ]
}
```"#;
