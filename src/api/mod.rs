//! HTTP request surface
//!
//! `GET /health`, `POST /api/analyze` and `POST /api/discover`, wrapped in
//! the middleware stack from [`middleware`].

pub mod error_response;
pub mod handlers;
pub mod middleware;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::config::ApplicationSettings;
use crate::providers::{CompletionProvider, RepositorySource};

pub use error_response::{ApiError, ErrorResponse, ErrorResponseExt, RequestFailure};

/// Route paths
pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const ANALYZE: &str = "/api/analyze";
    pub const DISCOVER: &str = "/api/discover";
}

/// Shared handler state
///
/// `completion` is `None` when no credential is configured; both streaming
/// endpoints then answer 500 after validating their input.
#[derive(Clone)]
pub struct AppState {
    pub completion: Option<Arc<dyn CompletionProvider>>,
    pub source: Arc<dyn RepositorySource>,
}

impl AppState {
    pub fn new(
        completion: Option<Arc<dyn CompletionProvider>>,
        source: Arc<dyn RepositorySource>,
    ) -> Self {
        Self { completion, source }
    }
}

/// Build the complete router
pub fn router(state: AppState, settings: &ApplicationSettings) -> Router {
    let routes = Router::new()
        .route(paths::HEALTH, get(handlers::health))
        .route(paths::ANALYZE, post(handlers::analyze))
        .route(paths::DISCOVER, post(handlers::discover))
        .with_state(state);

    middleware::apply_middleware(routes, settings)
}
