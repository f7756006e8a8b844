//! Route handlers
//!
//! Input is validated before the credential is checked, and both happen
//! before a stream is opened: once the `text/event-stream` response starts,
//! every failure is reported in-band.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderMap,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use super::error_response::{ApiError, RequestFailure};
use super::AppState;
use crate::domain::discovery::{DiscoveryFilters, DiscoveryRequest};
use crate::domain::repository::RepositoryRef;
use crate::domain::types::{DiscoveryQuery, MaxResults};
use crate::domain::validation_constants::discovery::{MAX_RESULTS_LIMIT, MIN_QUERY_CHARS};
use crate::infrastructure::log_messages::api;
use crate::providers::constants::http::{content_types::TEXT_EVENT_STREAM, headers::NO_CACHE};
use crate::providers::CompletionProvider;
use crate::streaming::{frame_stream, AnalysisOrchestrator, DiscoveryRunner};

/// Body of `POST /api/analyze`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeBody {
    pub url: Option<String>,
}

/// Body of `POST /api/discover`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverBody {
    pub query: Option<String>,
    pub filters: Option<DiscoveryFilters>,
    pub max_results: Option<i64>,
}

impl DiscoverBody {
    pub fn validate(self) -> Result<DiscoveryRequest, ApiError> {
        let query = self
            .query
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ApiError::InvalidInput("query is required".to_string()))?;

        let query = DiscoveryQuery::try_new(query).map_err(|_| {
            ApiError::InvalidInput(format!(
                "query must be at least {MIN_QUERY_CHARS} characters"
            ))
        })?;

        let max_results = match self.max_results {
            None => MaxResults::default(),
            Some(n) => u8::try_from(n)
                .ok()
                .and_then(|n| MaxResults::try_new(n).ok())
                .ok_or_else(|| {
                    ApiError::InvalidInput(format!(
                        "max_results must be between 1 and {MAX_RESULTS_LIMIT}"
                    ))
                })?,
        };

        Ok(DiscoveryRequest::new(query)
            .with_filters(self.filters.unwrap_or_default())
            .with_max_results(max_results))
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Response, RequestFailure> {
    open_analysis(&state, body).map_err(|error| RequestFailure::new(error, &headers))
}

pub async fn discover(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<DiscoverBody>, JsonRejection>,
) -> Result<Response, RequestFailure> {
    open_discovery(&state, body).map_err(|error| RequestFailure::new(error, &headers))
}

fn open_analysis(
    state: &AppState,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let url = body.url.unwrap_or_default();
    let repo = RepositoryRef::parse(&url).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    let completion = require_completion(state)?;

    info!(repo = %repo, "{}", api::STREAM_OPENED);
    let orchestrator = AnalysisOrchestrator::new(completion, state.source.clone());
    Ok(event_stream(orchestrator.spawn(repo)))
}

fn open_discovery(
    state: &AppState,
    body: Result<Json<DiscoverBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let request = body.validate()?;
    let completion = require_completion(state)?;

    info!(max_results = %request.max_results, "{}", api::STREAM_OPENED);
    Ok(event_stream(DiscoveryRunner::new(completion).spawn(request)))
}

fn require_completion(state: &AppState) -> Result<Arc<dyn CompletionProvider>, ApiError> {
    state.completion.clone().ok_or(ApiError::MissingCredential)
}

fn event_stream<E>(receiver: mpsc::Receiver<E>) -> Response
where
    E: Serialize + Send + 'static,
{
    (
        [(CONTENT_TYPE, TEXT_EVENT_STREAM), (CACHE_CONTROL, NO_CACHE)],
        Body::from_stream(frame_stream(receiver)),
    )
        .into_response()
}
