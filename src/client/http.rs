//! HTTP client for the glassbox API
//!
//! [`GlassboxClient`] owns one analysis session and one discovery session.
//! Starting a session aborts the previous one's request and supersedes its
//! [`SessionId`], so anything the old request still delivers is dropped by
//! [`SessionController::apply`].

use futures_util::future::{AbortHandle, Abortable};
use futures_util::StreamExt;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::cache::{FileResultCache, ResultCache};
use super::frames::FrameDecoder;
use super::reducer::{
    reduce_analysis, reduce_discovery, AnalysisState, AnalysisStatus, DiscoveryState,
};
use super::session::{SessionController, SessionId};
use crate::api::handlers::{AnalyzeBody, DiscoverBody};
use crate::api::{paths, ErrorResponse};
use crate::config::CacheSettings;
use crate::domain::payloads::AnalysisResults;
use crate::infrastructure::log_messages::client;
use crate::providers::constants::github::USER_AGENT;
use crate::streaming::events::{AnalysisEvent, DiscoveryEvent};

#[derive(Debug, Default)]
struct InFlight {
    analysis: Option<AbortHandle>,
    discovery: Option<AbortHandle>,
}

pub struct GlassboxClient {
    http: reqwest::Client,
    base_url: String,
    cache: Option<Arc<dyn ResultCache>>,
    analysis: SessionController<AnalysisState>,
    discovery: SessionController<DiscoveryState>,
    in_flight: Mutex<InFlight>,
}

impl GlassboxClient {
    /// `base_url` must be an absolute `http` or `https` URL
    pub fn new(base_url: impl Into<String>) -> crate::Result<Self> {
        let base_url = base_url.into();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| crate::Error::invalid_input("base_url", e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(crate::Error::invalid_input(
                "base_url",
                format!("unsupported scheme {}", parsed.scheme()),
            ));
        }

        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: None,
            analysis: SessionController::default(),
            discovery: SessionController::default(),
            in_flight: Mutex::new(InFlight::default()),
        })
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach a file cache as configured; a disabled cache leaves the client
    /// without one
    pub fn with_cache_settings(self, settings: &CacheSettings) -> Self {
        match FileResultCache::from_settings(settings) {
            Some(cache) => self.with_cache(Arc::new(cache)),
            None => self,
        }
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    pub fn analysis_state(&self) -> AnalysisState {
        self.analysis.snapshot()
    }

    pub fn discovery_state(&self) -> DiscoveryState {
        self.discovery.snapshot()
    }

    /// Run an analysis session to completion and return its final state
    ///
    /// A cached result set is served without touching the network unless
    /// `force_refresh` is set. A session superseded while running returns
    /// whatever state the new session holds at that point.
    pub async fn analyze(&self, url: &str, force_refresh: bool) -> AnalysisState {
        let cached = if force_refresh {
            None
        } else {
            self.cached_results(url).await
        };

        if let Some(results) = cached {
            self.abort_analysis();
            info!(url, "{}", client::CACHE_HIT);
            self.analysis.begin(AnalysisState::from_cache(results));
            return self.analysis.snapshot();
        }

        let (handle, registration) = AbortHandle::new_pair();
        if let Some(previous) = self.in_flight.lock().analysis.replace(handle) {
            previous.abort();
        }
        let id = self.analysis.begin(AnalysisState::analyzing());

        let body = AnalyzeBody {
            url: Some(url.to_string()),
        };
        let session = self.run_session::<_, AnalysisEvent, _>(
            paths::ANALYZE,
            &body,
            &self.analysis,
            id,
            reduce_analysis,
        );
        if Abortable::new(session, registration).await.is_err() {
            return self.analysis.snapshot();
        }

        let state = self.analysis.snapshot();
        if state.status == AnalysisStatus::Complete && self.analysis.is_current(id) {
            self.store_results(url, state.results.clone()).await;
        }
        state
    }

    /// Cache reads and writes touch the filesystem, so they run on the
    /// blocking pool
    async fn cached_results(&self, url: &str) -> Option<AnalysisResults> {
        let cache = self.cache.clone()?;
        let url = url.to_string();
        tokio::task::spawn_blocking(move || cache.get_for_url(&url))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "{}", client::CACHE_TASK_FAILED);
                None
            })
    }

    async fn store_results(&self, url: &str, results: AnalysisResults) {
        let Some(cache) = self.cache.clone() else {
            return;
        };
        let url = url.to_string();
        if let Err(e) =
            tokio::task::spawn_blocking(move || cache.put_for_url(&url, &results)).await
        {
            warn!(error = %e, "{}", client::CACHE_TASK_FAILED);
        }
    }

    /// Run a discovery session to completion and return its final state
    pub async fn discover(&self, body: DiscoverBody) -> DiscoveryState {
        let (handle, registration) = AbortHandle::new_pair();
        if let Some(previous) = self.in_flight.lock().discovery.replace(handle) {
            previous.abort();
        }
        let id = self.discovery.begin(DiscoveryState::searching());

        let session = self.run_session::<_, DiscoveryEvent, _>(
            paths::DISCOVER,
            &body,
            &self.discovery,
            id,
            reduce_discovery,
        );
        // Aborted or not, the controller holds the answer
        let _ = Abortable::new(session, registration).await;
        self.discovery.snapshot()
    }

    /// Cancel both sessions and return to idle
    pub fn reset(&self) {
        self.abort_analysis();
        if let Some(handle) = self.in_flight.lock().discovery.take() {
            handle.abort();
        }
        self.analysis.reset(AnalysisState::default());
        self.discovery.reset(DiscoveryState::default());
    }

    fn abort_analysis(&self) {
        if let Some(handle) = self.in_flight.lock().analysis.take() {
            handle.abort();
        }
    }

    /// POST `body` to `path` and fold the response's frames into `controller`
    async fn run_session<B, E, S>(
        &self,
        path: &str,
        body: &B,
        controller: &SessionController<S>,
        id: SessionId,
        reduce: fn(S, &E) -> S,
    ) where
        B: Serialize + ?Sized,
        E: DeserializeOwned,
        S: Clone + Failable,
    {
        let response = match self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                controller.apply(id, |state| state.failed(e.to_string()));
                return;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<ErrorResponse>().await {
                Ok(error) => error.detail,
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            controller.apply(id, |state| state.failed(detail));
            return;
        }

        let mut decoder = FrameDecoder::<E>::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    controller.apply(id, |state| state.failed(e.to_string()));
                    return;
                }
            };
            for event in decoder.push(&chunk) {
                if !controller.apply(id, |state| reduce(state, &event)) {
                    return;
                }
            }
        }
        for event in decoder.finish() {
            controller.apply(id, |state| reduce(state, &event));
        }
    }
}

/// Session states that can record a failure outside the event stream
trait Failable {
    fn failed(self, detail: String) -> Self;
}

impl Failable for AnalysisState {
    fn failed(self, detail: String) -> Self {
        AnalysisState::failed(self, detail)
    }
}

impl Failable for DiscoveryState {
    fn failed(self, detail: String) -> Self {
        DiscoveryState::failed(self, detail)
    }
}
