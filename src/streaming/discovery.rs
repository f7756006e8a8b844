//! Discovery runner: one completion call, streamed as discovery events

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::discovery::{DiscoveryRequest, DiscoveryResult};
use crate::infrastructure::log_messages::discovery;
use crate::prompts::build_discovery_prompt;
use crate::providers::CompletionProvider;
use crate::streaming::events::DiscoveryEvent;
use crate::streaming::fences::strip_code_fences;

/// start, thinking, one outcome, done
const CHANNEL_CAPACITY: usize = 4;

#[derive(Clone)]
pub struct DiscoveryRunner {
    completion: Arc<dyn CompletionProvider>,
}

impl DiscoveryRunner {
    pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
        Self { completion }
    }

    pub fn spawn(&self, request: DiscoveryRequest) -> mpsc::Receiver<DiscoveryEvent> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let runner = self.clone();
        let span = info_span!("discovery", run_id = %Uuid::now_v7());

        tokio::spawn(async move { runner.run(request, tx).await }.instrument(span));
        rx
    }

    /// Emit start and thinking, issue the completion, report its outcome,
    /// and always finish with `done`
    pub async fn run(&self, request: DiscoveryRequest, tx: mpsc::Sender<DiscoveryEvent>) {
        info!(max_results = %request.max_results, "{}", discovery::RUN_STARTED);

        if tx.send(DiscoveryEvent::start()).await.is_err()
            || tx.send(DiscoveryEvent::thinking()).await.is_err()
        {
            return;
        }

        let outcome = self.discover(&request).await;
        if tx.send(outcome).await.is_ok() {
            let _ = tx.send(DiscoveryEvent::done()).await;
        }
    }

    async fn discover(&self, request: &DiscoveryRequest) -> DiscoveryEvent {
        let started = Instant::now();
        let prompt = build_discovery_prompt(request);

        let raw = match self.completion.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "{}", discovery::FAILED);
                return DiscoveryEvent::failure(e);
            }
        };

        let (data, result) = match parse_recommendations(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "{}", discovery::PARSE_FAILED);
                return DiscoveryEvent::parse_failure(e);
            }
        };

        let elapsed = started.elapsed();
        info!(
            recommendations = result.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "{}",
            discovery::COMPLETED
        );
        DiscoveryEvent::complete(data, result.reasoning_steps, result.recommendations.len(), elapsed)
    }
}

fn parse_recommendations(raw: &str) -> Result<(Value, DiscoveryResult), serde_json::Error> {
    let value: Value = serde_json::from_str(&strip_code_fences(raw))?;
    let result: DiscoveryResult = serde_json::from_value(value.clone())?;
    Ok((value, result))
}
