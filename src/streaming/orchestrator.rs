//! Pass Orchestrator
//!
//! Fans every pass definition out as a concurrent completion call over one
//! shared [`ContentBundle`], then settles all of them: a failing or
//! panicking pass never cancels its siblings. Pass futures only *return*
//! their terminal event; the collection loop is the sole writer to the event
//! channel, so frames are never interleaved and `done` is always last.

use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use serde_json::{json, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::bundle::{truncate_chars, ContentBundle};
use crate::domain::passes::{PassDefinition, PassName, PASS_DEFINITIONS};
use crate::domain::payloads::PassReport;
use crate::domain::repository::RepositoryRef;
use crate::domain::validation_constants::prompt::MAX_RAW_ECHO_CHARS;
use crate::infrastructure::log_messages::analysis;
use crate::prompts::build_pass_prompt;
use crate::providers::{CompletionProvider, RepositorySource};
use crate::streaming::events::AnalysisEvent;
use crate::streaming::fences::strip_code_fences;

/// Room for every pass plus start, one unscoped error and done
const CHANNEL_CAPACITY: usize = PassName::ALL.len() + 3;

#[derive(Clone)]
pub struct AnalysisOrchestrator {
    completion: Arc<dyn CompletionProvider>,
    source: Arc<dyn RepositorySource>,
}

impl AnalysisOrchestrator {
    pub fn new(completion: Arc<dyn CompletionProvider>, source: Arc<dyn RepositorySource>) -> Self {
        Self { completion, source }
    }

    /// Start a run in the background and hand back its event stream
    pub fn spawn(&self, repo: RepositoryRef) -> mpsc::Receiver<AnalysisEvent> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let orchestrator = self.clone();
        let span = info_span!("analysis", run_id = %Uuid::now_v7(), repo = %repo);

        tokio::spawn(async move { orchestrator.run(repo, tx).await }.instrument(span));
        rx
    }

    /// Fetch the bundle, run every pass, and emit `done`
    ///
    /// A bundle that cannot be assembled at all is reported as one unscoped
    /// `error` followed immediately by `done`.
    pub async fn run(&self, repo: RepositoryRef, tx: mpsc::Sender<AnalysisEvent>) {
        info!("{}", analysis::RUN_STARTED);

        let bundle = match self.source.fetch_bundle(&repo).await {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(error = %e, "{}", analysis::BUNDLE_FAILED);
                let _ = tx.send(AnalysisEvent::fatal(e)).await;
                let _ = tx.send(AnalysisEvent::done()).await;
                return;
            }
        };

        if tx
            .send(AnalysisEvent::start(&bundle.repo_name, PASS_DEFINITIONS.len()))
            .await
            .is_err()
        {
            debug!("{}", analysis::CLIENT_GONE);
            return;
        }

        if stream_passes(self.completion.as_ref(), &bundle, &PASS_DEFINITIONS, &tx).await {
            let _ = tx.send(AnalysisEvent::done()).await;
            info!("{}", analysis::RUN_FINISHED);
        }
    }
}

/// Run `definitions` concurrently against `bundle`, sending exactly one
/// terminal event per definition in completion order
///
/// Returns `false` if the receiver went away before every pass settled; the
/// remaining passes are dropped in that case.
pub async fn stream_passes(
    completion: &dyn CompletionProvider,
    bundle: &ContentBundle,
    definitions: &[PassDefinition],
    tx: &mpsc::Sender<AnalysisEvent>,
) -> bool {
    let mut pending: FuturesUnordered<_> = definitions
        .iter()
        .map(|definition| {
            debug!(pass = %definition.name, "{}", analysis::PASS_DISPATCHED);
            AssertUnwindSafe(run_pass(completion, definition, bundle))
                .catch_unwind()
                .map(move |outcome| match outcome {
                    Ok(event) => event,
                    Err(_) => {
                        warn!(pass = %definition.name, "{}", analysis::PASS_PANICKED);
                        AnalysisEvent::pass_error(definition, "pass panicked")
                    }
                })
        })
        .collect();

    while let Some(event) = pending.next().await {
        if tx.send(event).await.is_err() {
            debug!("{}", analysis::CLIENT_GONE);
            return false;
        }
    }
    true
}

/// One pass from prompt to terminal event
async fn run_pass(
    completion: &dyn CompletionProvider,
    definition: &PassDefinition,
    bundle: &ContentBundle,
) -> AnalysisEvent {
    let started = Instant::now();

    let prompt = match build_pass_prompt(definition, bundle) {
        Ok(prompt) => prompt,
        Err(e) => return AnalysisEvent::pass_error(definition, e),
    };

    let raw = match completion.complete(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(pass = %definition.name, error = %e, "{}", analysis::PASS_FAILED);
            return AnalysisEvent::pass_error(definition, e);
        }
    };

    match parse_payload(definition, &raw) {
        Ok((data, reasoning)) => {
            let elapsed = started.elapsed();
            info!(pass = %definition.name, elapsed_ms = elapsed.as_millis() as u64, "{}", analysis::PASS_COMPLETED);
            AnalysisEvent::pass_complete(definition, data, reasoning, elapsed)
        }
        Err(error) => {
            let elapsed = started.elapsed();
            warn!(pass = %definition.name, error = %error, "{}", analysis::PASS_PARSE_WARNING);
            let data = json!({
                "error": error,
                "raw": truncate_chars(&raw, MAX_RAW_ECHO_CHARS),
            });
            AnalysisEvent::pass_parse_warning(definition, data, elapsed)
        }
    }
}

/// Parse completion text into the pass's payload and its reasoning steps
///
/// Non-JSON text and JSON that does not fit the pass's record are both
/// payload errors.
fn parse_payload(
    definition: &PassDefinition,
    raw: &str,
) -> Result<(Value, Vec<String>), String> {
    let cleaned = strip_code_fences(raw);
    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| format!("JSON parse error: {e}"))?;

    if !value.is_object() {
        return Err("JSON parse error: expected a JSON object".to_string());
    }

    let report = PassReport::parse(definition.name, value.clone()).map_err(|e| {
        format!(
            "Payload does not match the {} schema: {e}",
            definition.name
        )
    })?;

    Ok((value, report.reasoning_steps().to_vec()))
}
