//! Client state and the pure folds that advance it
//!
//! `reduce_analysis` and `reduce_discovery` take the previous state by value
//! and return the next one. They never perform I/O, so any interleaving of
//! network reads that yields the same event sequence yields the same state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::discovery::DiscoveryResult;
use crate::domain::passes::{PassName, PASS_DEFINITIONS};
use crate::domain::payloads::{AnalysisResults, PassResult};
use crate::domain::validation_constants::client_state::REASONING_WINDOW;
use crate::streaming::events::{AnalysisEvent, DiscoveryEvent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    #[default]
    Idle,
    Analyzing,
    Complete,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisState {
    pub status: AnalysisStatus,
    /// Passes settled so far, by success or by error
    pub current_pass_number: usize,
    pub total_passes: usize,
    pub current_pass_name: Option<PassName>,
    pub message: String,
    /// Trailing reasoning steps across the passes seen so far
    pub reasoning: Vec<String>,
    pub results: AnalysisResults,
    /// Per-pass failure messages, for the panel placeholders
    pub pass_errors: BTreeMap<PassName, String>,
    pub error_message: Option<String>,
}

impl AnalysisState {
    /// State at the start of a fresh network session
    pub fn analyzing() -> Self {
        Self {
            status: AnalysisStatus::Analyzing,
            total_passes: PASS_DEFINITIONS.len(),
            message: "Fetching repository content...".to_string(),
            ..Self::default()
        }
    }

    /// Completed state rebuilt from a cache entry
    pub fn from_cache(results: AnalysisResults) -> Self {
        Self {
            status: AnalysisStatus::Complete,
            current_pass_number: PASS_DEFINITIONS.len(),
            total_passes: PASS_DEFINITIONS.len(),
            message: "Loaded from cache".to_string(),
            results,
            ..Self::default()
        }
    }

    /// Session-level failure outside the event stream
    pub fn failed(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.status = AnalysisStatus::Error;
        self.message = format!("Error: {detail}");
        self.error_message = Some(detail);
        self
    }

    pub fn is_settled(&self, pass: PassName) -> bool {
        self.results.contains(pass) || self.pass_errors.contains_key(&pass)
    }

    fn settled_count(&self) -> usize {
        PassName::ALL
            .into_iter()
            .filter(|pass| self.is_settled(*pass))
            .count()
    }
}

pub fn reduce_analysis(mut state: AnalysisState, event: &AnalysisEvent) -> AnalysisState {
    match event {
        AnalysisEvent::AnalysisStart {
            message,
            total_passes,
        } => {
            state.message = message.clone();
            state.total_passes = *total_passes;
        }
        AnalysisEvent::PassComplete {
            pass_name,
            data,
            reasoning,
            message,
            ..
        } => {
            state
                .results
                .insert(*pass_name, PassResult::from_wire(*pass_name, data.clone()));
            state.current_pass_name = Some(*pass_name);
            state.message = message.clone();
            extend_window(&mut state.reasoning, reasoning);
            state.current_pass_number = state.settled_count();
        }
        AnalysisEvent::Error {
            pass_name: Some(pass_name),
            message,
            ..
        } => {
            state.pass_errors.insert(*pass_name, message.clone());
            state.current_pass_name = Some(*pass_name);
            state.message = message.clone();
            state.current_pass_number = state.settled_count();
        }
        AnalysisEvent::Error {
            pass_name: None,
            message,
            ..
        } => {
            state.status = AnalysisStatus::Error;
            state.message = message.clone();
            state.error_message = Some(message.clone());
        }
        AnalysisEvent::Done { message } => {
            if state.status != AnalysisStatus::Error {
                state.status = AnalysisStatus::Complete;
            }
            state.message = message.clone();
        }
    }
    state
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStatus {
    #[default]
    Idle,
    Searching,
    Complete,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryState {
    pub status: DiscoveryStatus,
    pub message: String,
    pub reasoning: Vec<String>,
    pub result: Option<DiscoveryResult>,
    pub error: Option<String>,
}

impl DiscoveryState {
    pub fn searching() -> Self {
        Self {
            status: DiscoveryStatus::Searching,
            message: "Starting discovery...".to_string(),
            ..Self::default()
        }
    }

    pub fn failed(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.status = DiscoveryStatus::Error;
        self.message = format!("Error: {detail}");
        self.error = Some(detail);
        self
    }
}

pub fn reduce_discovery(mut state: DiscoveryState, event: &DiscoveryEvent) -> DiscoveryState {
    match event {
        DiscoveryEvent::DiscoveryStart { message } | DiscoveryEvent::DiscoveryThinking { message } => {
            state.message = message.clone();
        }
        DiscoveryEvent::DiscoveryComplete {
            data,
            reasoning,
            message,
            ..
        } => match serde_json::from_value::<DiscoveryResult>(data.clone()) {
            Ok(result) => {
                state.result = Some(result);
                state.message = message.clone();
                extend_window(&mut state.reasoning, reasoning);
            }
            Err(e) => {
                let detail = format!("Failed to parse recommendations: {e}");
                state.status = DiscoveryStatus::Error;
                state.message = detail.clone();
                state.error = Some(detail);
            }
        },
        DiscoveryEvent::Error { message } => {
            state.status = DiscoveryStatus::Error;
            state.message = message.clone();
            state.error = Some(message.clone());
        }
        DiscoveryEvent::Done { message } => {
            if state.status != DiscoveryStatus::Error {
                state.status = DiscoveryStatus::Complete;
            }
            state.message = message.clone();
        }
    }
    state
}

fn extend_window(window: &mut Vec<String>, steps: &[String]) {
    window.extend(steps.iter().cloned());
    if window.len() > REASONING_WINDOW {
        window.drain(..window.len() - REASONING_WINDOW);
    }
}
