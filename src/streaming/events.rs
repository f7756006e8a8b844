//! Wire events carried by the analysis and discovery streams
//!
//! Every event serializes to a flat JSON object tagged by `event_type`.
//! `pass_name` is typed as [`PassName`], so a frame naming a pass outside
//! the definition table does not decode and is discarded by the client.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::domain::passes::{PassDefinition, PassName};

/// Seconds rounded to one decimal place, as reported in `elapsed`
pub fn elapsed_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AnalysisEvent {
    AnalysisStart {
        message: String,
        total_passes: usize,
    },
    PassComplete {
        pass_name: PassName,
        pass_number: u32,
        data: Value,
        #[serde(default)]
        reasoning: Vec<String>,
        message: String,
        #[serde(default)]
        elapsed: f64,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pass_name: Option<PassName>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pass_number: Option<u32>,
        message: String,
    },
    Done {
        message: String,
    },
}

impl AnalysisEvent {
    pub fn start(repo_name: &str, total_passes: usize) -> Self {
        Self::AnalysisStart {
            message: format!("Starting analysis of {repo_name}"),
            total_passes,
        }
    }

    pub fn pass_complete(
        definition: &PassDefinition,
        data: Value,
        reasoning: Vec<String>,
        elapsed: Duration,
    ) -> Self {
        let elapsed = elapsed_secs(elapsed);
        Self::PassComplete {
            pass_name: definition.name,
            pass_number: definition.number(),
            data,
            reasoning,
            message: format!("{} complete ({elapsed:.1}s)", definition.title),
            elapsed,
        }
    }

    /// A pass whose completion text was not usable JSON
    pub fn pass_parse_warning(definition: &PassDefinition, data: Value, elapsed: Duration) -> Self {
        let elapsed = elapsed_secs(elapsed);
        Self::PassComplete {
            pass_name: definition.name,
            pass_number: definition.number(),
            data,
            reasoning: Vec::new(),
            message: format!(
                "{} completed with parse warning ({elapsed:.1}s)",
                definition.title
            ),
            elapsed,
        }
    }

    pub fn pass_error(definition: &PassDefinition, detail: impl std::fmt::Display) -> Self {
        Self::Error {
            pass_name: Some(definition.name),
            pass_number: Some(definition.number()),
            message: format!("Error in {}: {detail}", definition.title),
        }
    }

    /// Error that is not attributable to any single pass
    pub fn fatal(detail: impl std::fmt::Display) -> Self {
        Self::Error {
            pass_name: None,
            pass_number: None,
            message: format!("Analysis failed: {detail}"),
        }
    }

    pub fn done() -> Self {
        Self::Done {
            message: "Analysis complete".to_string(),
        }
    }

    /// `pass_complete`, or an `error` scoped to a pass
    pub fn is_terminal_for_pass(&self) -> bool {
        matches!(
            self,
            Self::PassComplete { .. }
                | Self::Error {
                    pass_name: Some(_),
                    ..
                }
        )
    }

    pub fn pass_name(&self) -> Option<PassName> {
        match self {
            Self::PassComplete { pass_name, .. } => Some(*pass_name),
            Self::Error { pass_name, .. } => *pass_name,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum DiscoveryEvent {
    DiscoveryStart {
        message: String,
    },
    DiscoveryThinking {
        message: String,
    },
    DiscoveryComplete {
        data: Value,
        #[serde(default)]
        reasoning: Vec<String>,
        message: String,
        #[serde(default)]
        elapsed: f64,
    },
    Error {
        message: String,
    },
    Done {
        message: String,
    },
}

impl DiscoveryEvent {
    pub fn start() -> Self {
        Self::DiscoveryStart {
            message: "Searching for matching open source projects...".to_string(),
        }
    }

    pub fn thinking() -> Self {
        Self::DiscoveryThinking {
            message: "Analyzing your requirements and finding the best matches...".to_string(),
        }
    }

    pub fn complete(
        data: Value,
        reasoning: Vec<String>,
        recommendations: usize,
        elapsed: Duration,
    ) -> Self {
        let elapsed = elapsed_secs(elapsed);
        Self::DiscoveryComplete {
            data,
            reasoning,
            message: format!("Found {recommendations} recommendations ({elapsed:.1}s)"),
            elapsed,
        }
    }

    pub fn parse_failure(detail: impl std::fmt::Display) -> Self {
        Self::Error {
            message: format!("Failed to parse recommendations: {detail}"),
        }
    }

    pub fn failure(detail: impl std::fmt::Display) -> Self {
        Self::Error {
            message: format!("Discovery error: {detail}"),
        }
    }

    pub fn done() -> Self {
        Self::Done {
            message: "Discovery complete".to_string(),
        }
    }
}
