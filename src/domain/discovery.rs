//! Discovery mode: a free-text request for repositories and the ranked
//! recommendations that come back for it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::types::{DiscoveryQuery, MaxResults};

/// Optional narrowing applied to a discovery query
///
/// Empty fields mean "no preference".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryFilters {
    pub languages: Vec<String>,
    pub domain: String,
    pub scale: String,
    pub license_preference: String,
    pub actively_maintained: Option<bool>,
}

/// A validated discovery request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub query: DiscoveryQuery,
    pub filters: DiscoveryFilters,
    pub max_results: MaxResults,
}

impl DiscoveryRequest {
    pub fn new(query: DiscoveryQuery) -> Self {
        Self {
            query,
            filters: DiscoveryFilters::default(),
            max_results: MaxResults::default(),
        }
    }

    pub fn with_filters(mut self, filters: DiscoveryFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_max_results(mut self, max_results: MaxResults) -> Self {
        self.max_results = max_results;
        self
    }
}

/// One recommended repository
///
/// Numeric fields come from model output and are read leniently: floats are
/// rounded, numeric strings are parsed, and anything else reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendedRepo {
    #[serde(deserialize_with = "lenient_rank")]
    pub rank: u32,
    pub repo_name: String,
    pub github_url: String,
    #[serde(deserialize_with = "lenient_stars")]
    pub stars: u64,
    pub language: String,
    pub license: String,
    pub description: String,
    pub reasoning: String,
    pub strengths: Vec<String>,
    pub considerations: Vec<String>,
    /// 0 to 100
    #[serde(deserialize_with = "lenient_match_score")]
    pub match_score: u8,
    pub tags: Vec<String>,
}

/// Finite, non-negative number from a JSON number or numeric string
fn loose_number(value: Option<Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number.max(0.0).round())
}

fn lenient_rank<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(loose_number(value).map_or(0, |n| n.min(f64::from(u32::MAX)) as u32))
}

fn lenient_stars<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(loose_number(value).map_or(0, |n| n as u64))
}

fn lenient_match_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(loose_number(value).map_or(0, |n| n.min(100.0) as u8))
}

/// Parsed payload of a `discovery_complete` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryResult {
    pub reasoning_steps: Vec<String>,
    pub query_interpretation: String,
    pub summary: String,
    pub recommendations: Vec<RecommendedRepo>,
}

impl DiscoveryResult {
    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}
