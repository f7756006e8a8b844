//! Structured payloads produced by the six analysis passes
//!
//! Each pass has its own record type. [`PassReport`] is the tagged union over
//! them, keyed by [`PassName`], and [`AnalysisResults`] is the partial map
//! from pass to outcome that the client accumulates as passes complete.
//!
//! Records are lenient about missing fields (everything defaults) but strict
//! about shape: JSON that parses yet contradicts a record is a payload error.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::domain::passes::PassName;

/// Four-step rating shared by several passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Likelihood {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineStatus {
    #[default]
    Ok,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepRisk {
    #[default]
    Safe,
    Caution,
    Danger,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataLossRisk {
    #[default]
    None,
    Partial,
    Complete,
}

// ========== Pass 1: system overview ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemOverview {
    pub reasoning_steps: Vec<String>,
    pub purpose: String,
    pub components: Vec<Component>,
    pub architecture_type: String,
    pub data_flows: Vec<String>,
    pub key_dependencies: Vec<KeyDependency>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    pub name: String,
    pub description: String,
    pub tech: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyDependency {
    pub name: String,
    pub purpose: String,
}

// ========== Pass 2: setup risk radar ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupRiskRadar {
    pub reasoning_steps: Vec<String>,
    pub overall_risk: RiskLevel,
    pub risks: Vec<SetupRisk>,
    pub env_requirements: Vec<EnvRequirement>,
    pub estimated_setup_time: String,
    pub complexity_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupRisk {
    pub category: String,
    pub title: String,
    pub description: String,
    pub severity: RiskLevel,
    pub likelihood: Likelihood,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvRequirement {
    pub name: String,
    pub required: bool,
    pub notes: String,
}

// ========== Pass 3: failure timeline ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureTimeline {
    pub reasoning_steps: Vec<String>,
    pub timeline: Vec<TimelineEntry>,
    pub overall_survival_rate: String,
    pub critical_period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEntry {
    pub time_label: String,
    pub title: String,
    pub description: String,
    pub status: TimelineStatus,
    pub probability: String,
    pub mitigation: String,
}

// ========== Pass 4: security risk ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityRisk {
    pub reasoning_steps: Vec<String>,
    pub security_rating: RiskLevel,
    pub findings: Vec<SecurityFinding>,
    pub positive_practices: Vec<String>,
    pub missing_protections: Vec<String>,
    pub data_exposure_risk: String,
    pub supply_chain_risk: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityFinding {
    pub title: String,
    pub severity: FindingSeverity,
    pub description: String,
    pub recommendation: String,
}

// ========== Pass 5: safe run plan ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeRunPlan {
    pub reasoning_steps: Vec<String>,
    pub steps: Vec<RunStep>,
    pub env_vars: Vec<EnvVar>,
    pub sandbox_recommendation: String,
    pub smoke_test: SmokeTest,
    pub estimated_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStep {
    pub step_number: u32,
    pub title: String,
    pub commands: Vec<String>,
    pub notes: String,
    pub risk_level: StepRisk,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvVar {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub example: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeTest {
    pub command: String,
    pub expected_output: String,
}

// ========== Pass 6: recovery strategy ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryStrategy {
    pub reasoning_steps: Vec<String>,
    pub rollback_plan: Vec<RollbackStep>,
    pub recovery_scenarios: Vec<RecoveryScenario>,
    pub nuclear_option: NuclearOption,
    pub monitoring_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollbackStep {
    pub step_number: u32,
    pub action: String,
    pub command: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryScenario {
    pub scenario: String,
    pub severity: RiskLevel,
    pub steps: Vec<String>,
    pub estimated_recovery_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NuclearOption {
    pub description: String,
    pub steps: Vec<String>,
    pub data_loss_risk: DataLossRisk,
}

// ========== Tagged union ==========

/// One pass's parsed payload, tagged by the pass that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum PassReport {
    SystemOverview(SystemOverview),
    SetupRiskRadar(SetupRiskRadar),
    FailureTimeline(FailureTimeline),
    SecurityRisk(SecurityRisk),
    SafeRunPlan(SafeRunPlan),
    RecoveryStrategy(RecoveryStrategy),
}

impl PassReport {
    /// Interpret a JSON value as the payload of `pass`
    pub fn parse(pass: PassName, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match pass {
            PassName::SystemOverview => Self::SystemOverview(serde_json::from_value(value)?),
            PassName::SetupRiskRadar => Self::SetupRiskRadar(serde_json::from_value(value)?),
            PassName::FailureTimeline => Self::FailureTimeline(serde_json::from_value(value)?),
            PassName::SecurityRisk => Self::SecurityRisk(serde_json::from_value(value)?),
            PassName::SafeRunPlan => Self::SafeRunPlan(serde_json::from_value(value)?),
            PassName::RecoveryStrategy => Self::RecoveryStrategy(serde_json::from_value(value)?),
        })
    }

    pub fn pass(&self) -> PassName {
        match self {
            Self::SystemOverview(_) => PassName::SystemOverview,
            Self::SetupRiskRadar(_) => PassName::SetupRiskRadar,
            Self::FailureTimeline(_) => PassName::FailureTimeline,
            Self::SecurityRisk(_) => PassName::SecurityRisk,
            Self::SafeRunPlan(_) => PassName::SafeRunPlan,
            Self::RecoveryStrategy(_) => PassName::RecoveryStrategy,
        }
    }

    pub fn reasoning_steps(&self) -> &[String] {
        match self {
            Self::SystemOverview(r) => &r.reasoning_steps,
            Self::SetupRiskRadar(r) => &r.reasoning_steps,
            Self::FailureTimeline(r) => &r.reasoning_steps,
            Self::SecurityRisk(r) => &r.reasoning_steps,
            Self::SafeRunPlan(r) => &r.reasoning_steps,
            Self::RecoveryStrategy(r) => &r.reasoning_steps,
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::SystemOverview(r) => serde_json::to_value(r),
            Self::SetupRiskRadar(r) => serde_json::to_value(r),
            Self::FailureTimeline(r) => serde_json::to_value(r),
            Self::SecurityRisk(r) => serde_json::to_value(r),
            Self::SafeRunPlan(r) => serde_json::to_value(r),
            Self::RecoveryStrategy(r) => serde_json::to_value(r),
        }
    }
}

/// Payload of a pass whose completion could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedPayload {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl DegradedPayload {
    pub fn to_value(&self) -> Value {
        match &self.raw {
            Some(raw) => json!({ "error": self.error, "raw": raw }),
            None => json!({ "error": self.error }),
        }
    }
}

/// What a completed pass contributed to the result set
#[derive(Debug, Clone, PartialEq)]
pub enum PassResult {
    Report(PassReport),
    Degraded(DegradedPayload),
}

impl PassResult {
    /// Interpret the `data` field of a `pass_complete` event
    ///
    /// A payload carrying a string `error` is the orchestrator's degraded
    /// shape. Anything else must fit the pass's record; if it does not, it is
    /// kept as a degraded entry so the panel still renders.
    pub fn from_wire(pass: PassName, data: Value) -> Self {
        if let Some(error) = data.get("error").and_then(Value::as_str) {
            return Self::Degraded(DegradedPayload {
                error: error.to_string(),
                raw: data.get("raw").and_then(Value::as_str).map(str::to_string),
            });
        }

        match PassReport::parse(pass, data) {
            Ok(report) => Self::Report(report),
            Err(e) => Self::Degraded(DegradedPayload {
                error: format!("Payload does not match the {pass} schema: {e}"),
                raw: None,
            }),
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Report(report) => report.to_value(),
            Self::Degraded(degraded) => Ok(degraded.to_value()),
        }
    }

    pub fn report(&self) -> Option<&PassReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Degraded(_) => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// Partial mapping from pass to its outcome
///
/// Keys are only ever [`PassName`]s, so a result set cannot hold an entry for
/// a pass outside the definition table. Entries are added, never removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<PassName, Value>",
    into = "BTreeMap<PassName, Value>"
)]
pub struct AnalysisResults {
    entries: BTreeMap<PassName, PassResult>,
}

impl AnalysisResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pass: PassName, result: PassResult) {
        self.entries.insert(pass, result);
    }

    /// Copy with one more entry; the receiver is left untouched
    pub fn with(&self, pass: PassName, result: PassResult) -> Self {
        let mut next = self.clone();
        next.insert(pass, result);
        next
    }

    pub fn get(&self, pass: PassName) -> Option<&PassResult> {
        self.entries.get(&pass)
    }

    pub fn contains(&self, pass: PassName) -> bool {
        self.entries.contains_key(&pass)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn system_overview(&self) -> Option<&SystemOverview> {
        match self.report(PassName::SystemOverview)? {
            PassReport::SystemOverview(r) => Some(r),
            _ => None,
        }
    }

    pub fn setup_risk_radar(&self) -> Option<&SetupRiskRadar> {
        match self.report(PassName::SetupRiskRadar)? {
            PassReport::SetupRiskRadar(r) => Some(r),
            _ => None,
        }
    }

    pub fn failure_timeline(&self) -> Option<&FailureTimeline> {
        match self.report(PassName::FailureTimeline)? {
            PassReport::FailureTimeline(r) => Some(r),
            _ => None,
        }
    }

    pub fn security_risk(&self) -> Option<&SecurityRisk> {
        match self.report(PassName::SecurityRisk)? {
            PassReport::SecurityRisk(r) => Some(r),
            _ => None,
        }
    }

    pub fn safe_run_plan(&self) -> Option<&SafeRunPlan> {
        match self.report(PassName::SafeRunPlan)? {
            PassReport::SafeRunPlan(r) => Some(r),
            _ => None,
        }
    }

    pub fn recovery_strategy(&self) -> Option<&RecoveryStrategy> {
        match self.report(PassName::RecoveryStrategy)? {
            PassReport::RecoveryStrategy(r) => Some(r),
            _ => None,
        }
    }

    fn report(&self, pass: PassName) -> Option<&PassReport> {
        self.entries.get(&pass).and_then(PassResult::report)
    }
}

impl From<BTreeMap<PassName, Value>> for AnalysisResults {
    fn from(raw: BTreeMap<PassName, Value>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(pass, data)| (pass, PassResult::from_wire(pass, data)))
            .collect();
        Self { entries }
    }
}

impl From<AnalysisResults> for BTreeMap<PassName, Value> {
    fn from(results: AnalysisResults) -> Self {
        results
            .entries
            .into_iter()
            .map(|(pass, result)| {
                let value = result
                    .to_value()
                    .unwrap_or_else(|e| json!({ "error": e.to_string() }));
                (pass, value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overview_json() -> Value {
        json!({
            "reasoning_steps": ["read README", "inspected Cargo.toml"],
            "purpose": "An HTTP framework",
            "components": [{"name": "router", "description": "routes", "tech": ["tower"]}],
            "architecture_type": "library",
            "data_flows": ["request -> handler"],
            "key_dependencies": [{"name": "hyper", "purpose": "HTTP"}]
        })
    }

    #[test]
    fn parses_each_pass_into_its_record() {
        let report = PassReport::parse(PassName::SystemOverview, overview_json()).unwrap();
        assert_eq!(report.pass(), PassName::SystemOverview);
        assert_eq!(report.reasoning_steps().len(), 2);

        let radar = PassReport::parse(
            PassName::SetupRiskRadar,
            json!({"overall_risk": "high", "complexity_score": 7}),
        )
        .unwrap();
        match radar {
            PassReport::SetupRiskRadar(r) => {
                assert_eq!(r.overall_risk, RiskLevel::High);
                assert_eq!(r.complexity_score, 7.0);
            }
            other => panic!("unexpected report {other:?}"),
        }
    }

    #[test]
    fn missing_fields_default() {
        let report = PassReport::parse(PassName::RecoveryStrategy, json!({})).unwrap();
        assert!(report.reasoning_steps().is_empty());
    }

    #[test]
    fn contradicting_shape_is_an_error() {
        let result = PassReport::parse(
            PassName::SecurityRisk,
            json!({"security_rating": "apocalyptic"}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn from_wire_recognises_degraded_payloads() {
        let result = PassResult::from_wire(
            PassName::FailureTimeline,
            json!({"error": "JSON parse error: EOF", "raw": "{\"timeline\": ["}),
        );
        assert_eq!(
            result,
            PassResult::Degraded(DegradedPayload {
                error: "JSON parse error: EOF".into(),
                raw: Some("{\"timeline\": [".into()),
            })
        );
    }

    #[test]
    fn from_wire_degrades_schema_mismatches() {
        let result = PassResult::from_wire(PassName::SafeRunPlan, json!({"steps": "run it"}));
        assert!(result.is_degraded());
    }

    #[test]
    fn results_expose_typed_accessors() {
        let results = AnalysisResults::new().with(
            PassName::SystemOverview,
            PassResult::from_wire(PassName::SystemOverview, overview_json()),
        );

        assert_eq!(results.len(), 1);
        assert_eq!(
            results.system_overview().map(|o| o.purpose.as_str()),
            Some("An HTTP framework")
        );
        assert!(results.security_risk().is_none());
    }

    #[test]
    fn with_leaves_the_original_untouched() {
        let empty = AnalysisResults::new();
        let one = empty.with(
            PassName::SecurityRisk,
            PassResult::from_wire(PassName::SecurityRisk, json!({})),
        );
        assert!(empty.is_empty());
        assert!(one.contains(PassName::SecurityRisk));
    }

    #[test]
    fn results_serialize_as_a_map_keyed_by_pass_name() {
        let results = AnalysisResults::new()
            .with(
                PassName::SystemOverview,
                PassResult::from_wire(PassName::SystemOverview, overview_json()),
            )
            .with(
                PassName::SafeRunPlan,
                PassResult::Degraded(DegradedPayload {
                    error: "JSON parse error".into(),
                    raw: None,
                }),
            );

        let value = serde_json::to_value(&results).unwrap();
        assert_eq!(value["system_overview"]["purpose"], "An HTTP framework");
        assert_eq!(value["safe_run_plan"]["error"], "JSON parse error");

        let back: AnalysisResults = serde_json::from_value(value).unwrap();
        assert_eq!(back, results);
    }

    #[test]
    fn unknown_pass_keys_are_rejected() {
        let parsed: Result<AnalysisResults, _> =
            serde_json::from_value(json!({"architecture": {"purpose": "x"}}));
        assert!(parsed.is_err());
    }
}
