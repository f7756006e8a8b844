//! The fixed set of analysis passes
//!
//! Six passes, defined once at process start and never mutated. A pass's
//! [`PassName`] is its stable key everywhere: on the wire, in the result
//! set, and in the cache.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable key of an analysis pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassName {
    SystemOverview,
    SetupRiskRadar,
    FailureTimeline,
    SecurityRisk,
    SafeRunPlan,
    RecoveryStrategy,
}

impl PassName {
    pub const ALL: [PassName; 6] = [
        PassName::SystemOverview,
        PassName::SetupRiskRadar,
        PassName::FailureTimeline,
        PassName::SecurityRisk,
        PassName::SafeRunPlan,
        PassName::RecoveryStrategy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PassName::SystemOverview => "system_overview",
            PassName::SetupRiskRadar => "setup_risk_radar",
            PassName::FailureTimeline => "failure_timeline",
            PassName::SecurityRisk => "security_risk",
            PassName::SafeRunPlan => "safe_run_plan",
            PassName::RecoveryStrategy => "recovery_strategy",
        }
    }

    pub fn definition(&self) -> &'static PassDefinition {
        // ALL and PASS_DEFINITIONS share an order
        &PASS_DEFINITIONS[self.index()]
    }

    /// 1-based position in the pass table
    pub fn number(&self) -> u32 {
        self.index() as u32 + 1
    }

    fn index(&self) -> usize {
        match self {
            PassName::SystemOverview => 0,
            PassName::SetupRiskRadar => 1,
            PassName::FailureTimeline => 2,
            PassName::SecurityRisk => 3,
            PassName::SafeRunPlan => 4,
            PassName::RecoveryStrategy => 5,
        }
    }
}

impl fmt::Display for PassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassDefinition {
    pub name: PassName,
    pub title: &'static str,
    pub template: &'static str,
}

impl PassDefinition {
    pub fn number(&self) -> u32 {
        self.name.number()
    }
}

pub static PASS_DEFINITIONS: [PassDefinition; 6] = [
    PassDefinition {
        name: PassName::SystemOverview,
        title: "The Big Picture",
        template: include_str!("../prompts/templates/system_overview.txt"),
    },
    PassDefinition {
        name: PassName::SetupRiskRadar,
        title: "Getting Started",
        template: include_str!("../prompts/templates/setup_risk_radar.txt"),
    },
    PassDefinition {
        name: PassName::FailureTimeline,
        title: "What Could Go Wrong",
        template: include_str!("../prompts/templates/failure_timeline.txt"),
    },
    PassDefinition {
        name: PassName::SecurityRisk,
        title: "Safety Check",
        template: include_str!("../prompts/templates/security_risk.txt"),
    },
    PassDefinition {
        name: PassName::SafeRunPlan,
        title: "Let's Run It",
        template: include_str!("../prompts/templates/safe_run_plan.txt"),
    },
    PassDefinition {
        name: PassName::RecoveryStrategy,
        title: "If Things Break",
        template: include_str!("../prompts/templates/recovery_strategy.txt"),
    },
];
