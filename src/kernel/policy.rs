use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::nlu::catalog::{Catalog, IntentCategory};

/// Process-wide security configuration. Read once per resolution and passed
/// in explicitly, never cached inside the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    /// Only safe actions run unattended; restricted actions are refused.
    Strict,
    /// Caution-tier actions run unattended; restricted ones ask first.
    Trust,
    /// Everything runs unattended.
    Full,
}

/// Impact classification of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Read-only or trivially reversible (volume, task list).
    Safe,
    /// Reversible but impactful (file move, app close).
    Caution,
    /// Destructive, irreversible or security-sensitive (delete, shutdown).
    Restricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    NeedsConfirmation,
    Refused,
}

/// Pure decision gate: (risk tier, security mode) -> decision. No side
/// effects, no stored mode. Tier lookup is the catalog default unless an
/// explicit override pins a category (e.g. shutdown stays restricted no
/// matter what the table says).
pub struct TrustPolicy {
    defaults: HashMap<IntentCategory, RiskTier>,
    overrides: HashMap<IntentCategory, RiskTier>,
}

impl TrustPolicy {
    pub fn new(catalog: &Catalog, overrides: HashMap<IntentCategory, RiskTier>) -> Self {
        let defaults = catalog
            .entries()
            .iter()
            .map(|spec| (spec.category, spec.default_tier))
            .collect();
        Self { defaults, overrides }
    }

    pub fn tier_for(&self, category: IntentCategory) -> RiskTier {
        if let Some(tier) = self.overrides.get(&category) {
            return *tier;
        }
        self.defaults
            .get(&category)
            .copied()
            .unwrap_or(RiskTier::Restricted)
    }

    pub fn evaluate(&self, tier: RiskTier, mode: SecurityMode) -> GateDecision {
        match tier {
            RiskTier::Safe => GateDecision::Proceed,
            RiskTier::Caution => match mode {
                SecurityMode::Trust | SecurityMode::Full => GateDecision::Proceed,
                SecurityMode::Strict => GateDecision::NeedsConfirmation,
            },
            RiskTier::Restricted => match mode {
                SecurityMode::Full => GateDecision::Proceed,
                SecurityMode::Trust => GateDecision::NeedsConfirmation,
                SecurityMode::Strict => GateDecision::Refused,
            },
        }
    }
}
