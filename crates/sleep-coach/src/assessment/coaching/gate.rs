use serde::Serialize;

use super::super::activation::ActiveDiagnoses;
use super::super::domain::Disorder;
use super::rules::Rule;

/// Require/block predicates tying a rule to the active diagnosis set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContextGate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Disorder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<Disorder>,
}

impl ContextGate {
    pub fn open() -> Self {
        Self::default()
    }

    /// Both checks apply independently: a required diagnosis must be active and a blocking
    /// diagnosis must not be.
    pub fn passes(&self, active: &ActiveDiagnoses) -> bool {
        let required_met = self
            .required
            .map_or(true, |disorder| active.contains(disorder));
        let not_blocked = self
            .blocked
            .map_or(true, |disorder| !active.contains(disorder));
        required_met && not_blocked
    }
}

pub fn passes(rule: &Rule, active: &ActiveDiagnoses) -> bool {
    rule.gate().passes(active)
}
