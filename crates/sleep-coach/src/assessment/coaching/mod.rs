mod advice;
mod condition;
mod gate;
mod rules;

pub use advice::{AdviceItem, AdviceSeverity};
pub use condition::{Comparison, Condition, ConditionError, ConditionSyntaxError, Operator};
pub use gate::{passes, ContextGate};
pub use rules::{ConfigLoadError, Rule, RuleIssue, RuleSet};

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::activation::ActiveDiagnoses;
use super::domain::AnswerRecord;

/// Rule that was skipped because its condition could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRule {
    pub rule_id: String,
    pub reason: String,
}

/// Result of running the rule set once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoachingOutcome {
    /// Deduplicated advice, sorted.
    pub advice: Vec<String>,
    /// Ids of the rules that fired, in rule-set order.
    pub fired: Vec<String>,
    pub skipped: Vec<SkippedRule>,
}

/// Evaluates the loaded rule set against answers and the active diagnoses.
#[derive(Debug, Clone)]
pub struct CoachingEngine {
    rules: Arc<RuleSet>,
}

impl CoachingEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self::from_shared(Arc::new(rules))
    }

    pub fn from_shared(rules: Arc<RuleSet>) -> Self {
        for issue in rules.check() {
            warn!(rule_id = %issue.rule_id, error = %issue.error, "coaching rule can never fire");
        }
        info!(rules = rules.len(), "coaching rules loaded");
        Self { rules }
    }

    pub fn evaluate(&self, answers: &AnswerRecord, active: &ActiveDiagnoses) -> CoachingOutcome {
        evaluate_rules(&self.rules, answers, active)
    }

    pub fn evaluate_all(&self, answers: &AnswerRecord, active: &ActiveDiagnoses) -> Vec<String> {
        self.evaluate(answers, active).advice
    }
}

/// Advice text of every rule whose condition and context gate both hold, deduplicated and
/// sorted.
pub fn evaluate_all(rules: &RuleSet, answers: &AnswerRecord, active: &ActiveDiagnoses) -> Vec<String> {
    evaluate_rules(rules, answers, active).advice
}

fn evaluate_rules(
    rules: &RuleSet,
    answers: &AnswerRecord,
    active: &ActiveDiagnoses,
) -> CoachingOutcome {
    let mut advice = BTreeSet::new();
    let mut fired = Vec::new();
    let mut skipped = Vec::new();

    for rule in rules.iter() {
        let condition_met = match rule.condition() {
            None => true,
            Some(condition) => match condition.evaluate(answers) {
                Ok(met) => met,
                Err(error) => {
                    warn!(rule_id = %rule.id(), %error, "skipping coaching rule");
                    skipped.push(SkippedRule {
                        rule_id: rule.id().to_string(),
                        reason: error.to_string(),
                    });
                    continue;
                }
            },
        };

        if condition_met && passes(rule, active) {
            fired.push(rule.id().to_string());
            advice.insert(rule.advice().to_string());
        }
    }

    debug!(
        fired = fired.len(),
        skipped = skipped.len(),
        advice = advice.len(),
        "coaching rules evaluated"
    );

    CoachingOutcome {
        advice: advice.into_iter().collect(),
        fired,
        skipped,
    }
}
