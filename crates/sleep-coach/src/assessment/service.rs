use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::activation::{activate, ActiveDiagnoses};
use super::coaching::{AdviceItem, AdviceSeverity, CoachingEngine, RuleSet, SkippedRule};
use super::domain::{AnswerError, AnswerRecord};
use super::scoring::{DisorderScores, ScoringEngine, ScoringError};

/// Service composing the scoring engine, diagnosis activation, and the coaching rules.
#[derive(Debug, Clone)]
pub struct AssessmentService {
    scoring: ScoringEngine,
    coaching: Arc<CoachingEngine>,
}

impl AssessmentService {
    pub fn new(rules: RuleSet) -> Self {
        Self::with_engine(ScoringEngine::standard(), Arc::new(CoachingEngine::new(rules)))
    }

    pub fn with_engine(scoring: ScoringEngine, coaching: Arc<CoachingEngine>) -> Self {
        Self { scoring, coaching }
    }

    pub fn coaching(&self) -> &CoachingEngine {
        &self.coaching
    }

    /// Run one full evaluation pass. Scoring failures abort the pass; rule failures only
    /// skip the rule.
    pub fn assess(&self, answers: &AnswerRecord) -> Result<AssessmentReport, AssessmentError> {
        let scores = self.scoring.score(answers)?;
        let active_diagnoses = activate(&scores);
        let outcome = self.coaching.evaluate(answers, &active_diagnoses);

        let advice = outcome.advice.into_iter().map(AdviceItem::new).collect();
        let report = AssessmentReport {
            scores,
            active_diagnoses,
            advice,
            fired_rules: outcome.fired,
            skipped_rules: outcome.skipped,
        };

        debug!(summary = %report.summary(), "assessment completed");
        Ok(report)
    }

    /// Validate a JSON answer object against the question schema, then assess it.
    pub fn assess_json(&self, answers: &Map<String, Value>) -> Result<AssessmentReport, AssessmentError> {
        let record = AnswerRecord::from_json(answers)?;
        self.assess(&record)
    }
}

/// Everything one assessment produces, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub scores: DisorderScores,
    pub active_diagnoses: ActiveDiagnoses,
    pub advice: Vec<AdviceItem>,
    pub fired_rules: Vec<String>,
    pub skipped_rules: Vec<SkippedRule>,
}

impl AssessmentReport {
    pub fn advice_texts(&self) -> impl Iterator<Item = &str> {
        self.advice.iter().map(|item| item.text.as_str())
    }

    pub fn urgent_advice(&self) -> impl Iterator<Item = &AdviceItem> {
        self.advice
            .iter()
            .filter(|item| item.severity == AdviceSeverity::Urgent)
    }

    /// One-line summary used in logs and CLI output.
    pub fn summary(&self) -> String {
        let active = if self.active_diagnoses.is_empty() {
            "none".to_string()
        } else {
            self.active_diagnoses.labels().join(", ")
        };
        format!(
            "active diagnoses: {active}; {} advice item(s); {} rule(s) skipped",
            self.advice.len(),
            self.skipped_rules.len()
        )
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Answers(#[from] AnswerError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}
