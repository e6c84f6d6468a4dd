//! Sleep assessment pipeline: answer validation, weighted disorder scoring, diagnosis
//! activation, and diagnosis-gated coaching rules.
//!
//! An [`AnswerRecord`] flows through [`ScoringEngine`] into [`ActiveDiagnoses`], and the
//! [`CoachingEngine`] matches the loaded [`RuleSet`] against both. [`AssessmentService`]
//! runs the whole pass for the HTTP router, the CLI and CSV imports.

pub mod activation;
pub mod coaching;
pub mod domain;
pub mod import;
pub mod router;
pub mod schema;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use activation::{activate, ActiveDiagnoses, ACTIVATION_THRESHOLD};
pub use coaching::{
    evaluate_all, AdviceItem, AdviceSeverity, CoachingEngine, CoachingOutcome, Condition,
    ConditionError, ConfigLoadError, ContextGate, Operator, Rule, RuleIssue, RuleSet,
    SkippedRule,
};
pub use domain::{AnswerError, AnswerRecord, AnswerRecordBuilder, AnswerValue, Disorder};
pub use import::{parse_answer_sheet, parse_answer_sheet_path, AnswerSheetRow, ImportError};
pub use router::assessment_router;
pub use schema::{QuestionKind, QuestionView};
pub use scoring::{score, DisorderScore, DisorderScores, RiskBand, ScoringEngine, ScoringError};
pub use service::{AssessmentError, AssessmentReport, AssessmentService};
