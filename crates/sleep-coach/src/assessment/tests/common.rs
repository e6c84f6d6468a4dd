use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use serde_json::{Map, Value};

use crate::assessment::domain::{AnswerRecord, AnswerValue, Disorder};
use crate::assessment::scoring::ScoringEngine;
use crate::assessment::{assessment_router, AssessmentService, RuleSet};

pub(super) const SHIPPED_RULES: &str = include_str!("../../../../../config/coaching_rules.json");

pub(super) fn shipped_rules() -> RuleSet {
    RuleSet::from_json_str(SHIPPED_RULES).expect("shipped rules load")
}

pub(super) fn rules(json: &str) -> RuleSet {
    RuleSet::from_json_str(json).expect("test rules load")
}

pub(super) fn symptom_ids() -> impl Iterator<Item = &'static str> {
    ScoringEngine::standard()
        .profiles()
        .iter()
        .flat_map(|profile| profile.symptoms.iter().map(|symptom| symptom.question))
}

pub(super) fn symptoms_of(disorder: Disorder) -> Vec<&'static str> {
    ScoringEngine::standard()
        .profiles()
        .iter()
        .filter(|profile| profile.disorder == disorder)
        .flat_map(|profile| profile.symptoms.iter().map(|symptom| symptom.question))
        .collect()
}

/// Every symptom question answered at `baseline`, then `overrides` applied on top.
pub(super) fn answers_at(baseline: u8, overrides: &[(&'static str, AnswerValue)]) -> AnswerRecord {
    let mut values: BTreeMap<&str, AnswerValue> = symptom_ids()
        .map(|id| (id, AnswerValue::Ordinal(baseline)))
        .collect();
    for (id, value) in overrides {
        values.insert(*id, value.clone());
    }

    let mut builder = AnswerRecord::builder();
    for (id, value) in values {
        builder.insert(id, value).expect("valid answer");
    }
    builder.build()
}

pub(super) fn answers(overrides: &[(&'static str, AnswerValue)]) -> AnswerRecord {
    answers_at(1, overrides)
}

/// Overrides rating every symptom of `disorder` at `rating`.
pub(super) fn rated(disorder: Disorder, rating: u8) -> Vec<(&'static str, AnswerValue)> {
    symptoms_of(disorder)
        .into_iter()
        .map(|id| (id, AnswerValue::Ordinal(rating)))
        .collect()
}

pub(super) fn answers_json(overrides: &[(&str, Value)]) -> Map<String, Value> {
    let mut map: Map<String, Value> = symptom_ids()
        .map(|id| (id.to_string(), Value::from(1)))
        .collect();
    for (id, value) in overrides {
        map.insert((*id).to_string(), value.clone());
    }
    map
}

pub(super) fn build_service() -> AssessmentService {
    AssessmentService::new(shipped_rules())
}

pub(super) fn router_with_service(service: AssessmentService) -> axum::Router {
    assessment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
