//! Integration specifications for the sleep assessment workflow.
//!
//! Scenarios run the shipped coaching rules through the public service facade, the CSV import
//! and the HTTP router, without reaching into private modules.

mod common {
    use std::sync::Arc;

    use serde_json::{Map, Value};

    use sleep_coach::assessment::{AssessmentService, RuleSet, ScoringEngine};

    pub(super) const RULES_PATH: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/coaching_rules.json");

    pub(super) fn rules() -> RuleSet {
        RuleSet::from_path(RULES_PATH).expect("shipped rules load")
    }

    pub(super) fn service() -> Arc<AssessmentService> {
        Arc::new(AssessmentService::new(rules()))
    }

    pub(super) fn symptom_ids() -> Vec<&'static str> {
        ScoringEngine::standard()
            .profiles()
            .iter()
            .flat_map(|profile| profile.symptoms.iter().map(|symptom| symptom.question))
            .collect()
    }

    /// All symptoms rated 1 unless listed in `overrides`.
    pub(super) fn answers(overrides: &[(&str, Value)]) -> Map<String, Value> {
        let mut map: Map<String, Value> = symptom_ids()
            .into_iter()
            .map(|id| (id.to_string(), Value::from(1)))
            .collect();
        for (id, value) in overrides {
            map.insert((*id).to_string(), value.clone());
        }
        map
    }
}

mod scoring {
    use super::common::*;
    use serde_json::json;
    use sleep_coach::assessment::{AssessmentError, Disorder, RiskBand, ScoringError};

    #[test]
    fn insomnia_profile_activates_and_gates_advice() {
        let report = service()
            .assess_json(&answers(&[
                ("insomnia_fall", json!(5)),
                ("insomnia_stay", json!(5)),
                ("insomnia_early", json!(5)),
                ("insomnia_tired", json!(5)),
                ("mood_change", json!(5)),
            ]))
            .expect("assessment succeeds");

        let insomnia = report.scores.get(Disorder::Insomnia).expect("scored");
        assert_eq!(insomnia.confidence, 100.0);
        assert_eq!(insomnia.risk, RiskBand::High);
        assert!(report.active_diagnoses.contains(Disorder::Insomnia));

        assert!(report.fired_rules.iter().any(|id| id == "insomnia_mood"));
        assert!(!report.fired_rules.iter().any(|id| id == "mood_link"));
        assert_eq!(
            report
                .advice_texts()
                .filter(|text| text.contains("point to insomnia"))
                .count(),
            1
        );
    }

    #[test]
    fn baseline_answers_leave_every_disorder_inactive() {
        let report = service()
            .assess_json(&answers(&[]))
            .expect("assessment succeeds");
        assert!(report.active_diagnoses.is_empty());
        assert!(report.scores.iter().all(|score| score.confidence == 0.0));
        assert!(report.advice.is_empty());
    }

    #[test]
    fn unanswered_symptom_is_surfaced() {
        let mut partial = answers(&[]);
        partial.remove("rls_urge");

        match service().assess_json(&partial) {
            Err(AssessmentError::Scoring(ScoringError::MissingField { question, .. })) => {
                assert_eq!(question, "rls_urge");
            }
            other => panic!("expected missing field, got {other:?}"),
        }
    }
}

mod coaching {
    use super::common::*;
    use sleep_coach::assessment::{
        evaluate_all, ActiveDiagnoses, AnswerRecord, ConfigLoadError, Disorder, RuleSet,
    };

    #[test]
    fn caffeine_rule_fires_at_three() {
        let answers = AnswerRecord::builder()
            .answer("caffeine_pm", 3u8)
            .expect("valid answer")
            .build();

        let advice = evaluate_all(&rules(), &answers, &ActiveDiagnoses::none());
        assert_eq!(advice.len(), 1);
        assert!(advice[0].starts_with("CAFFEINE:"));
    }

    #[test]
    fn disorder_specific_advice_needs_the_diagnosis() {
        let empty = AnswerRecord::default();
        let rules = rules();

        assert!(evaluate_all(&rules, &empty, &ActiveDiagnoses::none()).is_empty());

        let active: ActiveDiagnoses = [Disorder::RestlessLegsSyndrome].into_iter().collect();
        let advice = evaluate_all(&rules, &empty, &active);
        assert_eq!(advice.len(), 1);
        assert!(advice[0].contains("ferritin"));
    }

    #[test]
    fn missing_rules_file_is_fatal() {
        let error = RuleSet::from_path("config/does-not-exist.json").unwrap_err();
        assert!(matches!(error, ConfigLoadError::Io { .. }));
    }
}

mod import {
    use super::common::*;
    use sleep_coach::assessment::parse_answer_sheet;

    #[test]
    fn answer_sheet_rows_assess_independently() {
        let ids = symptom_ids();
        let low = vec!["1"; ids.len()].join(",");
        let high = vec!["5"; ids.len()].join(",");
        let csv = format!(
            "respondent,{}\nquiet,{low}\nrestless,{high}\n",
            ids.join(",")
        );

        let rows = parse_answer_sheet(csv.as_bytes()).expect("sheet parses");
        let service = service();
        let reports: Vec<_> = rows
            .iter()
            .map(|row| service.assess(&row.answers).expect("assessment succeeds"))
            .collect();

        assert_eq!(rows[0].respondent.as_deref(), Some("quiet"));
        assert!(reports[0].active_diagnoses.is_empty());
        assert_eq!(reports[1].active_diagnoses.len(), 6);
    }
}

mod routing {
    use super::common::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use sleep_coach::assessment::assessment_router;
    use tower::ServiceExt;

    async fn post_answers(answers: Value) -> (StatusCode, Value) {
        let router = assessment_router(service());
        let response = router
            .oneshot(
                Request::post("/api/v1/assessments")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&json!({ "answers": answers })).unwrap(),
                    ))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).expect("json payload"))
    }

    #[tokio::test]
    async fn post_assessment_returns_scores_and_advice() {
        let (status, payload) = post_answers(Value::Object(answers(&[
            ("apnea_snore", json!(5)),
            ("apnea_choke", json!(5)),
            ("apnea_headache", json!(5)),
            ("apnea_sleepy", json!(5)),
            ("alcohol_bed", json!(3)),
        ])))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["active_diagnoses"], json!(["Obstructive Sleep Apnea"]));
        let apnea = payload["scores"]
            .as_array()
            .and_then(|scores| {
                scores
                    .iter()
                    .find(|score| score["disorder"] == "Obstructive Sleep Apnea")
            })
            .expect("apnea score");
        assert_eq!(apnea["confidence"], json!(100.0));
        assert_eq!(apnea["risk"], "high");

        let severities: Vec<_> = payload["advice"]
            .as_array()
            .expect("advice")
            .iter()
            .map(|item| item["severity"].as_str().unwrap_or_default().to_string())
            .collect();
        assert!(severities.contains(&"urgent".to_string()));
        assert!(severities.contains(&"caution".to_string()));
        assert!(severities.contains(&"info".to_string()));
    }

    #[tokio::test]
    async fn post_assessment_rejects_choice_outside_schema() {
        let (status, payload) =
            post_answers(Value::Object(answers(&[("sleep_hrs", json!("twelve"))]))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(payload["error"]
            .as_str()
            .unwrap_or_default()
            .contains("sleep_hrs"));
    }
}
