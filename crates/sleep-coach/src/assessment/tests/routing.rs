use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::assessment::router::{assess_handler, questions_handler, AssessmentRequest};

#[tokio::test]
async fn assess_handler_returns_report_with_timestamp() {
    let service = Arc::new(build_service());
    let request = AssessmentRequest {
        answers: answers_json(&[
            ("narco_attack", json!(5)),
            ("narco_cata", json!(5)),
            ("narco_hallu", json!(5)),
            ("narco_paralysis", json!(5)),
            ("naps", json!(4)),
        ]),
    };

    let response = assess_handler(State(service), Ok(axum::Json(request))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert!(payload.get("generated_at").and_then(Value::as_str).is_some());
    assert_eq!(payload["active_diagnoses"], json!(["Narcolepsy"]));
    assert_eq!(payload["scores"].as_array().map(Vec::len), Some(6));

    let advice = payload["advice"].as_array().expect("advice list");
    let texts: Vec<_> = advice
        .iter()
        .filter_map(|item| item["text"].as_str())
        .collect();
    assert!(texts.iter().any(|text| text.starts_with("FIX ROUTINE: Short, scheduled naps")));
    assert!(!texts.iter().any(|text| text.starts_with("HABIT: Long naps")));
}

#[tokio::test]
async fn assess_handler_returns_unprocessable_for_invalid_answers() {
    let service = Arc::new(build_service());
    let request = AssessmentRequest {
        answers: answers_json(&[("caffeine_pm", json!(0))]),
    };

    let response = assess_handler(State(service), Ok(axum::Json(request))).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("caffeine_pm"));
}

#[tokio::test]
async fn assessment_route_reports_missing_symptoms() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(
            Request::post("/api/v1/assessments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"answers": {"caffeine_pm": 3}})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("was not answered"));
}

#[tokio::test]
async fn malformed_request_body_gets_a_json_error() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(
            Request::post("/api/v1/assessments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"answers": 5}"#))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("answers"));
}

#[tokio::test]
async fn questions_route_lists_the_schema() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(
            Request::get("/api/v1/questions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let questions = payload.as_array().expect("question list");
    let sleep_hours = questions
        .iter()
        .find(|question| question["id"] == "sleep_hrs")
        .expect("sleep_hrs listed");
    assert_eq!(sleep_hours["kind"], "category");
    assert_eq!(sleep_hours["choices"][0], "< 4");

    let caffeine = questions
        .iter()
        .find(|question| question["id"] == "caffeine_pm")
        .expect("caffeine_pm listed");
    assert!(caffeine.get("choices").is_none());
}

#[tokio::test]
async fn questions_handler_matches_schema_size() {
    let axum::Json(views) = questions_handler().await;
    assert_eq!(views.len(), crate::assessment::schema::questions().len());
}
