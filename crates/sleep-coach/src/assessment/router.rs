use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::schema::{question_views, QuestionView};
use super::service::{AssessmentReport, AssessmentService};

/// Router builder exposing the assessment and questionnaire endpoints.
pub fn assessment_router(service: Arc<AssessmentService>) -> Router {
    Router::new()
        .route("/api/v1/assessments", post(assess_handler))
        .route("/api/v1/questions", get(questions_handler))
        .with_state(service)
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentRequest {
    pub answers: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResponse {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: AssessmentReport,
}

pub(crate) async fn assess_handler(
    State(service): State<Arc<AssessmentService>>,
    request: Result<axum::Json<AssessmentRequest>, JsonRejection>,
) -> Response {
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return error_response(rejection.status(), rejection.body_text()),
    };

    match service.assess_json(&request.answers) {
        Ok(report) => {
            let response = AssessmentResponse {
                generated_at: Utc::now(),
                report,
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(error) => error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn questions_handler() -> axum::Json<Vec<QuestionView>> {
    axum::Json(question_views())
}
