use crate::infra::{load_service, rules_path};
use clap::Args;
use serde::Serialize;
use serde_json::{Map, Value};
use sleep_coach::assessment::{
    parse_answer_sheet_path, schema::question_views, AnswerSheetRow, AssessmentReport,
    AssessmentService,
};
use sleep_coach::error::AppError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON file holding an answer object, bare or wrapped as {"answers": {..}}
    #[arg(long, required_unless_present = "csv", conflicts_with = "csv")]
    pub(crate) answers: Option<PathBuf>,
    /// CSV answer sheet with one questionnaire per row
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Coaching rules file (defaults to SLEEP_COACH_RULES)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

/// Report for one row of an answer sheet; failed rows carry the error instead.
#[derive(Debug, Serialize)]
pub(crate) struct SheetAssessment {
    pub(crate) row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) respondent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) report: Option<AssessmentReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let path = rules_path(args.rules)?;
    let service = load_service(&path)?;

    let output = match (args.answers, args.csv) {
        (Some(answers), _) => {
            let document = fs::read_to_string(answers)?;
            to_pretty_json(&assess_document(&service, &document)?)?
        }
        (None, Some(csv)) => to_pretty_json(&assess_sheet(&service, &csv)?)?,
        (None, None) => return Err(invalid_input("pass --answers or --csv")),
    };

    println!("{output}");
    Ok(())
}

pub(crate) fn print_questions() -> Result<(), AppError> {
    println!("{}", to_pretty_json(&question_views())?);
    Ok(())
}

pub(crate) fn assess_document(
    service: &AssessmentService,
    document: &str,
) -> Result<AssessmentReport, AppError> {
    let value: Value =
        serde_json::from_str(document).map_err(|err| invalid_input(err.to_string()))?;
    let answers = answer_object(value)?;
    Ok(service.assess_json(&answers)?)
}

pub(crate) fn assess_sheet(
    service: &AssessmentService,
    path: &Path,
) -> Result<Vec<SheetAssessment>, AppError> {
    Ok(assess_rows(service, parse_answer_sheet_path(path)?))
}

pub(crate) fn assess_rows(
    service: &AssessmentService,
    rows: Vec<AnswerSheetRow>,
) -> Vec<SheetAssessment> {
    rows.into_iter()
        .map(|AnswerSheetRow { row, respondent, answers }| match service.assess(&answers) {
            Ok(report) => SheetAssessment {
                row,
                respondent,
                report: Some(report),
                error: None,
            },
            Err(err) => SheetAssessment {
                row,
                respondent,
                report: None,
                error: Some(err.to_string()),
            },
        })
        .collect()
}

fn answer_object(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(mut object) => match object.remove("answers") {
            Some(Value::Object(answers)) => Ok(answers),
            Some(_) => Err(invalid_input("'answers' must be a JSON object")),
            None => Ok(object),
        },
        _ => Err(invalid_input("answer file must contain a JSON object")),
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|err| AppError::Io(err.into()))
}

fn invalid_input(message: impl Into<String>) -> AppError {
    AppError::InvalidInput(message.into())
}
