use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::domain::{AnswerError, AnswerRecord};
use super::schema;

/// Optional column naming who filled in a row.
pub const RESPONDENT_COLUMN: &str = "respondent";

/// One questionnaire row of an answer sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSheetRow {
    pub row: usize,
    pub respondent: Option<String>,
    pub answers: AnswerRecord,
}

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownColumn(String),
    Row { row: usize, source: AnswerError },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read answer sheet: {}", err),
            ImportError::Csv(err) => write!(f, "invalid answer sheet CSV data: {}", err),
            ImportError::UnknownColumn(column) => {
                write!(f, "answer sheet column '{}' is not a known question", column)
            }
            ImportError::Row { row, source } => write!(f, "answer sheet row {}: {}", row, source),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::UnknownColumn(_) => None,
            ImportError::Row { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

enum Column {
    Respondent,
    Question(&'static str),
}

/// Parse a CSV answer sheet whose header names question ids. Empty cells are unanswered
/// questions; rows are numbered from 1, excluding the header.
pub fn parse_answer_sheet<R: Read>(reader: R) -> Result<Vec<AnswerSheetRow>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = csv_reader
        .headers()?
        .iter()
        .map(|header| {
            if header.eq_ignore_ascii_case(RESPONDENT_COLUMN) {
                Ok(Column::Respondent)
            } else {
                schema::lookup(header)
                    .map(|spec| Column::Question(spec.id))
                    .ok_or_else(|| ImportError::UnknownColumn(header.to_string()))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        let mut respondent = None;
        let mut builder = AnswerRecord::builder();

        for (column, cell) in columns.iter().zip(record.iter()) {
            if cell.is_empty() {
                continue;
            }
            match column {
                Column::Respondent => respondent = Some(cell.to_string()),
                Column::Question(id) => builder
                    .insert_text(id, cell)
                    .map_err(|source| ImportError::Row { row, source })?,
            }
        }

        rows.push(AnswerSheetRow {
            row,
            respondent,
            answers: builder.build(),
        });
    }

    Ok(rows)
}

pub fn parse_answer_sheet_path(path: impl AsRef<Path>) -> Result<Vec<AnswerSheetRow>, ImportError> {
    let file = File::open(path)?;
    parse_answer_sheet(file)
}
