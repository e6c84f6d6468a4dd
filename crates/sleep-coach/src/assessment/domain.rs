use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{self, QuestionKind};

/// Sleep disorders scored by the assessment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String")]
pub enum Disorder {
    #[serde(rename = "Insomnia")]
    Insomnia,
    #[serde(rename = "Obstructive Sleep Apnea")]
    ObstructiveSleepApnea,
    #[serde(rename = "Restless Legs Syndrome")]
    RestlessLegsSyndrome,
    #[serde(rename = "Narcolepsy")]
    Narcolepsy,
    #[serde(rename = "Circadian Rhythm Disorder")]
    CircadianRhythmDisorder,
    #[serde(rename = "Parasomnia")]
    Parasomnia,
}

impl Disorder {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Insomnia,
            Self::ObstructiveSleepApnea,
            Self::RestlessLegsSyndrome,
            Self::Narcolepsy,
            Self::CircadianRhythmDisorder,
            Self::Parasomnia,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Insomnia => "Insomnia",
            Self::ObstructiveSleepApnea => "Obstructive Sleep Apnea",
            Self::RestlessLegsSyndrome => "Restless Legs Syndrome",
            Self::Narcolepsy => "Narcolepsy",
            Self::CircadianRhythmDisorder => "Circadian Rhythm Disorder",
            Self::Parasomnia => "Parasomnia",
        }
    }

    /// Alternate names used by older rule sets and reports.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Insomnia => &[],
            Self::ObstructiveSleepApnea => &["Sleep Apnea", "OSA"],
            Self::RestlessLegsSyndrome => &["Restless Legs Syndrome (RLS)", "RLS"],
            Self::Narcolepsy => &[],
            Self::CircadianRhythmDisorder => &["Circadian Rhythm Sleep Disorder", "CRSD"],
            Self::Parasomnia => &[],
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ordered().into_iter().find(|disorder| {
            disorder.label().eq_ignore_ascii_case(label)
                || disorder
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(label))
        })
    }
}

impl fmt::Display for Disorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown diagnosis '{0}'")]
pub struct UnknownDisorder(pub String);

impl FromStr for Disorder {
    type Err = UnknownDisorder;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_label(value).ok_or_else(|| UnknownDisorder(value.to_string()))
    }
}

impl TryFrom<String> for Disorder {
    type Error = UnknownDisorder;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Typed answer to a single question.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Ordinal(u8),
    Flag(bool),
    Category(String),
}

impl AnswerValue {
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Ordinal(_) => "ordinal",
            Self::Flag(_) => "flag",
            Self::Category(_) => "category",
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordinal(rating) => write!(f, "{rating}"),
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Category(choice) => write!(f, "'{choice}'"),
        }
    }
}

impl From<u8> for AnswerValue {
    fn from(value: u8) -> Self {
        Self::Ordinal(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Category(value.to_string())
    }
}

/// Validation errors raised while building an [`AnswerRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerError {
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("question '{question}' expects a {expected} answer, found {found}")]
    WrongKind {
        question: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("question '{question}' must be rated 1-5, found {value}")]
    OutOfRange { question: &'static str, value: i64 },
    #[error("'{value}' is not a listed choice for question '{question}'")]
    InvalidChoice { question: &'static str, value: String },
    #[error("question '{question}' could not read '{raw}' as a {expected} answer")]
    Unparseable {
        question: &'static str,
        expected: &'static str,
        raw: String,
    },
    #[error("question '{0}' was answered more than once")]
    Duplicate(&'static str),
}

/// Validated, immutable set of answers keyed by canonical question id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerRecord {
    values: BTreeMap<&'static str, AnswerValue>,
}

impl AnswerRecord {
    pub fn builder() -> AnswerRecordBuilder {
        AnswerRecordBuilder::default()
    }

    /// Build a record from a JSON object. The expected JSON type of every value comes from the
    /// question schema; `null` means the question was not answered.
    pub fn from_json(answers: &serde_json::Map<String, Value>) -> Result<Self, AnswerError> {
        let mut builder = Self::builder();
        for (id, raw) in answers {
            let spec = schema::lookup(id).ok_or_else(|| AnswerError::UnknownQuestion(id.clone()))?;
            if raw.is_null() {
                continue;
            }

            let value = match spec.kind {
                QuestionKind::Ordinal => match raw.as_i64() {
                    Some(rating) => u8::try_from(rating)
                        .map(AnswerValue::Ordinal)
                        .map_err(|_| AnswerError::OutOfRange {
                            question: spec.id,
                            value: rating,
                        })?,
                    None => return Err(wrong_json_kind(spec.id, spec.kind, raw)),
                },
                QuestionKind::Flag => match raw.as_bool() {
                    Some(flag) => AnswerValue::Flag(flag),
                    None => return Err(wrong_json_kind(spec.id, spec.kind, raw)),
                },
                QuestionKind::Category(_) => match raw.as_str() {
                    Some(choice) => AnswerValue::Category(choice.to_string()),
                    None => return Err(wrong_json_kind(spec.id, spec.kind, raw)),
                },
            };
            builder.insert(spec.id, value)?;
        }
        Ok(builder.build())
    }

    /// Answer for `id`, resolving legacy aliases.
    pub fn get(&self, id: &str) -> Option<&AnswerValue> {
        self.values.get(schema::canonical_id(id))
    }

    /// Ordinal rating for `id`, or `None` when unanswered or not an ordinal question.
    pub fn ordinal(&self, id: &str) -> Option<u8> {
        match self.get(id) {
            Some(AnswerValue::Ordinal(rating)) => Some(*rating),
            _ => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AnswerValue)> + '_ {
        self.values.iter().map(|(id, value)| (*id, value))
    }
}

fn wrong_json_kind(question: &'static str, kind: QuestionKind, raw: &Value) -> AnswerError {
    let found = match raw {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    AnswerError::WrongKind {
        question,
        expected: kind.label(),
        found: found.to_string(),
    }
}

/// Accumulates schema-checked answers before freezing them into an [`AnswerRecord`].
#[derive(Debug, Default)]
pub struct AnswerRecordBuilder {
    values: BTreeMap<&'static str, AnswerValue>,
}

impl AnswerRecordBuilder {
    pub fn insert(&mut self, id: &str, value: impl Into<AnswerValue>) -> Result<(), AnswerError> {
        let spec = schema::lookup(id).ok_or_else(|| AnswerError::UnknownQuestion(id.to_string()))?;
        let value = spec.validate(value.into())?;
        self.store(spec.id, value)
    }

    /// Parse `raw` according to the question's declared kind and insert it.
    pub fn insert_text(&mut self, id: &str, raw: &str) -> Result<(), AnswerError> {
        let spec = schema::lookup(id).ok_or_else(|| AnswerError::UnknownQuestion(id.to_string()))?;
        let value = spec.parse_answer(raw)?;
        self.store(spec.id, value)
    }

    /// Chaining form of [`insert`](Self::insert).
    pub fn answer(mut self, id: &str, value: impl Into<AnswerValue>) -> Result<Self, AnswerError> {
        self.insert(id, value)?;
        Ok(self)
    }

    pub fn build(self) -> AnswerRecord {
        AnswerRecord {
            values: self.values,
        }
    }

    fn store(&mut self, id: &'static str, value: AnswerValue) -> Result<(), AnswerError> {
        if self.values.contains_key(id) {
            return Err(AnswerError::Duplicate(id));
        }
        self.values.insert(id, value);
        Ok(())
    }
}
