use std::fmt;

use serde::{Deserialize, Serialize};

use super::super::domain::{AnswerRecord, AnswerValue};
use super::super::schema::{self, QuestionSpec};

/// Comparison operator accepted in rule conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
}

impl Operator {
    /// Two-character operators first so `>=` is never read as `>`.
    const PARSE_ORDER: [Self; 6] = [Self::Ge, Self::Le, Self::Eq, Self::Ne, Self::Gt, Self::Lt];

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }

    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Ge | Self::Lt | Self::Le)
    }

    fn strip_prefix(text: &str) -> Option<(Self, &str)> {
        Self::PARSE_ORDER
            .into_iter()
            .find_map(|op| text.strip_prefix(op.symbol()).map(|rest| (op, rest)))
    }

    fn apply<T: Ord + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Malformed condition text, detected when the rule set is loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionSyntaxError {
    #[error("condition '{0}' does not start with a variable name")]
    MissingVariable(String),
    #[error("condition '{0}' has no comparison operator after the variable")]
    MissingOperator(String),
    #[error("condition '{0}' has no value to compare against")]
    MissingLiteral(String),
    #[error("'{0}' combinator needs at least one condition")]
    EmptyCombinator(&'static str),
}

/// A condition that is well formed but cannot be typed against the question schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error("'{0}' is not a known question")]
    UnknownVariable(String),
    #[error("literal {literal} cannot be read as a {expected} value for '{variable}'")]
    TypeMismatch {
        variable: String,
        expected: &'static str,
        literal: String,
    },
    #[error("operator '{operator}' is not defined for {kind} question '{variable}'")]
    UnsupportedOperator {
        variable: String,
        operator: Operator,
        kind: &'static str,
    },
}

/// `<variable> <operator> <literal>` as written in the rule set. The literal is kept as text
/// and typed from the variable's declared question kind at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    variable: String,
    operator: Operator,
    literal: String,
}

struct TypedComparison {
    question: &'static QuestionSpec,
    operator: Operator,
    literal: AnswerValue,
}

impl Comparison {
    pub fn parse(text: &str) -> Result<Self, ConditionSyntaxError> {
        let trimmed = text.trim();
        let split = trimmed
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(trimmed.len());
        let (variable, rest) = trimmed.split_at(split);
        if variable.is_empty() {
            return Err(ConditionSyntaxError::MissingVariable(text.to_string()));
        }

        let (operator, rest) = Operator::strip_prefix(rest.trim_start())
            .ok_or_else(|| ConditionSyntaxError::MissingOperator(text.to_string()))?;

        let literal = rest.trim();
        if literal.is_empty() {
            return Err(ConditionSyntaxError::MissingLiteral(text.to_string()));
        }

        Ok(Self {
            variable: variable.to_string(),
            operator,
            literal: literal.to_string(),
        })
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Resolve the question and type the literal. The operator is checked before the literal
    /// so an ordering test on a flag reports the operator, not the value.
    fn resolve(&self) -> Result<TypedComparison, ConditionError> {
        let question = schema::lookup(&self.variable)
            .ok_or_else(|| ConditionError::UnknownVariable(self.variable.clone()))?;

        if self.operator.is_ordering() && !question.kind.supports_ordering() {
            return Err(ConditionError::UnsupportedOperator {
                variable: self.variable.clone(),
                operator: self.operator,
                kind: question.kind.label(),
            });
        }

        let literal = question
            .parse_answer(&self.literal)
            .map_err(|_| ConditionError::TypeMismatch {
                variable: self.variable.clone(),
                expected: question.kind.label(),
                literal: self.literal.clone(),
            })?;

        Ok(TypedComparison {
            question,
            operator: self.operator,
            literal,
        })
    }

    pub fn evaluate(&self, answers: &AnswerRecord) -> Result<bool, ConditionError> {
        let typed = self.resolve()?;
        let Some(actual) = answers.get(typed.question.id) else {
            return Ok(false);
        };

        match (actual, &typed.literal) {
            (AnswerValue::Ordinal(lhs), AnswerValue::Ordinal(rhs)) => {
                Ok(typed.operator.apply(lhs, rhs))
            }
            (AnswerValue::Flag(lhs), AnswerValue::Flag(rhs)) => Ok(typed.operator.apply(lhs, rhs)),
            (AnswerValue::Category(lhs), AnswerValue::Category(rhs)) => {
                Ok(typed.operator.apply(lhs.as_str(), rhs.as_str()))
            }
            _ => Err(ConditionError::TypeMismatch {
                variable: self.variable.clone(),
                expected: typed.question.kind.label(),
                literal: self.literal.clone(),
            }),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.variable, self.operator, self.literal)
    }
}

/// Rule condition: a single comparison or a boolean combination of conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Compare(Comparison),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn parse(text: &str) -> Result<Self, ConditionSyntaxError> {
        Comparison::parse(text).map(Self::Compare)
    }

    pub fn all(conditions: Vec<Condition>) -> Result<Self, ConditionSyntaxError> {
        if conditions.is_empty() {
            return Err(ConditionSyntaxError::EmptyCombinator("all"));
        }
        Ok(Self::All(conditions))
    }

    pub fn any(conditions: Vec<Condition>) -> Result<Self, ConditionSyntaxError> {
        if conditions.is_empty() {
            return Err(ConditionSyntaxError::EmptyCombinator("any"));
        }
        Ok(Self::Any(conditions))
    }

    /// Evaluate against `answers`. Every nested comparison is typed even when the result is
    /// already decided, so a malformed branch always surfaces.
    pub fn evaluate(&self, answers: &AnswerRecord) -> Result<bool, ConditionError> {
        match self {
            Self::Compare(comparison) => comparison.evaluate(answers),
            Self::All(conditions) => {
                let mut satisfied = true;
                for condition in conditions {
                    satisfied &= condition.evaluate(answers)?;
                }
                Ok(satisfied)
            }
            Self::Any(conditions) => {
                let mut satisfied = false;
                for condition in conditions {
                    satisfied |= condition.evaluate(answers)?;
                }
                Ok(satisfied)
            }
        }
    }

    /// Type-check without answers; reports the first problem found.
    pub fn check(&self) -> Result<(), ConditionError> {
        match self {
            Self::Compare(comparison) => comparison.resolve().map(|_| ()),
            Self::All(conditions) | Self::Any(conditions) => {
                conditions.iter().try_for_each(Condition::check)
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, conditions) = match self {
            Self::Compare(comparison) => return fmt::Display::fmt(comparison, f),
            Self::All(conditions) => ("all", conditions),
            Self::Any(conditions) => ("any", conditions),
        };
        write!(f, "{name}(")?;
        for (index, condition) in conditions.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{condition}")?;
        }
        f.write_str(")")
    }
}

/// Condition as it appears in the JSON rule file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawCondition {
    Text(String),
    All(RawAll),
    Any(RawAny),
}

/// `{"all": [..]}` and nothing else; a second key is a load error.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawAll {
    all: Vec<RawCondition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawAny {
    any: Vec<RawCondition>,
}

impl TryFrom<RawCondition> for Condition {
    type Error = ConditionSyntaxError;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        match raw {
            RawCondition::Text(text) => Self::parse(&text),
            RawCondition::All(RawAll { all }) => Self::all(convert_all(all)?),
            RawCondition::Any(RawAny { any }) => Self::any(convert_all(any)?),
        }
    }
}

fn convert_all(raw: Vec<RawCondition>) -> Result<Vec<Condition>, ConditionSyntaxError> {
    raw.into_iter().map(Condition::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers() -> AnswerRecord {
        AnswerRecord::builder()
            .answer("caffeine_pm", 3u8)
            .and_then(|b| b.answer("bed_usage", false))
            .and_then(|b| b.answer("sleep_hrs", "< 4"))
            .and_then(|b| b.answer("para_dream", 4u8))
            .expect("valid answers")
            .build()
    }

    #[test]
    fn parses_variable_operator_and_literal() {
        let comparison = Comparison::parse("  caffeine_pm >= 3 ").expect("parses");
        assert_eq!(comparison.variable(), "caffeine_pm");
        assert_eq!(comparison.operator(), Operator::Ge);
        assert_eq!(comparison.literal(), "3");
    }

    #[test]
    fn operator_may_touch_operands() {
        let comparison = Comparison::parse("naps<=2").expect("parses");
        assert_eq!(comparison.operator(), Operator::Le);
        assert_eq!(comparison.literal(), "2");
    }

    #[test]
    fn literal_containing_operator_characters_stays_intact() {
        let comparison = Comparison::parse("sleep_hrs == '< 4'").expect("parses");
        assert_eq!(comparison.operator(), Operator::Eq);
        assert_eq!(comparison.literal(), "'< 4'");
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(matches!(
            Comparison::parse(">= 3"),
            Err(ConditionSyntaxError::MissingVariable(_))
        ));
        assert!(matches!(
            Comparison::parse("caffeine_pm = 3"),
            Err(ConditionSyntaxError::MissingOperator(_))
        ));
        assert!(matches!(
            Comparison::parse("caffeine_pm >="),
            Err(ConditionSyntaxError::MissingLiteral(_))
        ));
        assert_eq!(
            Condition::any(Vec::new()),
            Err(ConditionSyntaxError::EmptyCombinator("any"))
        );
    }

    #[test]
    fn ordinal_threshold_is_inclusive() {
        let condition = Condition::parse("caffeine_pm >= 3").unwrap();
        assert_eq!(condition.evaluate(&answers()), Ok(true));
        let condition = Condition::parse("caffeine_pm > 3").unwrap();
        assert_eq!(condition.evaluate(&answers()), Ok(false));
    }

    #[test]
    fn category_and_flag_equality() {
        assert_eq!(
            Condition::parse("sleep_hrs == '< 4'")
                .unwrap()
                .evaluate(&answers()),
            Ok(true)
        );
        assert_eq!(
            Condition::parse("bed_usage == false")
                .unwrap()
                .evaluate(&answers()),
            Ok(true)
        );
        assert_eq!(
            Condition::parse("bed_usage != no")
                .unwrap()
                .evaluate(&answers()),
            Ok(false)
        );
    }

    #[test]
    fn unanswered_variable_is_not_satisfied() {
        let condition = Condition::parse("alcohol_bed >= 1").unwrap();
        assert_eq!(condition.evaluate(&answers()), Ok(false));
    }

    #[test]
    fn ordering_on_flag_is_unsupported() {
        let condition = Condition::parse("bed_usage > 1").unwrap();
        match condition.evaluate(&answers()) {
            Err(ConditionError::UnsupportedOperator { operator, kind, .. }) => {
                assert_eq!(operator, Operator::Gt);
                assert_eq!(kind, "flag");
            }
            other => panic!("expected unsupported operator, got {other:?}"),
        }
    }

    #[test]
    fn literal_of_wrong_type_is_a_mismatch() {
        for text in ["caffeine_pm == 'often'", "caffeine_pm >= 3.5", "sleep_hrs == 12h"] {
            let condition = Condition::parse(text).unwrap();
            assert!(
                matches!(
                    condition.evaluate(&answers()),
                    Err(ConditionError::TypeMismatch { .. })
                ),
                "{text} should not type check"
            );
        }
    }

    #[test]
    fn type_errors_surface_even_when_variable_is_unanswered() {
        let condition = Condition::parse("chronic_pain >= 2").unwrap();
        assert!(condition.check().is_err());
        assert!(condition.evaluate(&AnswerRecord::default()).is_err());
    }

    #[test]
    fn legacy_alias_reads_canonical_answer() {
        let condition = Condition::parse("para_acting_out >= 2").unwrap();
        assert_eq!(condition.evaluate(&answers()), Ok(true));
    }

    #[test]
    fn combinators_type_check_every_branch() {
        let condition = Condition::any(vec![
            Condition::parse("caffeine_pm >= 3").unwrap(),
            Condition::parse("bed_usage < 2").unwrap(),
        ])
        .unwrap();
        assert!(condition.evaluate(&answers()).is_err());

        let condition = Condition::all(vec![
            Condition::parse("caffeine_pm >= 3").unwrap(),
            Condition::parse("sleep_hrs == '< 4'").unwrap(),
        ])
        .unwrap();
        assert_eq!(condition.evaluate(&answers()), Ok(true));
        assert_eq!(
            condition.to_string(),
            "all(caffeine_pm >= 3, sleep_hrs == '< 4')"
        );
    }

    #[test]
    fn raw_json_conditions_convert_to_combinators() {
        let raw: RawCondition = serde_json::from_str(
            r#"{"any": ["naps >= 3", {"all": ["work_shift == 1", "chrono_type == 'Night owl'"]}]}"#,
        )
        .expect("raw condition");
        let condition = Condition::try_from(raw).expect("well formed");
        match condition {
            Condition::Any(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(children[1], Condition::All(_)));
            }
            other => panic!("expected any, got {other:?}"),
        }
    }

    #[test]
    fn combinator_objects_reject_extra_keys() {
        for json in [
            r#"{"all": ["naps >= 3"], "any": ["caffeine_pm >= 5"]}"#,
            r#"{"all": ["naps >= 3"], "alll": ["bogus"]}"#,
        ] {
            assert!(serde_json::from_str::<RawCondition>(json).is_err(), "{json}");
        }
    }
}
