use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::super::domain::Disorder;
use super::condition::{Condition, ConditionError, ConditionSyntaxError, RawCondition};
use super::gate::ContextGate;

/// One coaching rule: optional condition, diagnosis gate, and the advice it emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    id: String,
    condition: Option<Condition>,
    gate: ContextGate,
    advice: String,
}

impl Rule {
    pub fn new(id: impl Into<String>, advice: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            condition: None,
            gate: ContextGate::open(),
            advice: advice.into(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn requires(mut self, disorder: Disorder) -> Self {
        self.gate.required = Some(disorder);
        self
    }

    pub fn blocked_by(mut self, disorder: Disorder) -> Self {
        self.gate.blocked = Some(disorder);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn gate(&self) -> &ContextGate {
        &self.gate
    }

    pub fn advice(&self) -> &str {
        &self.advice
    }
}

/// Failure to load the coaching rule set. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("unable to read coaching rules from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("coaching rules are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rule '{rule_id}' has a malformed condition: {source}")]
    Condition {
        rule_id: String,
        #[source]
        source: ConditionSyntaxError,
    },
    #[error("a coaching rule has an empty id")]
    EmptyId,
    #[error("rule id '{0}' is declared more than once")]
    DuplicateId(String),
    #[error("rule '{0}' has no advice text")]
    EmptyAdvice(String),
    #[error("coaching rule set is empty")]
    Empty,
}

/// Rule whose condition will never type-check against the question schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIssue {
    pub rule_id: String,
    pub error: ConditionError,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleDefinition {
    id: String,
    #[serde(default)]
    condition: Option<RawCondition>,
    #[serde(default)]
    required_diagnosis: Option<Disorder>,
    #[serde(default)]
    block_if_diagnosis: Option<Disorder>,
    advice: String,
}

impl TryFrom<RuleDefinition> for Rule {
    type Error = ConfigLoadError;

    fn try_from(definition: RuleDefinition) -> Result<Self, Self::Error> {
        let RuleDefinition {
            id,
            condition,
            required_diagnosis,
            block_if_diagnosis,
            advice,
        } = definition;

        let condition = condition
            .map(Condition::try_from)
            .transpose()
            .map_err(|source| ConfigLoadError::Condition {
                rule_id: id.clone(),
                source,
            })?;

        Ok(Self {
            id,
            condition,
            gate: ContextGate {
                required: required_diagnosis,
                blocked: block_if_diagnosis,
            },
            advice,
        })
    }
}

/// Ordered, immutable collection of coaching rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, ConfigLoadError> {
        if rules.is_empty() {
            return Err(ConfigLoadError::Empty);
        }

        let mut seen = HashSet::new();
        for rule in &rules {
            if rule.id.trim().is_empty() {
                return Err(ConfigLoadError::EmptyId);
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(ConfigLoadError::DuplicateId(rule.id.clone()));
            }
            if rule.advice.trim().is_empty() {
                return Err(ConfigLoadError::EmptyAdvice(rule.id.clone()));
            }
        }

        Ok(Self { rules })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigLoadError> {
        let definitions: Vec<RuleDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(definitions)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigLoadError> {
        let definitions: Vec<RuleDefinition> = serde_json::from_reader(reader)?;
        Self::from_definitions(definitions)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_definitions(definitions: Vec<RuleDefinition>) -> Result<Self, ConfigLoadError> {
        let rules = definitions
            .into_iter()
            .map(Rule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rules(rules)
    }

    /// Rules whose conditions cannot be typed. They stay in the set and are skipped at
    /// evaluation time.
    pub fn check(&self) -> Vec<RuleIssue> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let error = rule.condition.as_ref()?.check().err()?;
                Some(RuleIssue {
                    rule_id: rule.id.clone(),
                    error,
                })
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
