use std::collections::BTreeSet;

use serde::Serialize;

use super::domain::Disorder;
use super::scoring::DisorderScores;

/// Confidence at or above which a disorder counts as active for context gating.
pub const ACTIVATION_THRESHOLD: f64 = 50.0;

pub fn is_active(confidence: f64) -> bool {
    confidence >= ACTIVATION_THRESHOLD
}

/// Disorders whose confidence reached the activation threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActiveDiagnoses(BTreeSet<Disorder>);

impl ActiveDiagnoses {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, disorder: Disorder) -> bool {
        self.0.contains(&disorder)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Disorder> + '_ {
        self.0.iter().copied()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.iter().map(Disorder::label).collect()
    }
}

impl FromIterator<Disorder> for ActiveDiagnoses {
    fn from_iter<I: IntoIterator<Item = Disorder>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Threshold scores into the active diagnosis set.
pub fn activate(scores: &DisorderScores) -> ActiveDiagnoses {
    scores
        .iter()
        .filter(|score| is_active(score.confidence))
        .map(|score| score.disorder)
        .collect()
}
