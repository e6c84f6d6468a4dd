use serde::Serialize;

use super::domain::{AnswerRecord, Disorder};

/// Highest value a 1-5 rating reaches once shifted onto the 0-4 scale.
const NORMALIZED_MAX: f64 = 4.0;

/// Contribution weight of one symptom question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymptomWeight {
    pub question: &'static str,
    pub weight: f64,
}

const fn symptom(question: &'static str, weight: f64) -> SymptomWeight {
    SymptomWeight { question, weight }
}

/// Fixed weight vector for one disorder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisorderProfile {
    pub disorder: Disorder,
    pub symptoms: &'static [SymptomWeight],
}

impl DisorderProfile {
    /// Points reached when every contributing question is answered at its maximum.
    pub fn max_points(&self) -> f64 {
        self.symptoms
            .iter()
            .map(|symptom| symptom.weight * NORMALIZED_MAX)
            .sum()
    }
}

pub const DISORDER_PROFILES: [DisorderProfile; 6] = [
    DisorderProfile {
        disorder: Disorder::Insomnia,
        symptoms: &[
            symptom("insomnia_fall", 2.0),
            symptom("insomnia_stay", 2.0),
            symptom("insomnia_early", 2.0),
            symptom("insomnia_tired", 1.5),
        ],
    },
    DisorderProfile {
        disorder: Disorder::ObstructiveSleepApnea,
        symptoms: &[
            symptom("apnea_snore", 2.0),
            symptom("apnea_choke", 3.0),
            symptom("apnea_headache", 1.0),
            symptom("apnea_sleepy", 2.0),
        ],
    },
    DisorderProfile {
        disorder: Disorder::RestlessLegsSyndrome,
        symptoms: &[
            symptom("rls_urge", 3.0),
            symptom("rls_worse_night", 2.0),
            symptom("rls_move_help", 2.0),
        ],
    },
    DisorderProfile {
        disorder: Disorder::Narcolepsy,
        symptoms: &[
            symptom("narco_attack", 3.0),
            symptom("narco_cata", 3.0),
            symptom("narco_hallu", 1.5),
            symptom("narco_paralysis", 1.5),
        ],
    },
    DisorderProfile {
        disorder: Disorder::CircadianRhythmDisorder,
        symptoms: &[
            symptom("crsd_timing", 2.0),
            symptom("crsd_social", 2.0),
            symptom("crsd_alert_night", 2.0),
        ],
    },
    DisorderProfile {
        disorder: Disorder::Parasomnia,
        symptoms: &[
            symptom("para_act", 3.0),
            symptom("para_nightmare", 1.5),
            symptom("para_dream", 1.0),
        ],
    },
];

/// Display band for a confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 75.0 {
            Self::High
        } else if confidence >= 50.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

/// Points one answer added to a disorder score, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomContribution {
    pub question: &'static str,
    pub answer: u8,
    pub weight: f64,
    pub points: f64,
}

/// Confidence for one disorder together with its breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisorderScore {
    pub disorder: Disorder,
    pub confidence: f64,
    pub risk: RiskBand,
    pub points: f64,
    pub max_points: f64,
    pub components: Vec<SymptomContribution>,
}

/// Scores for every disorder, in [`Disorder::ordered`] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DisorderScores {
    scores: Vec<DisorderScore>,
}

impl DisorderScores {
    pub fn get(&self, disorder: Disorder) -> Option<&DisorderScore> {
        self.scores.iter().find(|score| score.disorder == disorder)
    }

    pub fn confidence(&self, disorder: Disorder) -> Option<f64> {
        self.get(disorder).map(|score| score.confidence)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisorderScore> {
        self.scores.iter()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("cannot score {disorder}: question '{question}' was not answered")]
    MissingField {
        disorder: Disorder,
        question: &'static str,
    },
}

/// Stateless engine turning symptom ratings into disorder confidences.
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    profiles: &'static [DisorderProfile],
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl ScoringEngine {
    pub fn standard() -> Self {
        Self {
            profiles: &DISORDER_PROFILES,
        }
    }

    pub fn profiles(&self) -> &'static [DisorderProfile] {
        self.profiles
    }

    /// Score every disorder. Fails on the first contributing question that is unanswered;
    /// there is no default rating.
    pub fn score(&self, answers: &AnswerRecord) -> Result<DisorderScores, ScoringError> {
        let scores = self
            .profiles
            .iter()
            .map(|profile| score_profile(profile, answers))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DisorderScores { scores })
    }
}

/// Score `answers` with the standard weight table.
pub fn score(answers: &AnswerRecord) -> Result<DisorderScores, ScoringError> {
    ScoringEngine::standard().score(answers)
}

fn normalize(rating: u8) -> f64 {
    f64::from(rating.saturating_sub(1))
}

fn score_profile(
    profile: &DisorderProfile,
    answers: &AnswerRecord,
) -> Result<DisorderScore, ScoringError> {
    let mut components = Vec::with_capacity(profile.symptoms.len());
    let mut points = 0.0;

    for symptom in profile.symptoms {
        let answer = answers
            .ordinal(symptom.question)
            .ok_or(ScoringError::MissingField {
                disorder: profile.disorder,
                question: symptom.question,
            })?;
        let contribution = normalize(answer) * symptom.weight;
        points += contribution;
        components.push(SymptomContribution {
            question: symptom.question,
            answer,
            weight: symptom.weight,
            points: contribution,
        });
    }

    let max_points = profile.max_points();
    let confidence = if max_points > 0.0 {
        (points / max_points * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    Ok(DisorderScore {
        disorder: profile.disorder,
        confidence,
        risk: RiskBand::from_confidence(confidence),
        points,
        max_points,
        components,
    })
}
