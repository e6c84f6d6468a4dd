use serde::Serialize;

use super::domain::{AnswerError, AnswerValue};

/// Semantic type declared for a question. Answers and rule literals are typed from this,
/// never from the shape of the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// Severity/frequency rating on the fixed 1-5 scale.
    Ordinal,
    Flag,
    /// Answer restricted to the listed choices.
    Category(&'static [&'static str]),
}

pub const ORDINAL_MIN: u8 = 1;
pub const ORDINAL_MAX: u8 = 5;

impl QuestionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ordinal => "ordinal",
            Self::Flag => "flag",
            Self::Category(_) => "category",
        }
    }

    pub const fn supports_ordering(self) -> bool {
        matches!(self, Self::Ordinal)
    }

    pub const fn choices(self) -> &'static [&'static str] {
        match self {
            Self::Category(choices) => choices,
            Self::Ordinal | Self::Flag => &[],
        }
    }

    /// Read free text (a CSV cell or a rule literal) as a value of this kind.
    ///
    /// One pair of surrounding quotes is treated as a delimiter for every kind. The result is
    /// not range- or choice-checked; see [`QuestionSpec::validate`].
    pub fn parse_text(self, raw: &str) -> Option<AnswerValue> {
        let text = strip_quotes(raw.trim());
        match self {
            Self::Ordinal => text.parse::<u8>().ok().map(AnswerValue::Ordinal),
            Self::Flag => match text.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" => Some(AnswerValue::Flag(true)),
                "false" | "no" | "n" => Some(AnswerValue::Flag(false)),
                _ => None,
            },
            Self::Category(_) => {
                if text.is_empty() {
                    None
                } else {
                    Some(AnswerValue::Category(text.to_string()))
                }
            }
        }
    }
}

fn strip_quotes(text: &str) -> &str {
    for quote in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Questionnaire section a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Demographics,
    Lifestyle,
    SleepQuality,
    MentalHealth,
    Environment,
    Diet,
    Technology,
    Chronobiology,
    Hygiene,
    Social,
    Medical,
    Symptoms,
}

impl Section {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Demographics => "Demographics",
            Self::Lifestyle => "Lifestyle",
            Self::SleepQuality => "Sleep Quality",
            Self::MentalHealth => "Mental Health",
            Self::Environment => "Environment",
            Self::Diet => "Diet",
            Self::Technology => "Technology",
            Self::Chronobiology => "Chronobiology",
            Self::Hygiene => "Sleep Hygiene",
            Self::Social => "Social Factors",
            Self::Medical => "Medical History",
            Self::Symptoms => "Symptom Checker",
        }
    }
}

/// Declared question: identifier, section, and semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSpec {
    pub id: &'static str,
    pub section: Section,
    pub kind: QuestionKind,
}

impl QuestionSpec {
    const fn ordinal(id: &'static str, section: Section) -> Self {
        Self {
            id,
            section,
            kind: QuestionKind::Ordinal,
        }
    }

    const fn flag(id: &'static str, section: Section) -> Self {
        Self {
            id,
            section,
            kind: QuestionKind::Flag,
        }
    }

    const fn category(id: &'static str, section: Section, choices: &'static [&'static str]) -> Self {
        Self {
            id,
            section,
            kind: QuestionKind::Category(choices),
        }
    }

    /// Check a typed value against this question, normalising category case to the declared
    /// spelling.
    pub fn validate(&self, value: AnswerValue) -> Result<AnswerValue, AnswerError> {
        match (self.kind, value) {
            (QuestionKind::Ordinal, AnswerValue::Ordinal(rating)) => {
                if (ORDINAL_MIN..=ORDINAL_MAX).contains(&rating) {
                    Ok(AnswerValue::Ordinal(rating))
                } else {
                    Err(AnswerError::OutOfRange {
                        question: self.id,
                        value: i64::from(rating),
                    })
                }
            }
            (QuestionKind::Flag, AnswerValue::Flag(flag)) => Ok(AnswerValue::Flag(flag)),
            (QuestionKind::Category(choices), AnswerValue::Category(choice)) => choices
                .iter()
                .find(|declared| declared.eq_ignore_ascii_case(choice.trim()))
                .map(|declared| AnswerValue::Category((*declared).to_string()))
                .ok_or(AnswerError::InvalidChoice {
                    question: self.id,
                    value: choice,
                }),
            (kind, other) => Err(AnswerError::WrongKind {
                question: self.id,
                expected: kind.label(),
                found: other.kind_label().to_string(),
            }),
        }
    }

    /// Parse and validate free text for this question.
    pub fn parse_answer(&self, raw: &str) -> Result<AnswerValue, AnswerError> {
        let value = self
            .kind
            .parse_text(raw)
            .ok_or_else(|| AnswerError::Unparseable {
                question: self.id,
                expected: self.kind.label(),
                raw: raw.to_string(),
            })?;
        self.validate(value)
    }
}

pub const SEX_CHOICES: &[&str] = &["Male", "Female"];
pub const AGE_GROUP_CHOICES: &[&str] = &["Child", "Adolescent", "Adult", "Elderly"];
pub const SLEEP_HOURS_CHOICES: &[&str] = &["< 4", "4-6", "6-8", "8-10", "10 <"];
pub const FALL_TIME_CHOICES: &[&str] = &["<15 min", "15-30", "30-45", "45-60", "60+"];
pub const CHRONOTYPE_CHOICES: &[&str] = &["Morning", "Neutral", "Night owl"];

const QUESTIONS: &[QuestionSpec] = &[
    QuestionSpec::category("gender", Section::Demographics, SEX_CHOICES),
    QuestionSpec::category("age", Section::Demographics, AGE_GROUP_CHOICES),
    QuestionSpec::category("sleep_hrs", Section::Lifestyle, SLEEP_HOURS_CHOICES),
    QuestionSpec::ordinal("irregular", Section::Lifestyle),
    QuestionSpec::ordinal("work_shift", Section::Lifestyle),
    QuestionSpec::ordinal("physical_activity", Section::Lifestyle),
    QuestionSpec::category("fall_time", Section::SleepQuality, FALL_TIME_CHOICES),
    QuestionSpec::ordinal("wake_night", Section::SleepQuality),
    QuestionSpec::ordinal("refreshed", Section::SleepQuality),
    QuestionSpec::ordinal("mental_stress", Section::MentalHealth),
    QuestionSpec::flag("diagnosed_dep_anx", Section::MentalHealth),
    QuestionSpec::ordinal("worry_sleep", Section::MentalHealth),
    QuestionSpec::ordinal("mood_change", Section::MentalHealth),
    QuestionSpec::ordinal("room_quality", Section::Environment),
    QuestionSpec::ordinal("noise_light", Section::Environment),
    QuestionSpec::ordinal("heavy_meal", Section::Diet),
    QuestionSpec::ordinal("caffeine_pm", Section::Diet),
    QuestionSpec::ordinal("alcohol_bed", Section::Diet),
    QuestionSpec::ordinal("diet_bal", Section::Diet),
    QuestionSpec::ordinal("tech_hr", Section::Technology),
    QuestionSpec::ordinal("scroll_bed", Section::Technology),
    QuestionSpec::ordinal("tech_interferes", Section::Technology),
    QuestionSpec::category("chrono_type", Section::Chronobiology, CHRONOTYPE_CHOICES),
    QuestionSpec::ordinal("consistent", Section::Chronobiology),
    QuestionSpec::ordinal("adjust_diff", Section::Chronobiology),
    QuestionSpec::ordinal("alert_morning", Section::Chronobiology),
    QuestionSpec::ordinal("routine", Section::Hygiene),
    QuestionSpec::flag("bed_usage", Section::Hygiene),
    QuestionSpec::ordinal("avoid_scr", Section::Hygiene),
    QuestionSpec::ordinal("naps", Section::Hygiene),
    QuestionSpec::ordinal("social_stress", Section::Social),
    QuestionSpec::ordinal("fam_prob", Section::Social),
    QuestionSpec::ordinal("social_lonely", Section::Social),
    QuestionSpec::ordinal("social_sat", Section::Social),
    QuestionSpec::flag("chronic_pain", Section::Medical),
    QuestionSpec::flag("medication_sleep", Section::Medical),
    QuestionSpec::flag("diagnosed_neuro_resp", Section::Medical),
    QuestionSpec::ordinal("insomnia_fall", Section::Symptoms),
    QuestionSpec::ordinal("insomnia_stay", Section::Symptoms),
    QuestionSpec::ordinal("insomnia_early", Section::Symptoms),
    QuestionSpec::ordinal("insomnia_tired", Section::Symptoms),
    QuestionSpec::ordinal("apnea_snore", Section::Symptoms),
    QuestionSpec::ordinal("apnea_choke", Section::Symptoms),
    QuestionSpec::ordinal("apnea_headache", Section::Symptoms),
    QuestionSpec::ordinal("apnea_sleepy", Section::Symptoms),
    QuestionSpec::ordinal("rls_urge", Section::Symptoms),
    QuestionSpec::ordinal("rls_worse_night", Section::Symptoms),
    QuestionSpec::ordinal("rls_move_help", Section::Symptoms),
    QuestionSpec::ordinal("narco_attack", Section::Symptoms),
    QuestionSpec::ordinal("narco_cata", Section::Symptoms),
    QuestionSpec::ordinal("narco_hallu", Section::Symptoms),
    QuestionSpec::ordinal("narco_paralysis", Section::Symptoms),
    QuestionSpec::ordinal("crsd_timing", Section::Symptoms),
    QuestionSpec::ordinal("crsd_social", Section::Symptoms),
    QuestionSpec::ordinal("crsd_alert_night", Section::Symptoms),
    QuestionSpec::ordinal("para_act", Section::Symptoms),
    QuestionSpec::ordinal("para_nightmare", Section::Symptoms),
    QuestionSpec::ordinal("para_dream", Section::Symptoms),
];

/// Legacy identifiers mapped onto their canonical question.
const ALIASES: &[(&str, &str)] = &[("para_acting_out", "para_dream")];

/// All declared questions in questionnaire order.
pub fn questions() -> &'static [QuestionSpec] {
    QUESTIONS
}

/// Canonical identifier for `id`, resolving legacy aliases.
pub fn canonical_id(id: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == id)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(id)
}

pub fn lookup(id: &str) -> Option<&'static QuestionSpec> {
    let id = canonical_id(id.trim());
    QUESTIONS.iter().find(|spec| spec.id == id)
}

/// Serializable description of a question for intake clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: &'static str,
    pub section: Section,
    pub section_label: &'static str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "has_no_choices")]
    pub choices: &'static [&'static str],
}

fn has_no_choices(choices: &&'static [&'static str]) -> bool {
    choices.is_empty()
}

impl From<&QuestionSpec> for QuestionView {
    fn from(spec: &QuestionSpec) -> Self {
        Self {
            id: spec.id,
            section: spec.section,
            section_label: spec.section.label(),
            kind: spec.kind.label(),
            choices: spec.kind.choices(),
        }
    }
}

pub fn question_views() -> Vec<QuestionView> {
    QUESTIONS.iter().map(QuestionView::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_ids_are_unique() {
        let mut ids: Vec<_> = questions().iter().map(|spec| spec.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), questions().len());
    }

    #[test]
    fn alias_resolves_to_canonical_question() {
        let spec = lookup("para_acting_out").expect("alias resolves");
        assert_eq!(spec.id, "para_dream");
        assert_eq!(spec.kind, QuestionKind::Ordinal);
    }

    #[test]
    fn category_text_is_matched_case_insensitively() {
        let spec = lookup("chrono_type").expect("declared");
        let value = spec.parse_answer("night OWL").expect("choice matches");
        assert_eq!(value, AnswerValue::Category("Night owl".to_string()));
    }

    #[test]
    fn quoted_text_is_unwrapped_before_typing() {
        let spec = lookup("sleep_hrs").expect("declared");
        assert_eq!(
            spec.parse_answer("'< 4'").expect("quoted choice"),
            AnswerValue::Category("< 4".to_string())
        );
        let spec = lookup("caffeine_pm").expect("declared");
        assert_eq!(
            spec.parse_answer("\"3\"").expect("quoted rating"),
            AnswerValue::Ordinal(3)
        );
    }

    #[test]
    fn ordinal_outside_scale_is_rejected() {
        let spec = lookup("naps").expect("declared");
        match spec.parse_answer("6") {
            Err(AnswerError::OutOfRange { question, value }) => {
                assert_eq!(question, "naps");
                assert_eq!(value, 6);
            }
            other => panic!("expected out of range, got {other:?}"),
        }
    }

    #[test]
    fn flag_accepts_yes_no_spellings() {
        let spec = lookup("bed_usage").expect("declared");
        assert_eq!(spec.parse_answer("Yes").unwrap(), AnswerValue::Flag(true));
        assert_eq!(spec.parse_answer("false").unwrap(), AnswerValue::Flag(false));
        assert!(matches!(
            spec.parse_answer("maybe"),
            Err(AnswerError::Unparseable { .. })
        ));
    }
}
