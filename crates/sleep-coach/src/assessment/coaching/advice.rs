use serde::Serialize;

/// Presentation priority derived from the markers inside an advice text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceSeverity {
    Info,
    Caution,
    Urgent,
}

impl AdviceSeverity {
    pub fn classify(text: &str) -> Self {
        if text.contains("MEDICAL") || text.contains("CRITICAL") {
            Self::Urgent
        } else if text.contains("FIX") {
            Self::Caution
        } else {
            Self::Info
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdviceItem {
    pub text: String,
    pub severity: AdviceSeverity,
}

impl AdviceItem {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let severity = AdviceSeverity::classify(&text);
        Self { text, severity }
    }
}
