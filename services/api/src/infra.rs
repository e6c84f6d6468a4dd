use metrics_exporter_prometheus::PrometheusHandle;
use sleep_coach::assessment::{AssessmentService, RuleSet};
use sleep_coach::config::AppConfig;
use sleep_coach::error::AppError;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// CLI override first, then `SLEEP_COACH_RULES`, then the shipped rule file.
pub(crate) fn rules_path(override_path: Option<PathBuf>) -> Result<PathBuf, AppError> {
    match override_path {
        Some(path) => Ok(path),
        None => Ok(AppConfig::load()?.coaching.rules_path),
    }
}

pub(crate) fn load_service(path: &Path) -> Result<AssessmentService, AppError> {
    let rules = RuleSet::from_path(path)?;
    info!(path = %path.display(), rules = rules.len(), "loaded coaching rules");
    Ok(AssessmentService::new(rules))
}
