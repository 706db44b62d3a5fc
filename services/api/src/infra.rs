use chrono::{DateTime, Utc};
use intern_eval::error::AppError;
use intern_eval::evaluations::{
    EvaluationRecord, EvaluationRepository, EvaluationService, EvaluationServiceError,
    FormDefinition, InMemoryEvaluationRepository, InMemoryRosterRepository, Intern,
    RosterRepository, ScoringConfig,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type InMemoryEvaluationService =
    EvaluationService<InMemoryEvaluationRepository, InMemoryRosterRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn in_memory_service(config: ScoringConfig) -> Arc<InMemoryEvaluationService> {
    Arc::new(EvaluationService::new(
        Arc::new(InMemoryEvaluationRepository::default()),
        Arc::new(InMemoryRosterRepository::default()),
        config,
    ))
}

/// Exported roster, forms and stored evaluations for offline ranking.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Snapshot {
    #[serde(default)]
    pub(crate) generated_at: Option<DateTime<Utc>>,
    pub(crate) interns: Vec<Intern>,
    pub(crate) forms: Vec<FormDefinition>,
    #[serde(default)]
    pub(crate) evaluations: Vec<EvaluationRecord>,
}

impl Snapshot {
    pub(crate) fn load(path: &Path) -> Result<Self, AppError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Load the snapshot into fresh in-memory stores behind a service.
    pub(crate) fn hydrate(
        self,
        config: ScoringConfig,
    ) -> Result<InMemoryEvaluationService, AppError> {
        let evaluations = Arc::new(InMemoryEvaluationRepository::default());
        let roster = Arc::new(InMemoryRosterRepository::default());

        let counts = (self.interns.len(), self.forms.len(), self.evaluations.len());
        for intern in self.interns {
            roster
                .insert_intern(intern)
                .map_err(EvaluationServiceError::from)?;
        }
        for form in self.forms {
            roster
                .insert_form(form)
                .map_err(EvaluationServiceError::from)?;
        }
        for record in self.evaluations {
            evaluations
                .insert(record)
                .map_err(EvaluationServiceError::from)?;
        }

        info!(
            interns = counts.0,
            forms = counts.1,
            evaluations = counts.2,
            "snapshot loaded"
        );
        Ok(EvaluationService::new(evaluations, roster, config))
    }
}
