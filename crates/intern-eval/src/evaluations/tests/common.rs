use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::evaluations::domain::{
    standard_fields, EvaluationId, EvaluationRecord, EvaluationSubmission, FieldDefinition,
    FormDefinition, FormDraft, FormId, FormStatus, Intern, InternId, InternRegistration,
    NormalizedFieldScore, RawFieldInput, RawSubScore, TutorId,
};
use crate::evaluations::memory::{InMemoryEvaluationRepository, InMemoryRosterRepository};
use crate::evaluations::repository::{EvaluationRepository, RepositoryError};
use crate::evaluations::scoring::{Grade, ScoringConfig};
use crate::evaluations::EvaluationService;

pub(super) const CUSTOM_FIELD: &str = "Presentation Skills";
pub(super) const CUSTOM_FIELD_MAX: f64 = 20.0;

pub(super) type MemoryService =
    EvaluationService<InMemoryEvaluationRepository, InMemoryRosterRepository>;

pub(super) fn tutor() -> TutorId {
    TutorId::from("tutor-ada")
}

pub(super) fn form_draft(name: &str) -> FormDraft {
    FormDraft {
        name: name.to_string(),
        tutor: tutor(),
        custom_fields: vec![FieldDefinition::simple(CUSTOM_FIELD, CUSTOM_FIELD_MAX)],
        status: FormStatus::Active,
    }
}

pub(super) fn standard_only_draft(name: &str) -> FormDraft {
    FormDraft {
        custom_fields: Vec::new(),
        ..form_draft(name)
    }
}

pub(super) fn form_with_custom_field(id: &str) -> FormDefinition {
    FormDefinition::with_standard_fields(
        FormId::from(id),
        format!("Form {id}"),
        tutor(),
        vec![FieldDefinition::simple(CUSTOM_FIELD, CUSTOM_FIELD_MAX)],
    )
}

/// Raw inputs for every standard field, each sub-metric of field `i` scored `per_field[i]`.
pub(super) fn standard_inputs(per_field: [f64; 5]) -> Vec<RawFieldInput> {
    standard_fields()
        .iter()
        .zip(per_field)
        .map(|(field, score)| {
            RawFieldInput::with_sub_scores(
                field.name.clone(),
                field
                    .sub_fields
                    .iter()
                    .map(|sub| RawSubScore::new(sub.name.clone(), score))
                    .collect(),
            )
        })
        .collect()
}

pub(super) fn submission(
    intern: &InternId,
    per_field: [f64; 5],
    custom: Option<f64>,
) -> EvaluationSubmission {
    let mut field_scores = standard_inputs(per_field);
    if let Some(score) = custom {
        field_scores.push(RawFieldInput::direct(CUSTOM_FIELD, score));
    }
    EvaluationSubmission {
        intern: intern.clone(),
        comment: "steady progress".to_string(),
        field_scores,
    }
}

/// Tutor input from the worked scenario: full marks on Technical Competence, 3s elsewhere.
pub(super) fn mixed_submission(intern: &InternId) -> EvaluationSubmission {
    submission(intern, [5.0, 3.0, 3.0, 3.0, 3.0], Some(15.0))
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryEvaluationRepository>,
    Arc<InMemoryRosterRepository>,
) {
    build_service_with(ScoringConfig::default())
}

pub(super) fn build_service_with(
    config: ScoringConfig,
) -> (
    MemoryService,
    Arc<InMemoryEvaluationRepository>,
    Arc<InMemoryRosterRepository>,
) {
    let evaluations = Arc::new(InMemoryEvaluationRepository::default());
    let roster = Arc::new(InMemoryRosterRepository::default());
    let service = EvaluationService::new(evaluations.clone(), roster.clone(), config);
    (service, evaluations, roster)
}

pub(super) fn register(service: &MemoryService, name: &str) -> Intern {
    service
        .register_intern(InternRegistration {
            name: name.to_string(),
            email: format!("{}@interns.test", name.to_ascii_lowercase()),
        })
        .expect("intern registers")
}

pub(super) fn intern(id: &str, name: &str) -> Intern {
    Intern {
        id: InternId::from(id),
        name: name.to_string(),
        email: format!("{id}@interns.test"),
    }
}

/// Stored evaluation with explicit normalized scores, bypassing the scoring engine.
pub(super) fn record(
    form: &FormDefinition,
    intern: &str,
    final_score: f64,
    fields: &[(&str, f64)],
) -> EvaluationRecord {
    EvaluationRecord {
        id: EvaluationId(format!("eval-{}-{intern}", form.id)),
        form: form.id.clone(),
        intern: InternId::from(intern),
        tutor: form.tutor.clone(),
        field_scores: fields
            .iter()
            .map(|(name, score)| NormalizedFieldScore {
                field_name: name.to_string(),
                score: *score,
                sub_scores: Vec::new(),
            })
            .collect(),
        final_score,
        final_grade: Grade::for_score(final_score),
        comment: String::new(),
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub(super) fn evaluations_by_form(
    records: Vec<EvaluationRecord>,
) -> BTreeMap<FormId, Vec<EvaluationRecord>> {
    let mut grouped: BTreeMap<FormId, Vec<EvaluationRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.form.clone()).or_default().push(record);
    }
    grouped
}

pub(super) struct ConflictRepository;

impl EvaluationRepository for ConflictRepository {
    fn insert(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: EvaluationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Ok(None)
    }

    fn for_form(&self, _form: &FormId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    fn remove(&self, _id: &EvaluationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    fn remove_for_form(&self, _form: &FormId) -> Result<usize, RepositoryError> {
        Ok(0)
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn insert(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: EvaluationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_form(&self, _form: &FormId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: &EvaluationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove_for_form(&self, _form: &FormId) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
