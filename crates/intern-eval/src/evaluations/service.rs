use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::analytics::{
    compare_forms, rank_students, ComparisonQuery, FormComparison, RankingQuery, StudentAnalytics,
};
use super::domain::{
    standard_fields, EvaluationId, EvaluationRecord, EvaluationSubmission, FieldDefinition,
    FormDefinition, FormDraft, FormId, FormStatus, Intern, InternId, InternRegistration, TutorId,
};
use super::repository::{EvaluationRepository, RepositoryError, RosterRepository};
use super::scoring::{ScoringConfig, ScoringEngine};
use super::validation::ValidationError;

/// Service composing the roster, the evaluation store and the scoring engine.
pub struct EvaluationService<E, R> {
    evaluations: Arc<E>,
    roster: Arc<R>,
    engine: Arc<ScoringEngine>,
}

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str) -> String {
    let id = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

type Snapshot = (
    Vec<Intern>,
    Vec<FormDefinition>,
    BTreeMap<FormId, Vec<EvaluationRecord>>,
);

impl<E, R> EvaluationService<E, R>
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    pub fn new(evaluations: Arc<E>, roster: Arc<R>, config: ScoringConfig) -> Self {
        Self {
            evaluations,
            roster,
            engine: Arc::new(ScoringEngine::new(config)),
        }
    }

    pub fn scoring_config(&self) -> &ScoringConfig {
        self.engine.config()
    }

    /// Create a form with the standard rubric followed by the draft's custom fields.
    pub fn create_form(&self, draft: FormDraft) -> Result<FormDefinition, EvaluationServiceError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Blank { what: "form name" }.into());
        }
        if draft.tutor.0.trim().is_empty() {
            return Err(ValidationError::Blank { what: "tutor" }.into());
        }
        let custom_fields = prepare_custom_fields(draft.custom_fields, self.scoring_config())?;

        let mut form = FormDefinition::with_standard_fields(
            FormId(next_id("form")),
            name,
            draft.tutor,
            custom_fields,
        );
        form.status = draft.status;

        let stored = self.roster.insert_form(form).map_err(|err| match err {
            RepositoryError::Conflict => {
                EvaluationServiceError::Conflict(format!("form named '{name}'"))
            }
            other => other.into(),
        })?;
        info!(form_id = %stored.id, form = %stored.name, "form created");
        Ok(stored)
    }

    pub fn set_form_status(
        &self,
        form_id: &FormId,
        status: FormStatus,
    ) -> Result<FormDefinition, EvaluationServiceError> {
        let mut form = self.form(form_id)?;
        form.status = status;
        self.roster.update_form(form.clone())?;
        info!(%form_id, status = status.label(), "form status changed");
        Ok(form)
    }

    pub fn form(&self, form_id: &FormId) -> Result<FormDefinition, EvaluationServiceError> {
        self.roster
            .fetch_form(form_id)?
            .ok_or_else(|| EvaluationServiceError::NotFound(format!("form {form_id}")))
    }

    pub fn forms(&self) -> Result<Vec<FormDefinition>, EvaluationServiceError> {
        Ok(self.roster.forms()?)
    }

    pub fn active_forms(&self) -> Result<Vec<FormDefinition>, EvaluationServiceError> {
        let mut forms = self.roster.forms()?;
        forms.retain(FormDefinition::is_active);
        Ok(forms)
    }

    /// Delete a form together with all of its evaluations.
    ///
    /// The form goes first. A `submit` racing the deletion either lands before
    /// the evaluation sweep or finds the form gone after its insert and backs out.
    pub fn delete_form(&self, form_id: &FormId) -> Result<usize, EvaluationServiceError> {
        self.roster.remove_form(form_id).map_err(|err| match err {
            RepositoryError::NotFound => {
                EvaluationServiceError::NotFound(format!("form {form_id}"))
            }
            other => other.into(),
        })?;
        let removed = self.evaluations.remove_for_form(form_id)?;
        info!(%form_id, removed, "form deleted with its evaluations");
        Ok(removed)
    }

    pub fn register_intern(
        &self,
        registration: InternRegistration,
    ) -> Result<Intern, EvaluationServiceError> {
        let name = registration.name.trim();
        let email = registration.email.trim();
        if name.is_empty() {
            return Err(ValidationError::Blank { what: "intern name" }.into());
        }
        if email.is_empty() {
            return Err(ValidationError::Blank { what: "intern email" }.into());
        }

        let intern = Intern {
            id: InternId(next_id("intern")),
            name: name.to_string(),
            email: email.to_string(),
        };
        let stored = self.roster.insert_intern(intern).map_err(|err| match err {
            RepositoryError::Conflict => {
                EvaluationServiceError::Conflict(format!("intern with email '{email}'"))
            }
            other => other.into(),
        })?;
        info!(intern_id = %stored.id, "intern registered");
        Ok(stored)
    }

    pub fn intern(&self, intern_id: &InternId) -> Result<Intern, EvaluationServiceError> {
        self.roster
            .fetch_intern(intern_id)?
            .ok_or_else(|| EvaluationServiceError::NotFound(format!("intern {intern_id}")))
    }

    pub fn interns(&self) -> Result<Vec<Intern>, EvaluationServiceError> {
        Ok(self.roster.interns()?)
    }

    /// Score and store a tutor's submission against an active form.
    pub fn submit(
        &self,
        form_id: &FormId,
        tutor: TutorId,
        submission: EvaluationSubmission,
    ) -> Result<EvaluationRecord, EvaluationServiceError> {
        let form = self
            .roster
            .fetch_form(form_id)?
            .filter(FormDefinition::is_active)
            .ok_or_else(|| EvaluationServiceError::NotFound(format!("active form {form_id}")))?;
        self.intern(&submission.intern)?;

        let scored = self.engine.score(&form, &submission.field_scores)?;
        let intern = submission.intern.clone();
        let record = EvaluationRecord {
            id: EvaluationId(next_id("eval")),
            form: form.id.clone(),
            intern: submission.intern,
            tutor,
            field_scores: scored.field_scores,
            final_score: scored.final_score,
            final_grade: scored.final_grade,
            comment: submission.comment,
            created_at: Utc::now(),
            updated_at: None,
        };

        match self.evaluations.insert(record) {
            Ok(stored) if self.roster.fetch_form(form_id)?.is_none() => {
                self.evaluations.remove(&stored.id).or_else(|err| match err {
                    RepositoryError::NotFound => Ok(()),
                    other => Err(other),
                })?;
                warn!(%form_id, %intern, "form deleted during submission");
                Err(EvaluationServiceError::NotFound(format!("active form {form_id}")))
            }
            Ok(stored) => {
                info!(
                    evaluation_id = %stored.id,
                    %form_id,
                    intern = %stored.intern,
                    final_score = stored.final_score,
                    "evaluation stored"
                );
                Ok(stored)
            }
            Err(RepositoryError::Conflict) => {
                warn!(%form_id, %intern, "duplicate evaluation rejected");
                Err(EvaluationServiceError::AlreadyEvaluated {
                    form: form_id.clone(),
                    intern,
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Re-run the full scoring pipeline for an existing evaluation.
    pub fn update(
        &self,
        evaluation_id: &EvaluationId,
        submission: EvaluationSubmission,
    ) -> Result<EvaluationRecord, EvaluationServiceError> {
        let mut record = self.get(evaluation_id)?;
        if record.intern != submission.intern {
            return Err(ValidationError::InternMismatch {
                expected: record.intern.0.clone(),
                found: submission.intern.0,
            }
            .into());
        }

        let form = self.form(&record.form)?;
        let scored = self.engine.score(&form, &submission.field_scores)?;
        record.field_scores = scored.field_scores;
        record.final_score = scored.final_score;
        record.final_grade = scored.final_grade;
        record.comment = submission.comment;
        record.updated_at = Some(Utc::now());

        self.evaluations.update(record.clone())?;
        info!(%evaluation_id, final_score = record.final_score, "evaluation updated");
        Ok(record)
    }

    pub fn get(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<EvaluationRecord, EvaluationServiceError> {
        self.evaluations
            .fetch(evaluation_id)?
            .ok_or_else(|| EvaluationServiceError::NotFound(format!("evaluation {evaluation_id}")))
    }

    pub fn evaluations_for_form(
        &self,
        form_id: &FormId,
    ) -> Result<Vec<EvaluationRecord>, EvaluationServiceError> {
        self.form(form_id)?;
        Ok(self.evaluations.for_form(form_id)?)
    }

    pub fn delete(&self, evaluation_id: &EvaluationId) -> Result<(), EvaluationServiceError> {
        self.evaluations
            .remove(evaluation_id)
            .map_err(|err| match err {
                RepositoryError::NotFound => {
                    EvaluationServiceError::NotFound(format!("evaluation {evaluation_id}"))
                }
                other => other.into(),
            })?;
        info!(%evaluation_id, "evaluation deleted");
        Ok(())
    }

    /// Rank all students, optionally restricted to one form or sorted by a metric.
    pub fn rankings(
        &self,
        query: &RankingQuery,
    ) -> Result<Vec<StudentAnalytics>, EvaluationServiceError> {
        if let Some(form_id) = &query.form_id {
            self.form(form_id)?;
        }
        let (interns, forms, evaluations) = self.snapshot()?;
        let students = rank_students(&interns, &forms, &evaluations, query);
        info!(students = students.len(), forms = forms.len(), "rankings computed");
        Ok(students)
    }

    pub fn compare_forms(
        &self,
        query: &ComparisonQuery,
    ) -> Result<Vec<FormComparison>, EvaluationServiceError> {
        let (interns, forms, evaluations) = self.snapshot()?;
        let comparisons = compare_forms(&interns, &forms, &evaluations, query)?;
        if comparisons.is_empty() {
            return Err(EvaluationServiceError::NotFound(
                "evaluations for the selected filters".to_string(),
            ));
        }
        Ok(comparisons)
    }

    fn snapshot(&self) -> Result<Snapshot, EvaluationServiceError> {
        let interns = self.roster.interns()?;
        let forms = self.roster.forms()?;
        let mut evaluations = BTreeMap::new();
        for form in &forms {
            evaluations.insert(form.id.clone(), self.evaluations.for_form(&form.id)?);
        }
        Ok((interns, forms, evaluations))
    }
}

/// Trim and check a custom field list against itself and the standard rubric.
///
/// Composite fields without a parent maximum get the sum of their sub-field maxima.
fn prepare_custom_fields(
    custom_fields: Vec<FieldDefinition>,
    config: &ScoringConfig,
) -> Result<Vec<FieldDefinition>, ValidationError> {
    let mut names: BTreeSet<String> = standard_fields()
        .into_iter()
        .map(|field| field.name)
        .collect();

    custom_fields
        .into_iter()
        .map(|mut field| {
            field.name = field.name.trim().to_string();
            if field.name.is_empty() {
                return Err(ValidationError::Blank { what: "field name" });
            }
            if !names.insert(field.name.clone()) {
                return Err(ValidationError::DuplicateFieldDefinition { field: field.name });
            }
            check_declared_max(&field.name, field.max_value)?;

            let mut sub_names = BTreeSet::new();
            for sub in &mut field.sub_fields {
                sub.name = sub.name.trim().to_string();
                let target = format!("{} / {}", field.name, sub.name);
                if sub.name.is_empty() {
                    return Err(ValidationError::Blank {
                        what: "sub-field name",
                    });
                }
                if !sub_names.insert(sub.name.clone()) {
                    return Err(ValidationError::DuplicateFieldDefinition { field: target });
                }
                check_declared_max(&target, sub.max_value)?;
            }

            if field.max_value.is_none() && field.is_composite() {
                let sum = field
                    .sub_fields
                    .iter()
                    .map(|sub| sub.max_value.unwrap_or(config.default_sub_field_max))
                    .sum();
                field.max_value = Some(sum);
            }
            Ok(field)
        })
        .collect()
}

fn check_declared_max(target: &str, max_value: Option<f64>) -> Result<(), ValidationError> {
    match max_value {
        Some(max) if !max.is_finite() || max <= 0.0 => Err(ValidationError::InvalidMaximum {
            target: target.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("an evaluation for intern {intern} on form {form} already exists")]
    AlreadyEvaluated { form: FormId, intern: InternId },
    #[error("{0} already exists")]
    Conflict(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Coarse error taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Unavailable,
}

impl EvaluationServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvaluationServiceError::Validation(_) => ErrorKind::Validation,
            EvaluationServiceError::NotFound(_)
            | EvaluationServiceError::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            EvaluationServiceError::AlreadyEvaluated { .. }
            | EvaluationServiceError::Conflict(_)
            | EvaluationServiceError::Repository(RepositoryError::Conflict) => ErrorKind::Conflict,
            EvaluationServiceError::Repository(RepositoryError::Unavailable(_)) => {
                ErrorKind::Unavailable
            }
        }
    }
}
