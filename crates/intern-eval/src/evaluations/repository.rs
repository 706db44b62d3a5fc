use super::domain::{EvaluationId, EvaluationRecord, FormDefinition, FormId, Intern, InternId};

/// Storage for evaluations.
///
/// Implementations must reject a second evaluation for the same
/// `(form, intern)` pair with [`RepositoryError::Conflict`] atomically, so
/// concurrent submissions resolve to one success and one conflict.
pub trait EvaluationRepository: Send + Sync {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError>;
    fn update(&self, record: EvaluationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError>;
    fn for_form(&self, form: &FormId) -> Result<Vec<EvaluationRecord>, RepositoryError>;
    fn remove(&self, id: &EvaluationId) -> Result<(), RepositoryError>;
    /// Remove every evaluation of a form, returning how many were dropped.
    fn remove_for_form(&self, form: &FormId) -> Result<usize, RepositoryError>;
}

/// Storage for forms and the intern roster.
pub trait RosterRepository: Send + Sync {
    fn insert_form(&self, form: FormDefinition) -> Result<FormDefinition, RepositoryError>;
    fn update_form(&self, form: FormDefinition) -> Result<(), RepositoryError>;
    fn fetch_form(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError>;
    fn forms(&self) -> Result<Vec<FormDefinition>, RepositoryError>;
    fn remove_form(&self, id: &FormId) -> Result<(), RepositoryError>;
    fn insert_intern(&self, intern: Intern) -> Result<Intern, RepositoryError>;
    fn fetch_intern(&self, id: &InternId) -> Result<Option<Intern>, RepositoryError>;
    fn interns(&self) -> Result<Vec<Intern>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
