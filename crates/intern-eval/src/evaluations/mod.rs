//! Intern evaluation forms, scoring, and cross-form analytics.
//!
//! Tutors submit raw rubric scores against a form; the scoring engine
//! normalizes every field onto a 0-10 scale and derives the final score and
//! grade from the five standard metrics. Analytics rank the whole roster
//! across forms or within one form.

pub mod analytics;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use analytics::{
    ComparisonQuery, EvaluationHistoryEntry, FormComparison, InternMetrics, MetricLevel,
    RankingQuery, StudentAnalytics,
};
pub use domain::{
    EvaluationId, EvaluationRecord, EvaluationSubmission, FieldDefinition, FormDefinition,
    FormDraft, FormId, FormStatus, Intern, InternId, InternRegistration, NormalizedFieldScore,
    RawFieldInput, RawSubScore, SubFieldDefinition, TutorId,
};
pub use memory::{InMemoryEvaluationRepository, InMemoryRosterRepository};
pub use repository::{EvaluationRepository, RepositoryError, RosterRepository};
pub use router::evaluation_router;
pub use scoring::{Grade, OverMaxPolicy, ScoredSubmission, ScoringConfig, ScoringEngine};
pub use service::{ErrorKind, EvaluationService, EvaluationServiceError};
pub use validation::ValidationError;
