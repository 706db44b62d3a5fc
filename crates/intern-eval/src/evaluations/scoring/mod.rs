mod config;
mod fields;
mod grade;
mod normalizer;

pub use config::{OverMaxPolicy, ScoringConfig, StandardMetrics};
pub use fields::aggregate;
pub use grade::{compute_final, FinalScore, Grade};
pub use normalizer::{
    normalize_composite, normalize_composite_by, normalize_simple, round1, NORMALIZED_MAX,
};

use super::domain::{FormDefinition, NormalizedFieldScore, RawFieldInput};
use super::validation::ValidationError;
use serde::Serialize;

/// Stateless scorer applying the configured rubric rules to a submission.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(
        &self,
        form: &FormDefinition,
        inputs: &[RawFieldInput],
    ) -> Result<ScoredSubmission, ValidationError> {
        let field_scores = aggregate(&form.fields, inputs, &self.config)?;
        let FinalScore { score, grade } =
            compute_final(&field_scores, &self.config.standard_metrics);

        Ok(ScoredSubmission {
            field_scores,
            final_score: score,
            final_grade: grade,
        })
    }
}

/// Normalized output of one submission, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSubmission {
    pub field_scores: Vec<NormalizedFieldScore>,
    pub final_score: f64,
    pub final_grade: Grade,
}
