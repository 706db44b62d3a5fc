use serde::{Deserialize, Serialize};

use super::config::StandardMetrics;
use super::normalizer::{round1, NORMALIZED_MAX};
use crate::evaluations::domain::NormalizedFieldScore;

/// Qualitative label attached to any 0-10 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Improvement Required")]
    ImprovementRequired,
    Unsatisfactory,
}

/// Inclusive lower bounds, checked top-down.
const THRESHOLDS: [(f64, Grade); 4] = [
    (9.0, Grade::Excellent),
    (7.5, Grade::Good),
    (6.0, Grade::Average),
    (4.0, Grade::ImprovementRequired),
];

impl Grade {
    pub fn for_score(score: f64) -> Self {
        THRESHOLDS
            .iter()
            .find(|(lower, _)| score >= *lower)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::Unsatisfactory)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent",
            Grade::Good => "Good",
            Grade::Average => "Average",
            Grade::ImprovementRequired => "Improvement Required",
            Grade::Unsatisfactory => "Unsatisfactory",
        }
    }
}

/// Overall result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinalScore {
    pub score: f64,
    pub grade: Grade,
}

/// Average the five standard metrics; custom fields never contribute and a
/// missing standard metric counts as zero.
pub fn compute_final(
    field_scores: &[NormalizedFieldScore],
    standard_metrics: &StandardMetrics,
) -> FinalScore {
    let names = standard_metrics.names();
    let total: f64 = names
        .iter()
        .map(|name| {
            field_scores
                .iter()
                .find(|field| &field.field_name == name)
                .map(|field| field.score)
                .unwrap_or(0.0)
        })
        .sum();

    let score = round1((total / names.len() as f64).min(NORMALIZED_MAX));
    FinalScore {
        score,
        grade: Grade::for_score(score),
    }
}
