use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluations::domain::{EvaluationId, FormId, InternId, NormalizedFieldScore, TutorId};
use crate::evaluations::scoring::Grade;

/// One evaluation in a student's drill-down history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationHistoryEntry {
    pub evaluation_id: EvaluationId,
    pub form_id: FormId,
    pub form_name: String,
    pub final_score: f64,
    pub final_grade: Grade,
    pub field_scores: Vec<NormalizedFieldScore>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Per-student aggregate across the ranked evaluations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAnalytics {
    pub rank: usize,
    pub intern_id: InternId,
    pub name: String,
    pub email: String,
    pub average_score: f64,
    pub grade: Grade,
    pub metric_scores: BTreeMap<String, f64>,
    pub total_forms: usize,
    pub evaluations: Vec<EvaluationHistoryEntry>,
}

impl StudentAnalytics {
    pub fn metric(&self, name: &str) -> f64 {
        self.metric_scores.get(name).copied().unwrap_or(0.0)
    }
}

/// Ranking scope and sort key. Both default to the global average view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingQuery {
    /// Restrict to one form's evaluations; students without one are excluded.
    #[serde(default)]
    pub form_id: Option<FormId>,
    /// Sort by this metric's average instead of the overall average.
    #[serde(default)]
    pub metric: Option<String>,
}

/// Parent metrics or raw sub-metric scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricLevel {
    #[default]
    Main,
    Sub,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonQuery {
    pub form_ids: Vec<FormId>,
    pub intern_ids: Vec<InternId>,
    #[serde(default)]
    pub level: MetricLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternMetrics {
    pub intern_id: InternId,
    pub intern_name: String,
    pub metrics: BTreeMap<String, f64>,
}

/// Metric averages of the selected interns on one form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormComparison {
    pub form_id: FormId,
    pub form_name: String,
    pub tutor: TutorId,
    pub level: MetricLevel,
    pub average_metrics: BTreeMap<String, f64>,
    pub interns: Vec<InternMetrics>,
}
