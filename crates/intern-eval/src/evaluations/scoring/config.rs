use serde::{Deserialize, Serialize};

/// Names of the five metrics that make up the final score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StandardMetrics([String; 5]);

impl StandardMetrics {
    pub fn new(names: [String; 5]) -> Self {
        Self(names)
    }

    pub fn names(&self) -> &[String; 5] {
        &self.0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|metric| metric == name)
    }
}

impl Default for StandardMetrics {
    fn default() -> Self {
        Self([
            "Technical Competence".to_string(),
            "Communication".to_string(),
            "Learning & Adaptability".to_string(),
            "Initiative & Ownership".to_string(),
            "Professionalism".to_string(),
        ])
    }
}

/// Handling of raw scores above their declared maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverMaxPolicy {
    #[default]
    Reject,
    Clamp,
}

impl OverMaxPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "clamp" => Some(Self::Clamp),
            _ => None,
        }
    }
}

/// Scoring dials shared by every form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Per-sub-field maximum when a sub-field declares none.
    pub default_sub_field_max: f64,
    /// Maximum for simple fields declaring none.
    pub default_simple_max: f64,
    pub over_max_policy: OverMaxPolicy,
    pub standard_metrics: StandardMetrics,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_sub_field_max: 5.0,
            default_simple_max: 10.0,
            over_max_policy: OverMaxPolicy::Reject,
            standard_metrics: StandardMetrics::default(),
        }
    }
}
