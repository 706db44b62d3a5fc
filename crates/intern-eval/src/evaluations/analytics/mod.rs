mod comparison;
mod ranking;
pub mod views;

pub use comparison::compare_forms;
pub use ranking::rank_students;
pub use views::{
    ComparisonQuery, EvaluationHistoryEntry, FormComparison, InternMetrics, MetricLevel,
    RankingQuery, StudentAnalytics,
};

use super::scoring::round1;

/// Running `(sum, count)` pair; an empty mean reads as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    pub(crate) fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn value(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        round1(self.sum / self.count as f64)
    }
}
