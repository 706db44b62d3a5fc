use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use super::views::{EvaluationHistoryEntry, RankingQuery, StudentAnalytics};
use super::RunningMean;
use crate::evaluations::domain::{EvaluationRecord, FormDefinition, FormId, Intern};
use crate::evaluations::scoring::Grade;

struct StudentAccumulator<'a> {
    intern: &'a Intern,
    overall: RunningMean,
    metrics: BTreeMap<String, RunningMean>,
    history: Vec<EvaluationHistoryEntry>,
}

impl<'a> StudentAccumulator<'a> {
    fn new(intern: &'a Intern) -> Self {
        Self {
            intern,
            overall: RunningMean::default(),
            metrics: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    fn record(&mut self, form: &FormDefinition, evaluation: &EvaluationRecord) {
        self.overall.push(evaluation.final_score);
        for field in &evaluation.field_scores {
            self.metrics
                .entry(field.field_name.clone())
                .or_default()
                .push(field.score);
        }
        self.history.push(EvaluationHistoryEntry {
            evaluation_id: evaluation.id.clone(),
            form_id: form.id.clone(),
            form_name: form.name.clone(),
            final_score: evaluation.final_score,
            final_grade: evaluation.final_grade,
            field_scores: evaluation.field_scores.clone(),
            comment: evaluation.comment.clone(),
            created_at: evaluation.created_at,
        });
    }

    fn finish(self) -> StudentAnalytics {
        let average_score = self.overall.value();
        StudentAnalytics {
            rank: 0,
            intern_id: self.intern.id.clone(),
            name: self.intern.name.clone(),
            email: self.intern.email.clone(),
            average_score,
            grade: Grade::for_score(average_score),
            metric_scores: self
                .metrics
                .into_iter()
                .map(|(name, mean)| (name, mean.value()))
                .collect(),
            total_forms: self.overall.count(),
            evaluations: self.history,
        }
    }
}

/// Rank every student on the roster from a full scan of the evaluations.
///
/// The global view includes students without evaluations (average 0). A
/// form-restricted view recomputes from that form alone and leaves out
/// students it never evaluated. Ties fall back to ascending intern id.
pub fn rank_students(
    interns: &[Intern],
    forms: &[FormDefinition],
    evaluations: &BTreeMap<FormId, Vec<EvaluationRecord>>,
    query: &RankingQuery,
) -> Vec<StudentAnalytics> {
    let mut accumulators: Vec<StudentAccumulator<'_>> =
        interns.iter().map(StudentAccumulator::new).collect();
    let index: HashMap<_, _> = interns
        .iter()
        .enumerate()
        .map(|(position, intern)| (&intern.id, position))
        .collect();

    for form_id in evaluations.keys() {
        if forms.iter().all(|form| &form.id != form_id) {
            warn!(%form_id, "evaluations reference an unknown form, skipping");
        }
    }

    let scanned = forms.iter().filter(|form| {
        query
            .form_id
            .as_ref()
            .map_or(true, |restricted| restricted == &form.id)
    });

    for form in scanned {
        for evaluation in evaluations.get(&form.id).into_iter().flatten() {
            match index.get(&evaluation.intern) {
                Some(&position) => accumulators[position].record(form, evaluation),
                None => warn!(
                    intern = %evaluation.intern,
                    form_id = %form.id,
                    "evaluation for unregistered intern, skipping"
                ),
            }
        }
    }

    let mut students: Vec<StudentAnalytics> = accumulators
        .into_iter()
        .filter(|acc| query.form_id.is_none() || acc.overall.count() > 0)
        .map(StudentAccumulator::finish)
        .collect();

    let sort_key = |student: &StudentAnalytics| match &query.metric {
        Some(metric) => student.metric(metric),
        None => student.average_score,
    };
    students.sort_by(|a, b| {
        sort_key(b)
            .total_cmp(&sort_key(a))
            .then_with(|| a.intern_id.cmp(&b.intern_id))
    });

    for (position, student) in students.iter_mut().enumerate() {
        student.rank = position + 1;
    }

    debug!(
        students = students.len(),
        form_id = ?query.form_id,
        metric = ?query.metric,
        "rankings computed"
    );
    students
}
