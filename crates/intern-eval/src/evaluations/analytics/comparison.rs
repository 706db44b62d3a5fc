use std::collections::{BTreeMap, BTreeSet};

use super::views::{ComparisonQuery, FormComparison, InternMetrics, MetricLevel};
use super::RunningMean;
use crate::evaluations::domain::{EvaluationRecord, FormDefinition, FormId, Intern, InternId};
use crate::evaluations::validation::ValidationError;

type MetricMeans = BTreeMap<String, RunningMean>;

fn samples(evaluation: &EvaluationRecord, level: MetricLevel) -> Vec<(&str, f64)> {
    match level {
        MetricLevel::Main => evaluation
            .field_scores
            .iter()
            .map(|field| (field.field_name.as_str(), field.score))
            .collect(),
        MetricLevel::Sub => evaluation
            .field_scores
            .iter()
            .flat_map(|field| field.sub_scores.iter())
            .map(|sub| (sub.sub_field_name.as_str(), sub.score))
            .collect(),
    }
}

fn finish(means: MetricMeans) -> BTreeMap<String, f64> {
    means
        .into_iter()
        .map(|(name, mean)| (name, mean.value()))
        .collect()
}

/// Per-form metric averages for a selection of forms and interns.
///
/// Forms with no evaluation of a selected intern are left out, as are
/// evaluations of interns missing from the roster.
pub fn compare_forms(
    interns: &[Intern],
    forms: &[FormDefinition],
    evaluations: &BTreeMap<FormId, Vec<EvaluationRecord>>,
    query: &ComparisonQuery,
) -> Result<Vec<FormComparison>, ValidationError> {
    if query.form_ids.is_empty() || query.intern_ids.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    let selected_interns: BTreeSet<&InternId> = query.intern_ids.iter().collect();
    let roster: BTreeMap<&InternId, &Intern> =
        interns.iter().map(|intern| (&intern.id, intern)).collect();

    let mut comparisons = Vec::new();
    for form in forms.iter().filter(|form| query.form_ids.contains(&form.id)) {
        let mut form_means = MetricMeans::new();
        let mut per_intern: BTreeMap<&InternId, MetricMeans> = BTreeMap::new();

        let relevant = evaluations
            .get(&form.id)
            .into_iter()
            .flatten()
            .filter(|evaluation| selected_interns.contains(&evaluation.intern))
            .filter(|evaluation| roster.contains_key(&evaluation.intern));

        for evaluation in relevant {
            let intern_means = per_intern.entry(&evaluation.intern).or_default();
            for (metric, score) in samples(evaluation, query.level) {
                intern_means.entry(metric.to_string()).or_default().push(score);
                form_means.entry(metric.to_string()).or_default().push(score);
            }
        }

        if per_intern.is_empty() {
            continue;
        }

        let interns = per_intern
            .into_iter()
            .map(|(intern_id, means)| InternMetrics {
                intern_id: intern_id.clone(),
                intern_name: roster
                    .get(intern_id)
                    .map(|intern| intern.name.clone())
                    .unwrap_or_default(),
                metrics: finish(means),
            })
            .collect();

        comparisons.push(FormComparison {
            form_id: form.id.clone(),
            form_name: form.name.clone(),
            tutor: form.tutor.clone(),
            level: query.level,
            average_metrics: finish(form_means),
            interns,
        });
    }

    Ok(comparisons)
}
